//! The fixed migration plan: which journal keywords resolve against which
//! food source, and which leftover names are noise to purge at the end.
//!
//! One entry per dish name that appears in the journal. Substring passes
//! run after every exact pass so they only sweep up the qualified
//! variants the exact names left behind.

use mealtrail_core::extract::MatchMode;
use mealtrail_core::migrate::FoodRequest;
use mealtrail_core::models::{FoodSource, TrackedPair};

/// The two people whose portions the journal's parallel columns track.
pub fn tracked_pair() -> TrackedPair {
    TrackedPair::new("xx", "ww")
}

/// Food passes, in the order they are applied.
pub fn food_passes() -> Vec<FoodRequest<'static>> {
    use FoodSource::{Product, Recipe, Restaurant};
    vec![
        // products
        FoodRequest::exact("milk", Product),
        FoodRequest::exact("蛋黄派", Product),
        FoodRequest::exact("巧克力派", Product),
        FoodRequest::exact("巧克力面包", Product),
        FoodRequest::exact("ritz", Product),
        FoodRequest::exact("酱肘子", Product),
        // home cooking
        FoodRequest::exact("蛋炒饭", Recipe),
        FoodRequest::exact("土豆烧排骨", Recipe),
        FoodRequest::exact("醋溜白菜", Recipe),
        FoodRequest::exact("红烧金鲳鱼", Recipe),
        FoodRequest::exact("红烧平鱼", Recipe),
        FoodRequest::exact("炝炒油麦菜", Recipe),
        FoodRequest::exact("炒油菜", Recipe),
        FoodRequest::exact("番茄土豆炖牛腩", Recipe),
        FoodRequest::exact("小葱拌豆腐", Recipe),
        FoodRequest::exact("西红柿鸡蛋面", Recipe),
        FoodRequest::exact("煮饺子", Recipe),
        FoodRequest {
            replace_name: Some("煮饺子"),
            comment_override: Some("速冻"),
            ..FoodRequest::exact("煮速冻饺子", Recipe)
        },
        // eating out
        FoodRequest::exact("小锅米线", Restaurant),
        FoodRequest::exact("红烧牛肉面", Restaurant),
        FoodRequest::exact("重庆小面", Restaurant),
        FoodRequest::exact("牛丼", Restaurant),
        FoodRequest::exact("猪脚饭", Restaurant),
        FoodRequest::exact("成都滋味", Restaurant),
        FoodRequest::exact("十九金", Restaurant),
        FoodRequest::exact("Google 食堂", Restaurant),
        // substring passes for names that show up with qualifiers
        FoodRequest {
            mode: MatchMode::Substring,
            kind_override: Some("takeout"),
            ..FoodRequest::exact("盐焗鸡", Restaurant)
        },
        FoodRequest {
            mode: MatchMode::Substring,
            replace_name: Some("McDonald's"),
            ..FoodRequest::exact("McDonald", Restaurant)
        },
        FoodRequest {
            mode: MatchMode::Substring,
            replace_name: Some("杨国福麻辣烫"),
            ..FoodRequest::exact("YGF", Restaurant)
        },
        FoodRequest {
            mode: MatchMode::Substring,
            ..FoodRequest::exact("croissant", Product)
        },
        FoodRequest {
            mode: MatchMode::Substring,
            ..FoodRequest::exact("方便面", Product)
        },
        FoodRequest {
            mode: MatchMode::Substring,
            ..FoodRequest::exact("阳春面", Recipe)
        },
    ]
}

/// Non-dish entries cleared from the working set after the food passes,
/// matched exactly.
pub const NOISE_EXACT: &[&str] = &["没吃", "不吃", "skip"];

/// Noise cleared by substring containment.
pub const NOISE_SUBSTRING: &[&str] = &["剩菜"];
