//! Free-text meal-cell parser.
//!
//! A raw cell mixes dish names with a handful of overlapping annotations:
//! a kind token (`bento` / `leftover`), an `@location` suffix, a
//! parenthesized comment (Latin or full-width), and a `w/` companion
//! clause. Rules run in a fixed order and each consumes its span from the
//! text; whatever survives is the delimiter-separated dish list. Malformed
//! input never fails — an unmatched rule just leaves its field unset.

use std::collections::BTreeSet;

use crate::models::{MealEntry, MealKind, MealTime};

/// Dish names and companion lists split on any of these.
const DELIMITERS: &[char] = &[',', '，', '+'];

/// Parse one raw cell into zero or more entries sharing the cell's
/// annotations. A cell that strips down to nothing yields no entries.
#[must_use]
pub fn parse_cell(raw: &str, date: &str, time: MealTime) -> Vec<MealEntry> {
    let (kind, rest) = take_kind(raw);
    let (location, rest) = take_suffix(&rest, "@");
    let (comment, rest) = take_parenthesized(&rest, '(', ')');
    let (comment, rest) = if comment.is_some() {
        (comment, rest)
    } else {
        take_parenthesized(&rest, '（', '）')
    };
    let (companions, rest) = take_suffix(&rest, "w/");
    let people: BTreeSet<String> = companions
        .as_deref()
        .map(|c| split_list(c).map(str::to_string).collect())
        .unwrap_or_default();

    split_list(&rest)
        .map(|name| MealEntry {
            date: date.to_string(),
            time,
            name: name.to_string(),
            people: people.clone(),
            kind,
            comment: comment.clone(),
            location: location.clone(),
        })
        .collect()
}

/// Strip every `bento`/`leftover` token; `leftover` wins classification
/// when both appear.
fn take_kind(text: &str) -> (Option<MealKind>, String) {
    let has_leftover = text.contains("leftover");
    let has_bento = text.contains("bento");
    if !has_leftover && !has_bento {
        return (None, text.to_string());
    }
    let kind = if has_leftover {
        MealKind::Leftover
    } else {
        MealKind::Takeout
    };
    (Some(kind), text.replace("leftover", "").replace("bento", ""))
}

/// Capture everything from the first occurrence of `marker` to the end of
/// the text. The captured value has the marker stripped and is trimmed;
/// an all-whitespace capture counts as no match for the field.
fn take_suffix(text: &str, marker: &str) -> (Option<String>, String) {
    let Some(at) = text.find(marker) else {
        return (None, text.to_string());
    };
    let value = text[at + marker.len()..].trim();
    let value = (!value.is_empty()).then(|| value.to_string());
    (value, text[..at].to_string())
}

/// Capture a greedy parenthesized span: the first `open` paired with the
/// last `close`. The span is removed from the text even when the trimmed
/// inner content is empty.
fn take_parenthesized(text: &str, open: char, close: char) -> (Option<String>, String) {
    let Some(start) = text.find(open) else {
        return (None, text.to_string());
    };
    let Some(end) = text.rfind(close) else {
        return (None, text.to_string());
    };
    if end < start + open.len_utf8() {
        return (None, text.to_string());
    }
    let inner = text[start + open.len_utf8()..end].trim();
    let mut remaining = String::with_capacity(text.len());
    remaining.push_str(&text[..start]);
    remaining.push_str(&text[end + close.len_utf8()..]);
    let value = (!inner.is_empty()).then(|| inner.to_string());
    (value, remaining)
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(DELIMITERS)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Vec<MealEntry> {
        parse_cell(raw, "2023-04-02", MealTime::Dinner)
    }

    #[test]
    fn test_fully_annotated_cell() {
        let entries = parse("牛丼 w/ ww+xx (leftover) @Google 食堂");
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.name, "牛丼");
        assert_eq!(entry.kind, Some(MealKind::Leftover));
        assert_eq!(entry.location.as_deref(), Some("Google 食堂"));
        assert_eq!(
            entry.people,
            BTreeSet::from(["ww".to_string(), "xx".to_string()])
        );
        assert_eq!(entry.comment, None);
        assert_eq!(entry.date, "2023-04-02");
        assert_eq!(entry.time, MealTime::Dinner);
    }

    #[test]
    fn test_plain_dish_list() {
        let entries = parse("蛋炒饭, 小锅米线");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "蛋炒饭");
        assert_eq!(entries[1].name, "小锅米线");
        for entry in &entries {
            assert_eq!(entry.kind, None);
            assert_eq!(entry.comment, None);
            assert_eq!(entry.location, None);
            assert!(entry.people.is_empty());
        }
    }

    #[test]
    fn test_empty_cell_yields_no_entries() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
        assert!(parse(", ,").is_empty());
    }

    #[test]
    fn test_names_are_never_blank() {
        for raw in ["a, , b", "+x+", "， 面条 ，", "(only a comment)"] {
            for entry in parse(raw) {
                assert!(!entry.name.trim().is_empty(), "blank name from '{raw}'");
            }
        }
    }

    #[test]
    fn test_bento_marks_takeout() {
        let entries = parse("bento milk");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "milk");
        assert_eq!(entries[0].kind, Some(MealKind::Takeout));
    }

    #[test]
    fn test_leftover_wins_over_bento() {
        let entries = parse("bento leftover 炒面");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, Some(MealKind::Leftover));
    }

    #[test]
    fn test_cjk_parentheses() {
        let entries = parse("阳春面 （加蛋）");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "阳春面");
        assert_eq!(entries[0].comment.as_deref(), Some("加蛋"));
    }

    #[test]
    fn test_latin_parentheses_take_precedence() {
        let entries = parse("面条 (half)");
        assert_eq!(entries[0].comment.as_deref(), Some("half"));
    }

    #[test]
    fn test_greedy_parenthesis_span() {
        // First '(' pairs with the last ')'.
        let entries = parse("rice (a) b (c)");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "rice");
        assert_eq!(entries[0].comment.as_deref(), Some("a) b (c"));
    }

    #[test]
    fn test_location_swallows_rest_of_line() {
        let entries = parse("拉面 @面馆 w/ yy");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "拉面");
        assert_eq!(entries[0].location.as_deref(), Some("面馆 w/ yy"));
        assert!(entries[0].people.is_empty());
    }

    #[test]
    fn test_companion_clause_splits_on_all_delimiters() {
        let entries = parse("火锅 w/ aa，bb+cc");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "火锅");
        assert_eq!(
            entries[0].people,
            BTreeSet::from(["aa".to_string(), "bb".to_string(), "cc".to_string()])
        );
    }

    #[test]
    fn test_unclosed_parenthesis_is_left_alone() {
        let entries = parse("面包 (unfinished");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "面包 (unfinished");
        assert_eq!(entries[0].comment, None);
    }

    #[test]
    fn test_annotations_shared_across_split_names() {
        let entries = parse("leftover 土豆, 米饭");
        assert_eq!(entries.len(), 2);
        assert!(
            entries
                .iter()
                .all(|e| e.kind == Some(MealKind::Leftover))
        );
    }
}
