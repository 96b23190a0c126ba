use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One of the three meal times tracked per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealTime {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealTime {
    pub const ALL: [MealTime; 3] = [MealTime::Breakfast, MealTime::Lunch, MealTime::Dinner];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealTime::Breakfast => "breakfast",
            MealTime::Lunch => "lunch",
            MealTime::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal-kind annotation parsed from a cell: `leftover` marks a reheated
/// portion, `bento` marks food carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealKind {
    Leftover,
    Takeout,
}

impl MealKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealKind::Leftover => "leftover",
            MealKind::Takeout => "takeout",
        }
    }
}

/// Category table a dish's canonical name is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodSource {
    Recipe,
    Restaurant,
    Product,
}

impl FoodSource {
    /// Name of the lookup table holding this source's canonical dishes.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            FoodSource::Recipe => "recipe",
            FoodSource::Restaurant => "restaurant",
            FoodSource::Product => "product",
        }
    }

    /// Name of the meal-to-source association table.
    #[must_use]
    pub fn link_table(self) -> &'static str {
        match self {
            FoodSource::Recipe => "meal_recipe",
            FoodSource::Restaurant => "meal_restaurant",
            FoodSource::Product => "meal_product",
        }
    }

    /// Association type used when an entry carries no parsed kind and no
    /// per-pass override.
    #[must_use]
    pub fn default_kind(self) -> &'static str {
        match self {
            FoodSource::Recipe => "cooked",
            FoodSource::Restaurant => "dine-in",
            FoodSource::Product => "manufactured",
        }
    }
}

impl FromStr for FoodSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recipe" => Ok(FoodSource::Recipe),
            "restaurant" => Ok(FoodSource::Restaurant),
            "product" => Ok(FoodSource::Product),
            _ => anyhow::bail!(
                "Invalid food source '{s}'. Must be one of: recipe, restaurant, product"
            ),
        }
    }
}

impl fmt::Display for FoodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// One parsed dish occurrence with its optional annotations.
///
/// `people` starts out holding any companions named in the cell's `w/`
/// clause; slot attribution is unioned in during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealEntry {
    pub date: String,
    pub time: MealTime,
    pub name: String,
    pub people: BTreeSet<String>,
    pub kind: Option<MealKind>,
    pub comment: Option<String>,
    pub location: Option<String>,
}

/// The two parallel cell positions of one meal time.
///
/// Slot 0 holds the first-cooked portion, slot 1 the second. An empty
/// cell keeps its position as an empty sequence so slot indices stay
/// meaningful for attribution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MealSlots {
    pub slots: [Vec<MealEntry>; 2],
}

impl MealSlots {
    #[must_use]
    pub fn new(first: Vec<MealEntry>, second: Vec<MealEntry>) -> Self {
        Self {
            slots: [first, second],
        }
    }

    /// Number of slots holding at least one entry.
    #[must_use]
    pub fn populated(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Total entries across both slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Day-level free-text fields carried alongside the meal cells.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DayNotes {
    pub special: String,
    pub exercise: String,
    pub activity: String,
    pub entertainment: String,
    pub housekeeping: String,
}

/// One calendar day of the journal: a slot group per meal time plus the
/// day notes.
#[derive(Debug, Clone, Serialize)]
pub struct DayRecord {
    pub date: String,
    pub breakfast: MealSlots,
    pub lunch: MealSlots,
    pub dinner: MealSlots,
    pub notes: DayNotes,
}

impl DayRecord {
    #[must_use]
    pub fn slot_group(&self, time: MealTime) -> &MealSlots {
        match time {
            MealTime::Breakfast => &self.breakfast,
            MealTime::Lunch => &self.lunch,
            MealTime::Dinner => &self.dinner,
        }
    }

    pub fn slot_group_mut(&mut self, time: MealTime) -> &mut MealSlots {
        match time {
            MealTime::Breakfast => &mut self.breakfast,
            MealTime::Lunch => &mut self.lunch,
            MealTime::Dinner => &mut self.dinner,
        }
    }

    /// Total entries across all three meal times.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        MealTime::ALL.iter().map(|t| self.slot_group(*t).len()).sum()
    }
}

/// The two people whose portions the parallel slots distinguish.
#[derive(Debug, Clone)]
pub struct TrackedPair {
    pub first: String,
    pub second: String,
}

impl TrackedPair {
    #[must_use]
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    #[must_use]
    pub fn both(&self) -> BTreeSet<String> {
        BTreeSet::from([self.first.clone(), self.second.clone()])
    }

    /// True when `people` is exactly the tracked pair, nobody else.
    #[must_use]
    pub fn covers(&self, people: &BTreeSet<String>) -> bool {
        people.len() == 2 && people.contains(&self.first) && people.contains(&self.second)
    }

    /// Infer who ate a matched entry from its slot position.
    ///
    /// Recipe-sourced dishes and meal times with a single populated slot
    /// are shared by both; otherwise slot 0 belongs to `first` and slot 1
    /// to `second`.
    #[must_use]
    pub fn attribute(
        &self,
        source: Option<FoodSource>,
        slot: usize,
        populated: usize,
    ) -> BTreeSet<String> {
        if source == Some(FoodSource::Recipe) || populated == 1 {
            self.both()
        } else if slot == 1 {
            BTreeSet::from([self.second.clone()])
        } else {
            BTreeSet::from([self.first.clone()])
        }
    }
}
