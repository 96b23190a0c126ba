//! Reconciliation driver: the extract → merge → persist → commit pipeline
//! that moves journal entries into the relational store, one food name at
//! a time.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::extract::{MatchMode, Scan, extract, merge_adjacent};
use crate::models::{DayRecord, FoodSource, MealEntry, MealKind, MealTime, TrackedPair};

/// Persistence interface the driver writes through.
///
/// `insert_meal` persists one merged entry's whole insert group (meal
/// row, source association, people links) atomically: a failure must
/// leave no partial rows behind for that entry, and must not disturb
/// groups already committed.
pub trait MealStore {
    fn lookup_id(&self, source: FoodSource, name: &str) -> Result<Option<i64>>;

    /// Resolve person names to ids. Names with no match are simply absent
    /// from the returned map; the caller decides whether partial
    /// resolution is acceptable.
    fn lookup_people_ids(&self, names: &[String]) -> Result<HashMap<String, i64>>;

    fn insert_meal(&self, meal: &MealWrite<'_>) -> Result<i64>;
}

/// One fully resolved entry ready to be written.
#[derive(Debug)]
pub struct MealWrite<'a> {
    pub date: &'a str,
    pub time: MealTime,
    pub notes: Option<&'a str>,
    pub source: FoodSource,
    pub source_id: i64,
    pub kind: &'a str,
    pub people: Vec<i64>,
}

/// One food pass of the migration plan.
#[derive(Debug, Clone)]
pub struct FoodRequest<'a> {
    /// Journal keyword to extract.
    pub name: &'a str,
    pub source: FoodSource,
    /// Canonical name to resolve against the source table when it
    /// differs from the journal keyword.
    pub replace_name: Option<&'a str>,
    pub mode: MatchMode,
    /// Association type applied to entries without a parsed kind.
    pub kind_override: Option<&'a str>,
    /// Notes applied to entries without a parsed comment.
    pub comment_override: Option<&'a str>,
}

impl<'a> FoodRequest<'a> {
    #[must_use]
    pub fn exact(name: &'a str, source: FoodSource) -> Self {
        Self {
            name,
            source,
            replace_name: None,
            mode: MatchMode::Exact,
            kind_override: None,
            comment_override: None,
        }
    }
}

/// Counts reported back from one `insert_food` pass.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct InsertReport {
    /// Entries matched by the dry-run extraction.
    pub found: usize,
    /// Records left after merging complementary portions.
    pub merged: usize,
    /// Records written to the store.
    pub inserted: usize,
    /// Entries removed from the working set by the commit pass.
    pub removed: usize,
}

/// Owns the in-memory working set for the run and drives per-food passes
/// against the store.
pub struct Migrator<'a, S: MealStore> {
    store: &'a S,
    pair: TrackedPair,
    days: Vec<DayRecord>,
}

impl<'a, S: MealStore> Migrator<'a, S> {
    pub fn new(store: &'a S, pair: TrackedPair, days: Vec<DayRecord>) -> Self {
        Self { store, pair, days }
    }

    /// Entries still in the working set.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.days.iter().map(DayRecord::entry_count).sum()
    }

    #[must_use]
    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    /// Size a food pass without touching the store or the working set:
    /// dry-run extract plus merge, returning the would-be records.
    pub fn probe(&mut self, request: &FoodRequest<'_>) -> Vec<MealEntry> {
        let scan = Scan {
            keyword: request.name,
            source: Some(request.source),
            mode: request.mode,
        };
        let found = extract(&scan, &mut self.days, &self.pair, true);
        merge_adjacent(found, &self.pair)
    }

    /// Run one food pass: extract (dry-run), merge, resolve names,
    /// persist each merged record in its own transaction, then remove the
    /// matched entries from the working set.
    ///
    /// Lookup failures return an error before anything is written and
    /// leave the working set untouched; the caller is free to continue
    /// with the next food. The commit-mode removal only happens once
    /// every record has been persisted.
    pub fn insert_food(&mut self, request: &FoodRequest<'_>) -> Result<InsertReport> {
        let scan = Scan {
            keyword: request.name,
            source: Some(request.source),
            mode: request.mode,
        };
        let found = extract(&scan, &mut self.days, &self.pair, true);
        let found_count = found.len();
        let records = merge_adjacent(found, &self.pair);
        if records.is_empty() {
            return Ok(InsertReport::default());
        }

        let canonical = request.replace_name.unwrap_or(request.name);
        let source_id = self
            .store
            .lookup_id(request.source, canonical)?
            .with_context(|| {
                format!(
                    "'{canonical}' not found in '{}' table",
                    request.source.table()
                )
            })?;

        let mut names: Vec<String> = records
            .iter()
            .flat_map(|r| r.people.iter().cloned())
            .collect();
        names.sort_unstable();
        names.dedup();
        let people_ids = self.store.lookup_people_ids(&names)?;
        for record in &records {
            for person in &record.people {
                if !people_ids.contains_key(person) {
                    bail!("Person '{person}' not found in 'people' table");
                }
            }
        }

        let mut inserted = 0;
        for record in &records {
            let kind = record
                .kind
                .map(MealKind::as_str)
                .or(request.kind_override)
                .unwrap_or_else(|| request.source.default_kind());
            let notes = record.comment.as_deref().or(request.comment_override);
            let people: Vec<i64> = record.people.iter().map(|p| people_ids[p]).collect();
            self.store
                .insert_meal(&MealWrite {
                    date: &record.date,
                    time: record.time,
                    notes,
                    source: request.source,
                    source_id,
                    kind,
                    people,
                })
                .with_context(|| {
                    format!("Failed to persist '{}' on {}", record.name, record.date)
                })?;
            inserted += 1;
        }

        let removed = extract(&scan, &mut self.days, &self.pair, false).len();
        Ok(InsertReport {
            found: found_count,
            merged: records.len(),
            inserted,
            removed,
        })
    }

    /// Purge known noise keywords from the working set, with no
    /// persistence. Returns the per-keyword removal counts.
    pub fn clear_names(&mut self, names: &[&str], mode: MatchMode) -> Vec<(String, usize)> {
        names
            .iter()
            .map(|&name| {
                let scan = Scan {
                    keyword: name,
                    source: None,
                    mode,
                };
                let removed = extract(&scan, &mut self.days, &self.pair, false).len();
                (name.to_string(), removed)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::journal::parse_journal;

    fn pair() -> TrackedPair {
        TrackedPair::new("xx", "ww")
    }

    fn days() -> Vec<DayRecord> {
        let csv = "\
1,2023-04-01,milk,bento milk,红烧肉,红烧肉,牛丼 @Google 食堂,,,,,,
2,2023-04-02,,milk (fresh),红烧肉,,没吃,,,,,,
";
        parse_journal(csv.as_bytes()).unwrap()
    }

    fn store_with_lookups() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.add_person("xx").unwrap();
        db.add_person("ww").unwrap();
        db.add_food(FoodSource::Product, "milk").unwrap();
        db.add_food(FoodSource::Recipe, "红烧肉").unwrap();
        db.add_food(FoodSource::Restaurant, "牛丼屋").unwrap();
        db
    }

    #[test]
    fn test_insert_food_happy_path() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());
        let before = migrator.remaining();

        let report = migrator
            .insert_food(&FoodRequest::exact("milk", FoodSource::Product))
            .unwrap();
        // day 1 has two complementary portions that stay separate (kind
        // differs), day 2 has one shared portion
        assert_eq!(report.found, 3);
        assert_eq!(report.merged, 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.removed, 3);
        assert_eq!(migrator.remaining(), before - 3);
        assert_eq!(db.meal_count().unwrap(), 3);
        assert_eq!(db.association_count(FoodSource::Product).unwrap(), 3);
        // xx + ww on day 1, both on day 2's single populated slot
        assert_eq!(db.people_link_count().unwrap(), 4);
    }

    #[test]
    fn test_insert_food_merges_recipe_portions() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());

        let report = migrator
            .insert_food(&FoodRequest::exact("红烧肉", FoodSource::Recipe))
            .unwrap();
        // day 1's two portions merge into one shared record
        assert_eq!(report.found, 3);
        assert_eq!(report.merged, 2);
        assert_eq!(report.inserted, 2);
        // the commit pass still removes all three journal entries
        assert_eq!(report.removed, 3);
        assert_eq!(db.meal_count().unwrap(), 2);
    }

    #[test]
    fn test_insert_food_nothing_to_do() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());
        let report = migrator
            .insert_food(&FoodRequest::exact("披萨", FoodSource::Product))
            .unwrap();
        assert_eq!(report.found, 0);
        assert_eq!(report.inserted, 0);
        assert_eq!(db.meal_count().unwrap(), 0);
    }

    #[test]
    fn test_unknown_food_aborts_without_mutation() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());
        let before = migrator.remaining();

        let err = migrator
            .insert_food(&FoodRequest::exact("牛丼", FoodSource::Restaurant))
            .unwrap_err();
        assert!(err.to_string().contains("牛丼"));
        assert_eq!(migrator.remaining(), before);
        assert_eq!(db.meal_count().unwrap(), 0);
    }

    #[test]
    fn test_replace_name_resolves_canonical_entry() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());

        let report = migrator
            .insert_food(&FoodRequest {
                replace_name: Some("牛丼屋"),
                ..FoodRequest::exact("牛丼", FoodSource::Restaurant)
            })
            .unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(db.association_count(FoodSource::Restaurant).unwrap(), 1);
    }

    #[test]
    fn test_unresolved_person_aborts_without_mutation() {
        let db = Database::open_in_memory().unwrap();
        db.add_person("xx").unwrap();
        db.add_food(FoodSource::Product, "milk").unwrap();
        let mut migrator = Migrator::new(&db, pair(), days());
        let before = migrator.remaining();

        let err = migrator
            .insert_food(&FoodRequest::exact("milk", FoodSource::Product))
            .unwrap_err();
        assert!(err.to_string().contains("ww"));
        assert_eq!(migrator.remaining(), before);
        assert_eq!(db.meal_count().unwrap(), 0);
    }

    #[test]
    fn test_kind_resolution_order() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());
        migrator
            .insert_food(&FoodRequest {
                kind_override: Some("takeout"),
                ..FoodRequest::exact("milk", FoodSource::Product)
            })
            .unwrap();
        // parsed bento kind survives the override; unannotated entries
        // take the override instead of the source default
        assert_eq!(db.association_kinds(FoodSource::Product).unwrap(), vec![
            "takeout".to_string(),
            "takeout".to_string(),
            "takeout".to_string(),
        ]);
    }

    #[test]
    fn test_comment_becomes_notes() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());
        migrator
            .insert_food(&FoodRequest::exact("milk", FoodSource::Product))
            .unwrap();
        let notes = db.meal_notes().unwrap();
        assert!(notes.contains(&Some("fresh".to_string())));
    }

    #[test]
    fn test_clear_names_purges_noise() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());
        let before = migrator.remaining();
        let cleared = migrator.clear_names(&["没吃"], MatchMode::Exact);
        assert_eq!(cleared, vec![("没吃".to_string(), 1)]);
        assert_eq!(migrator.remaining(), before - 1);
        assert_eq!(db.meal_count().unwrap(), 0);
    }

    #[test]
    fn test_probe_leaves_working_set_alone() {
        let db = store_with_lookups();
        let mut migrator = Migrator::new(&db, pair(), days());
        let before = migrator.remaining();
        let records = migrator.probe(&FoodRequest::exact("红烧肉", FoodSource::Recipe));
        assert_eq!(records.len(), 2);
        assert_eq!(migrator.remaining(), before);
        assert_eq!(db.meal_count().unwrap(), 0);
    }
}
