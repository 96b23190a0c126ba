//! Keyword extraction and shared-meal merging over the day list.
//!
//! Extraction is the central primitive of the migration: a dry-run pass
//! sizes what a keyword would pull out, a commit pass actually removes
//! the matched entries from the working set. Both walk days, meal times,
//! slots, and entries in a fixed order; the merge reducer relies on it.

use std::collections::BTreeSet;

use crate::models::{DayRecord, FoodSource, MealEntry, MealSlots, MealTime, TrackedPair};

/// How a keyword compares against an entry name. Both modes are
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Substring,
}

impl MatchMode {
    fn matches(self, keyword: &str, name: &str) -> bool {
        let name = name.to_lowercase();
        match self {
            MatchMode::Exact => keyword == name,
            MatchMode::Substring => name.contains(keyword),
        }
    }
}

/// One keyword pass over the working set.
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    pub keyword: &'a str,
    pub source: Option<FoodSource>,
    pub mode: MatchMode,
}

/// Collect every entry matching the scan, in day, then slot, then
/// within-slot order, with the slot-inferred people unioned into each
/// returned copy.
///
/// A dry-run leaves the working set untouched and is idempotent. A
/// commit pass removes the matched entries from their slot groups,
/// preserving the order and slot positions of what remains.
pub fn extract(
    scan: &Scan,
    days: &mut [DayRecord],
    pair: &TrackedPair,
    dry_run: bool,
) -> Vec<MealEntry> {
    let keyword = scan.keyword.to_lowercase();
    let mut found = Vec::new();
    for day in days.iter_mut() {
        for time in MealTime::ALL {
            let (matched, remaining) = scan_slots(day.slot_group(time), &keyword, scan, pair);
            if matched.is_empty() {
                continue;
            }
            found.extend(matched);
            if !dry_run {
                *day.slot_group_mut(time) = remaining;
            }
        }
    }
    found
}

/// Scan one slot group without mutating it, returning the matched copies
/// and the group as it would look after their removal. The caller decides
/// whether to adopt the rewritten group.
fn scan_slots(
    slots: &MealSlots,
    keyword: &str,
    scan: &Scan,
    pair: &TrackedPair,
) -> (Vec<MealEntry>, MealSlots) {
    let populated = slots.populated();
    let mut matched = Vec::new();
    let mut remaining = MealSlots::default();
    for (slot, entries) in slots.slots.iter().enumerate() {
        for entry in entries {
            if scan.mode.matches(keyword, &entry.name) {
                let mut hit = entry.clone();
                hit.people.extend(pair.attribute(scan.source, slot, populated));
                matched.push(hit);
            } else {
                remaining.slots[slot].push(entry.clone());
            }
        }
    }
    (matched, remaining)
}

/// Collapse adjacent extracted entries that describe the same dish cooked
/// into two slots, one portion per person, into a single shared entry.
///
/// Two entries merge only when date, name, time, and kind all agree and
/// their people sets together cover exactly the tracked pair. Comparison
/// is adjacency-only: entries separated by a non-matching entry stay
/// separate.
#[must_use]
pub fn merge_adjacent(entries: Vec<MealEntry>, pair: &TrackedPair) -> Vec<MealEntry> {
    let mut merged: Vec<MealEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(last) = merged.last_mut() {
            let union: BTreeSet<String> = last.people.union(&entry.people).cloned().collect();
            if last.date == entry.date
                && last.name == entry.name
                && last.time == entry.time
                && last.kind == entry.kind
                && pair.covers(&union)
            {
                last.people = union;
                continue;
            }
        }
        merged.push(entry);
    }
    merged
}
