//! Journal CSV parsing.
//!
//! Each data row is one calendar day: a date, six meal cells (two
//! parallel cells per meal time), and five day-level free-text fields.
//! The file carries no header; short rows are blank or trailer rows and
//! are skipped rather than rejected.

use std::io::Read;

use anyhow::{Context, Result};

use crate::cell::parse_cell;
use crate::models::{DayNotes, DayRecord, MealSlots, MealTime};

/// Minimum positional fields a row needs to count as a day row.
const MIN_FIELDS: usize = 10;

/// Parse a journal export from any reader.
///
/// Column layout: 1 = date, 2–3 = breakfast cells, 4–5 = lunch cells,
/// 6–7 = dinner cells, 8–12 = day notes. An empty meal cell produces an
/// empty slot in place, keeping slot positions aligned. Missing trailing
/// note columns degrade to empty strings.
pub fn parse_journal<R: Read>(reader: R) -> Result<Vec<DayRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut days = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", line_num + 1))?;
        if record.len() < MIN_FIELDS {
            continue;
        }

        let field = |i: usize| record.get(i).unwrap_or("");
        let date = normalize_date(field(1));
        let cell = |i: usize, time: MealTime| parse_cell(field(i), &date, time);

        let breakfast = MealSlots::new(
            cell(2, MealTime::Breakfast),
            cell(3, MealTime::Breakfast),
        );
        let lunch = MealSlots::new(cell(4, MealTime::Lunch), cell(5, MealTime::Lunch));
        let dinner = MealSlots::new(cell(6, MealTime::Dinner), cell(7, MealTime::Dinner));
        let notes = DayNotes {
            special: field(8).to_string(),
            exercise: field(9).to_string(),
            activity: field(10).to_string(),
            entertainment: field(11).to_string(),
            housekeeping: field(12).to_string(),
        };

        days.push(DayRecord {
            date,
            breakfast,
            lunch,
            dinner,
            notes,
        });
    }
    Ok(days)
}

/// Normalize a journal date to `YYYY-MM-DD` when it parses in a known
/// format; anything else is kept verbatim rather than failing the row.
fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, fmt) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
1,2023-04-01,milk,bento milk,蛋炒饭,小锅米线,牛丼 w/ ww+xx (leftover) @Google 食堂,,hiking,run 5k,museum,movie night,laundry
2,2023-04-02,,粥,面条,,红烧牛肉面,红烧牛肉面,,,,,
trailer
";

    #[test]
    fn test_parses_day_rows_and_skips_short_ones() {
        let days = parse_journal(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2023-04-01");
        assert_eq!(days[1].date, "2023-04-02");
    }

    #[test]
    fn test_meal_cells_land_in_their_slots() {
        let days = parse_journal(SAMPLE_CSV.as_bytes()).unwrap();
        let day = &days[0];
        assert_eq!(day.breakfast.slots[0][0].name, "milk");
        assert_eq!(day.breakfast.slots[1][0].name, "milk");
        assert_eq!(day.lunch.slots[0][0].name, "蛋炒饭");
        assert_eq!(day.lunch.slots[1][0].name, "小锅米线");
        assert_eq!(day.dinner.slots[0][0].name, "牛丼");
        assert!(day.dinner.slots[1].is_empty());
    }

    #[test]
    fn test_empty_cell_keeps_slot_alignment() {
        let days = parse_journal(SAMPLE_CSV.as_bytes()).unwrap();
        let day = &days[1];
        assert!(day.breakfast.slots[0].is_empty());
        assert_eq!(day.breakfast.slots[1][0].name, "粥");
        assert_eq!(day.breakfast.populated(), 1);
        assert_eq!(day.dinner.populated(), 2);
    }

    #[test]
    fn test_day_notes_are_verbatim() {
        let days = parse_journal(SAMPLE_CSV.as_bytes()).unwrap();
        let notes = &days[0].notes;
        assert_eq!(notes.special, "hiking");
        assert_eq!(notes.exercise, "run 5k");
        assert_eq!(notes.activity, "museum");
        assert_eq!(notes.entertainment, "movie night");
        assert_eq!(notes.housekeeping, "laundry");
        // second row has no note columns beyond the minimum
        assert_eq!(days[1].notes.housekeeping, "");
    }

    #[test]
    fn test_entries_carry_row_date_and_time() {
        let days = parse_journal(SAMPLE_CSV.as_bytes()).unwrap();
        let entry = &days[0].dinner.slots[0][0];
        assert_eq!(entry.date, "2023-04-01");
        assert_eq!(entry.time, MealTime::Dinner);
    }

    #[test]
    fn test_date_normalization() {
        let csv = "1,4/1/2023,a,,,,,,,x\n2,2023/04/02,b,,,,,,,x\n3,sometime,c,,,,,,,x\n";
        let days = parse_journal(csv.as_bytes()).unwrap();
        assert_eq!(days[0].date, "2023-04-01");
        assert_eq!(days[1].date, "2023-04-02");
        assert_eq!(days[2].date, "sometime");
    }
}
