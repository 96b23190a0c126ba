use std::path::Path;

use anyhow::{Context, Result};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealtrail_core::extract::{MatchMode, Scan, extract, merge_adjacent};
use mealtrail_core::journal::parse_journal;
use mealtrail_core::models::{FoodSource, MealEntry};

use crate::plan;

pub(crate) fn cmd_probe(
    path: &Path,
    keyword: &str,
    source: Option<FoodSource>,
    mode: MatchMode,
    json: bool,
) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut days = parse_journal(file)?;

    let pair = plan::tracked_pair();
    let scan = Scan {
        keyword,
        source,
        mode,
    };
    let records = merge_adjacent(extract(&scan, &mut days, &pair, true), &pair);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("No entries match '{keyword}'");
        return Ok(());
    }

    print_record_table(&records);
    let count = records.len();
    println!("\n{count} record(s) would be inserted for '{keyword}'.");
    Ok(())
}

fn print_record_table(records: &[MealEntry]) {
    #[derive(Tabled)]
    struct RecordRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "People")]
        people: String,
        #[tabled(rename = "Kind")]
        kind: String,
        #[tabled(rename = "Location")]
        location: String,
        #[tabled(rename = "Comment")]
        comment: String,
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            date: r.date.clone(),
            time: r.time.to_string(),
            name: r.name.clone(),
            people: r
                .people
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            kind: r.kind.map(|k| k.as_str().to_string()).unwrap_or_default(),
            location: r.location.clone().unwrap_or_default(),
            comment: r.comment.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..2)).with(Alignment::left()))
        .to_string();
    println!("{table}");
}
