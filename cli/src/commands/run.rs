use std::path::Path;

use anyhow::{Context, Result};

use mealtrail_core::db::Database;
use mealtrail_core::extract::MatchMode;
use mealtrail_core::journal::parse_journal;
use mealtrail_core::migrate::Migrator;

use crate::plan;

pub(crate) fn cmd_run(db: &Database, path: &Path, dry_run: bool, json: bool) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let days = parse_journal(file)?;

    if days.is_empty() {
        if json {
            println!(
                "{}",
                serde_json::json!({ "error": "No day rows found in CSV file" })
            );
        } else {
            eprintln!("No day rows found in CSV file.");
        }
        return Ok(());
    }

    let day_count = days.len();
    let mut migrator = Migrator::new(db, plan::tracked_pair(), days);
    let total = migrator.remaining();

    if !json {
        let verb = if dry_run { "Probing" } else { "Migrating" };
        println!("{verb} {total} entries across {day_count} days.\n");
    }

    let mut passes = Vec::new();
    for request in plan::food_passes() {
        let name = request.name;
        if dry_run {
            let records = migrator.probe(&request);
            if json {
                passes.push(serde_json::json!({
                    "food": name,
                    "would_insert": records.len(),
                }));
            } else if !records.is_empty() {
                let count = records.len();
                println!("  {name}: would insert {count} record(s)");
            }
            continue;
        }
        match migrator.insert_food(&request) {
            Ok(report) => {
                if json {
                    passes.push(serde_json::json!({
                        "food": name,
                        "found": report.found,
                        "merged": report.merged,
                        "inserted": report.inserted,
                    }));
                } else if report.found > 0 {
                    let found = report.found;
                    let inserted = report.inserted;
                    println!("  {name}: found {found}, inserted {inserted}");
                }
            }
            Err(e) => {
                if json {
                    passes.push(serde_json::json!({
                        "food": name,
                        "error": format!("{e:#}"),
                    }));
                } else {
                    eprintln!("  Skipping '{name}': {e:#}");
                }
            }
        }
    }

    let mut cleared = Vec::new();
    if !dry_run {
        cleared.extend(migrator.clear_names(plan::NOISE_EXACT, MatchMode::Exact));
        cleared.extend(migrator.clear_names(plan::NOISE_SUBSTRING, MatchMode::Substring));
    }

    let remaining = migrator.remaining();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "dry_run": dry_run,
                "days": day_count,
                "entries": total,
                "passes": passes,
                "cleared": cleared
                    .iter()
                    .map(|(name, removed)| serde_json::json!({ "name": name, "removed": removed }))
                    .collect::<Vec<_>>(),
                "remaining": remaining,
            }))?
        );
        return Ok(());
    }

    for (name, removed) in &cleared {
        if *removed > 0 {
            println!("  Cleared {removed} noise entries for '{name}'");
        }
    }

    if dry_run {
        println!("\nDry run — no changes made.");
    } else {
        let migrated = total - remaining;
        println!("\n{migrated} of {total} entries migrated or cleared.");
        println!("{remaining} entries left for manual follow-up.");
        let meals = db.meal_count()?;
        println!("Database now holds {meals} meals.");
    }
    Ok(())
}
