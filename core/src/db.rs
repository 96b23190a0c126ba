//! SQLite adapter for the destination store.
//!
//! The migrator only ever resolves names to ids and appends rows; the
//! destination schema is created when absent and an already-populated
//! database is left untouched.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::migrate::{MealStore, MealWrite};
use crate::models::FoodSource;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS people (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS recipe (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS restaurant (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS product (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS meal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                notes TEXT
            );

            CREATE TABLE IF NOT EXISTS meal_recipe (
                meal INTEGER NOT NULL REFERENCES meal(id),
                recipe INTEGER NOT NULL REFERENCES recipe(id),
                type TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meal_restaurant (
                meal INTEGER NOT NULL REFERENCES meal(id),
                restaurant INTEGER NOT NULL REFERENCES restaurant(id),
                type TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meal_product (
                meal INTEGER NOT NULL REFERENCES meal(id),
                product INTEGER NOT NULL REFERENCES product(id),
                type TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meal_people (
                meal INTEGER NOT NULL REFERENCES meal(id),
                people INTEGER NOT NULL REFERENCES people(id)
            );

            CREATE INDEX IF NOT EXISTS idx_meal_date ON meal(date);",
        )?;
        Ok(())
    }

    // --- Lookup table seeding ---

    pub fn add_person(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO people (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn add_food(&self, source: FoodSource, name: &str) -> Result<i64> {
        self.conn.execute(
            &format!("INSERT INTO {} (name) VALUES (?1)", source.table()),
            params![name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // --- Reporting queries ---

    pub fn meal_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM meal", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn association_count(&self, source: FoodSource) -> Result<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", source.link_table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn people_link_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM meal_people", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn association_kinds(&self, source: FoodSource) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT type FROM {} ORDER BY meal",
            source.link_table()
        ))?;
        let kinds = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(kinds)
    }

    pub fn meal_notes(&self) -> Result<Vec<Option<String>>> {
        let mut stmt = self.conn.prepare("SELECT notes FROM meal ORDER BY id")?;
        let notes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }
}

impl MealStore for Database {
    fn lookup_id(&self, source: FoodSource, name: &str) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id FROM {} WHERE name = ?1", source.table()))?;
        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn lookup_people_ids(&self, names: &[String]) -> Result<HashMap<String, i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM people WHERE name = ?1")?;
        let mut ids = HashMap::new();
        for name in names {
            let mut rows = stmt.query(params![name])?;
            if let Some(row) = rows.next()? {
                ids.insert(name.clone(), row.get(0)?);
            }
        }
        Ok(ids)
    }

    /// Insert one meal with its source association and people links as a
    /// single transaction; a failure partway through rolls back the whole
    /// group.
    fn insert_meal(&self, meal: &MealWrite<'_>) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO meal (date, time, notes) VALUES (?1, ?2, ?3)",
            params![meal.date, meal.time.as_str(), meal.notes],
        )?;
        let meal_id = tx.last_insert_rowid();
        tx.execute(
            &format!(
                "INSERT INTO {} (meal, {}, type) VALUES (?1, ?2, ?3)",
                meal.source.link_table(),
                meal.source.table()
            ),
            params![meal_id, meal.source_id, meal.kind],
        )?;
        for person_id in &meal.people {
            tx.execute(
                "INSERT INTO meal_people (meal, people) VALUES (?1, ?2)",
                params![meal_id, person_id],
            )?;
        }
        tx.commit()?;
        Ok(meal_id)
    }
}
