//! Core library for the mealtrail journal migrator.
//!
//! Parses a free-text meal journal exported as CSV into day records,
//! extracts and reconciles dish entries keyword by keyword, and writes
//! the result into a relational SQLite store.

pub mod cell;
pub mod db;
pub mod extract;
pub mod journal;
pub mod migrate;
pub mod models;
