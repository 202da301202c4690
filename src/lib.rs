//! Daily football-data.org ingestion: fetch each competition's matches,
//! flatten them, and store them in the `matches` SQLite table.

pub mod config;
pub mod db;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod report;
pub mod types;
