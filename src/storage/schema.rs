//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the scraper database.

/// SQL schema for the database
///
/// Token columns hold JSON arrays of strings; a NULL market cell was absent
/// from the page.
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per emitted exchange record
CREATE TABLE IF NOT EXISTS exchange_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    exchange TEXT NOT NULL,
    total_volume TEXT NOT NULL,
    volume_in_base_asset TEXT NOT NULL,
    listed_asset_count TEXT NOT NULL,
    market_count_raw TEXT NOT NULL,
    market_dominance TEXT NOT NULL,
    market_rank TEXT NOT NULL,
    market_pages INTEGER NOT NULL,
    scraped_at TEXT NOT NULL,
    UNIQUE(run_id, exchange)
);

CREATE INDEX IF NOT EXISTS idx_exchange_records_run ON exchange_records(run_id);

-- Market rows in emission order
CREATE TABLE IF NOT EXISTS market_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id INTEGER NOT NULL REFERENCES exchange_records(id),
    position INTEGER NOT NULL,
    base_coin TEXT,
    name TEXT,
    volume TEXT,
    volume_percent TEXT,
    UNIQUE(record_id, position)
);

CREATE INDEX IF NOT EXISTS idx_market_rows_record ON market_rows(record_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
