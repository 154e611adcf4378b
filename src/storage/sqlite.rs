//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::record::{ExchangeRecord, MarketRow, OverviewStats, Tokens};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
    })
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status";

fn encode(tokens: &Tokens) -> StorageResult<String> {
    Ok(serde_json::to_string(tokens)?)
}

fn encode_opt(tokens: &Option<Tokens>) -> StorageResult<Option<String>> {
    tokens.as_ref().map(encode).transpose()
}

fn decode(raw: &str) -> StorageResult<Tokens> {
    Ok(serde_json::from_str(raw)?)
}

fn decode_opt(raw: Option<String>) -> StorageResult<Option<Tokens>> {
    raw.as_deref().map(decode).transpose()
}

/// Raw `exchange_records` columns before token decoding
struct StoredRecord {
    id: i64,
    exchange: String,
    overview: [String; 6],
    market_pages: u32,
    scraped_at: String,
}

/// Raw `market_rows` columns before token decoding
struct StoredRow {
    base_coin: Option<String>,
    name: Option<String>,
    volume: Option<String>,
    volume_percent: Option<String>,
}

impl StoredRecord {
    fn into_record(self, markets: Vec<MarketRow>) -> StorageResult<ExchangeRecord> {
        let [total_volume, volume_in_base_asset, listed_asset_count, market_count_raw, market_dominance, market_rank] =
            self.overview;

        let scraped_at = DateTime::parse_from_rfc3339(&self.scraped_at)
            .map_err(|e| StorageError::Corrupt(format!("scraped_at '{}': {}", self.scraped_at, e)))?
            .with_timezone(&Utc);

        Ok(ExchangeRecord {
            exchange: self.exchange,
            overview: OverviewStats {
                total_volume: decode(&total_volume)?,
                volume_in_base_asset: decode(&volume_in_base_asset)?,
                listed_asset_count: decode(&listed_asset_count)?,
                market_count_raw: decode(&market_count_raw)?,
                market_dominance: decode(&market_dominance)?,
                market_rank: decode(&market_rank)?,
            },
            markets,
            market_pages: self.market_pages,
            scraped_at,
        })
    }
}

impl StoredRow {
    fn into_row(self) -> StorageResult<MarketRow> {
        Ok(MarketRow {
            base_coin: decode_opt(self.base_coin)?,
            name: self.name,
            volume: self.volume,
            volume_percent: decode_opt(self.volume_percent)?,
        })
    }
}

impl SqliteStorage {
    fn load_market_rows(&self, record_id: i64) -> StorageResult<Vec<MarketRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT base_coin, name, volume, volume_percent FROM market_rows
             WHERE record_id = ?1 ORDER BY position",
        )?;

        let stored = stmt
            .query_map(params![record_id], |row| {
                Ok(StoredRow {
                    base_coin: row.get(0)?,
                    name: row.get(1)?,
                    volume: row.get(2)?,
                    volume_percent: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        stored.into_iter().map(StoredRow::into_row).collect()
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn list_runs(&self) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs ORDER BY id DESC", RUN_COLUMNS))?;

        let runs = stmt
            .query_map([], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Exchange Records =====

    fn insert_exchange_record(
        &mut self,
        run_id: i64,
        record: &ExchangeRecord,
    ) -> StorageResult<i64> {
        let overview = &record.overview;
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO exchange_records (
                run_id, exchange, total_volume, volume_in_base_asset, listed_asset_count,
                market_count_raw, market_dominance, market_rank, market_pages, scraped_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run_id,
                record.exchange,
                encode(&overview.total_volume)?,
                encode(&overview.volume_in_base_asset)?,
                encode(&overview.listed_asset_count)?,
                encode(&overview.market_count_raw)?,
                encode(&overview.market_dominance)?,
                encode(&overview.market_rank)?,
                record.market_pages,
                record.scraped_at.to_rfc3339(),
            ],
        )?;
        let record_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO market_rows (record_id, position, base_coin, name, volume, volume_percent)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for (position, row) in record.markets.iter().enumerate() {
                stmt.execute(params![
                    record_id,
                    position as i64,
                    encode_opt(&row.base_coin)?,
                    row.name,
                    row.volume,
                    encode_opt(&row.volume_percent)?,
                ])?;
            }
        }

        tx.commit()?;
        Ok(record_id)
    }

    fn load_exchange_records(&self, run_id: i64) -> StorageResult<Vec<ExchangeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, exchange, total_volume, volume_in_base_asset, listed_asset_count,
                    market_count_raw, market_dominance, market_rank, market_pages, scraped_at
             FROM exchange_records WHERE run_id = ?1 ORDER BY id",
        )?;

        let stored = stmt
            .query_map(params![run_id], |row| {
                Ok(StoredRecord {
                    id: row.get(0)?,
                    exchange: row.get(1)?,
                    overview: [
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                    ],
                    market_pages: row.get(8)?,
                    scraped_at: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        stored
            .into_iter()
            .map(|record| {
                let markets = self.load_market_rows(record.id)?;
                record.into_record(markets)
            })
            .collect()
    }

    // ===== Statistics =====

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_exchange_records(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM exchange_records WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_market_rows(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM market_rows m
             JOIN exchange_records e ON e.id = m.record_id
             WHERE e.run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
