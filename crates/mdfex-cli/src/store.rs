//! SQLite-backed record store.
//!
//! Duplicate skipping relies on a UNIQUE constraint on the NF-e invoice key
//! together with INSERT OR IGNORE; counts are derived from affected rows.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use tracing::debug;

use mdfex_core::ManifestRecord;
use mdfex_core::error::StoreError;
use mdfex_core::store::{ManifestStore, PersistSummary, Result};

/// SQLite store enforcing uniqueness on the NF-e invoice key.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a store at `path`, creating the file and schema if missing.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::create_schema(&conn)?;
        Ok(Self { conn })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS manifest_records (
                id INTEGER PRIMARY KEY,
                emission_date TEXT NOT NULL,
                manifest_key TEXT,
                term_number TEXT NOT NULL,
                invoice_key TEXT NOT NULL UNIQUE,
                cte_number TEXT NOT NULL,
                invoice_number TEXT NOT NULL,
                flight_number TEXT NOT NULL,
                registration_date TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_records_flight
                ON manifest_records(flight_number, registration_date);
            "#,
        )
        .map_err(|e| StoreError::Schema(e.to_string()))?;
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM manifest_records", [], |row| {
                row.get(0)
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count as usize)
    }
}

impl ManifestStore for SqliteStore {
    fn persist(
        &mut self,
        records: &[ManifestRecord],
        flight_number: &str,
        registration_date: NaiveDate,
    ) -> Result<PersistSummary> {
        let mut inserted = 0;

        for record in records {
            let changed = self
                .conn
                .execute(
                    r#"INSERT OR IGNORE INTO manifest_records
                       (emission_date, manifest_key, term_number, invoice_key,
                        cte_number, invoice_number, flight_number, registration_date)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                    params![
                        record.emission_date,
                        record.manifest_key,
                        record.term_number,
                        record.invoice_key,
                        record.cte_number,
                        record.invoice_number,
                        flight_number,
                        registration_date.to_string(),
                    ],
                )
                .map_err(|e| StoreError::Database(e.to_string()))?;
            inserted += changed;
        }

        let total = records.len();
        debug!(
            "Persisted {} record(s) for flight {}: {} inserted, {} duplicate(s)",
            total,
            flight_number,
            inserted,
            total - inserted
        );

        Ok(PersistSummary {
            inserted,
            duplicates: total - inserted,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str) -> ManifestRecord {
        ManifestRecord {
            emission_date: "01/02/2023".to_string(),
            manifest_key: Some("9".repeat(44)),
            term_number: "555".to_string(),
            invoice_key: key.to_string(),
            cte_number: "3333".to_string(),
            invoice_number: "2222".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()
    }

    #[test]
    fn test_insert_or_ignore_counts() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let key_a = "1".repeat(44);
        let key_b = "2".repeat(44);

        let summary = store
            .persist(&[record(&key_a), record(&key_b)], "LA3350", date())
            .unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.duplicates, 0);

        let summary = store.persist(&[record(&key_a)], "LA3351", date()).unwrap();
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.duplicates, 1);

        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_persist_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.persist(&[record(&"5".repeat(44))], "LA3350", date()).unwrap();
        }

        // Reopen and check the uniqueness constraint survives.
        let mut store = SqliteStore::open(&path).unwrap();
        let summary = store.persist(&[record(&"5".repeat(44))], "LA3350", date()).unwrap();
        assert_eq!(summary.duplicates, 1);
        assert_eq!(store.count().unwrap(), 1);
    }
}
