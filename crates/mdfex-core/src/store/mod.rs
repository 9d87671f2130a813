//! Persistence interface for extracted records.
//!
//! Implementations enforce uniqueness on the NF-e invoice key and report how
//! many submitted records were net-new versus already stored. The core never
//! re-reads or mutates records once they are handed over.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::models::record::ManifestRecord;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of a persist call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistSummary {
    /// Records that were net-new.
    pub inserted: usize,
    /// Records skipped because their NF-e key was already stored.
    pub duplicates: usize,
    /// Records submitted.
    pub total: usize,
}

/// Trait for record persistence with duplicate-skip semantics.
pub trait ManifestStore {
    /// Persist `records` under the given flight number and registration date,
    /// skipping any whose NF-e key is already stored.
    fn persist(
        &mut self,
        records: &[ManifestRecord],
        flight_number: &str,
        registration_date: NaiveDate,
    ) -> Result<PersistSummary>;
}

/// A record as held by [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub record: ManifestRecord,
    pub flight_number: String,
    pub registration_date: NaiveDate,
}

/// In-memory store, the reference duplicate-skip implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: HashSet<String>,
    records: Vec<StoredRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether an NF-e key is already stored.
    pub fn contains_key(&self, invoice_key: &str) -> bool {
        self.keys.contains(invoice_key)
    }

    /// Stored records, in insertion order.
    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }
}

impl ManifestStore for MemoryStore {
    fn persist(
        &mut self,
        records: &[ManifestRecord],
        flight_number: &str,
        registration_date: NaiveDate,
    ) -> Result<PersistSummary> {
        let mut inserted = 0;
        let mut duplicates = 0;

        for record in records {
            if self.keys.insert(record.invoice_key.clone()) {
                self.records.push(StoredRecord {
                    record: record.clone(),
                    flight_number: flight_number.to_string(),
                    registration_date,
                });
                inserted += 1;
            } else {
                duplicates += 1;
            }
        }

        debug!(
            "Persisted {} record(s) for flight {}: {} inserted, {} duplicate(s)",
            records.len(),
            flight_number,
            inserted,
            duplicates
        );

        Ok(PersistSummary {
            inserted,
            duplicates,
            total: records.len(),
        })
    }
}
