//! Record store collaborator.
//!
//! The surrounding application owns facility records; the engine only needs
//! two operations from them: expanding a record reference into address
//! fields, and writing resolved coordinates back. Both sit behind an injected
//! trait with a SQLite implementation for production use and an in-memory
//! one for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Address fields a record reference expands into.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct RecordAddress {
    /// Primary free-text address.
    pub address: Option<String>,
    /// Full-form address text, preferred when present.
    pub full_address: Option<String>,
    /// Secondary service-location address.
    pub alternate_address: Option<String>,
    /// Postal code (CEP).
    pub postal_code: Option<String>,
}

/// The record-store contract used by the resolution service.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads the address fields for a record reference, or `None` if the
    /// record doesn't exist.
    async fn load_address(
        &self,
        record_reference: &str,
    ) -> Result<Option<RecordAddress>, DatabaseError>;

    /// Persists resolved coordinates onto the record.
    async fn save_coordinates(
        &self,
        record_reference: &str,
        latitude: f64,
        longitude: f64,
        geocoded_at: i64,
    ) -> Result<(), DatabaseError>;
}

/// SQLite-backed record store over the `facilities` table.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteRecordStore { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn load_address(
        &self,
        record_reference: &str,
    ) -> Result<Option<RecordAddress>, DatabaseError> {
        let record = sqlx::query_as::<_, RecordAddress>(
            "SELECT address, full_address, alternate_address, postal_code \
             FROM facilities WHERE id = ?1",
        )
        .bind(record_reference)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn save_coordinates(
        &self,
        record_reference: &str,
        latitude: f64,
        longitude: f64,
        geocoded_at: i64,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE facilities SET latitude = ?2, longitude = ?3, geocoded_at = ?4 \
             WHERE id = ?1",
        )
        .bind(record_reference)
        .bind(latitude)
        .bind(longitude)
        .bind(geocoded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Saved coordinates, exposed for test inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedCoordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Write-back timestamp, epoch millis.
    pub geocoded_at: i64,
}

/// In-memory record store for tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    addresses: Mutex<HashMap<String, RecordAddress>>,
    saved: Mutex<HashMap<String, SavedCoordinates>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record so `load_address` can find it.
    pub fn insert(&self, record_reference: impl Into<String>, address: RecordAddress) {
        self.addresses
            .lock()
            .expect("record mutex poisoned")
            .insert(record_reference.into(), address);
    }

    /// Coordinates written back for a record, if any.
    pub fn saved(&self, record_reference: &str) -> Option<SavedCoordinates> {
        self.saved
            .lock()
            .expect("record mutex poisoned")
            .get(record_reference)
            .copied()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load_address(
        &self,
        record_reference: &str,
    ) -> Result<Option<RecordAddress>, DatabaseError> {
        let addresses = self.addresses.lock().expect("record mutex poisoned");
        Ok(addresses.get(record_reference).cloned())
    }

    async fn save_coordinates(
        &self,
        record_reference: &str,
        latitude: f64,
        longitude: f64,
        geocoded_at: i64,
    ) -> Result<(), DatabaseError> {
        self.saved.lock().expect("record mutex poisoned").insert(
            record_reference.to_string(),
            SavedCoordinates {
                latitude,
                longitude,
                geocoded_at,
            },
        );
        Ok(())
    }
}
