//! Content-addressed geocode cache.
//!
//! A pure key-value store over the SHA-256 hash of the normalized address.
//! Reads never invoke network I/O. The cache is injected into the resolution
//! service as `Arc<dyn GeocodeCache>`: SQLite in production, an in-memory map
//! in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::models::CacheEntry;

/// Payload for a cache write. Hit counter and timestamps are managed by the
/// store itself.
#[derive(Debug, Clone)]
pub struct NewCacheEntry {
    /// SHA-256 hex digest of the hash-normalized address text.
    pub address_hash: String,
    /// Original (lightly normalized) address text, for auditing.
    pub address_text: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Provider that produced the coordinates.
    pub provider: String,
    /// Provider's display name for the match.
    pub display_name: Option<String>,
    /// Fallback tier that produced the coordinates.
    pub strategy: Option<String>,
}

/// The cache contract: `get` / `put` / `touch` keyed by content hash.
///
/// `put` is an upsert: on conflict it overwrites coordinates and provider
/// metadata but increments rather than resets the hit counter. `touch`
/// increments the hit counter and refreshes the last-used timestamp on a
/// cache hit. Concurrent `put`s for the same hash are last-writer-wins,
/// acceptable because coordinates for the same normalized address converge.
#[async_trait]
pub trait GeocodeCache: Send + Sync {
    /// Looks up an entry by content hash.
    async fn get(&self, address_hash: &str) -> Result<Option<CacheEntry>, DatabaseError>;
    /// Upserts an entry.
    async fn put(&self, entry: NewCacheEntry) -> Result<(), DatabaseError>;
    /// Records a hit on an existing entry; a missing hash is a no-op.
    async fn touch(&self, address_hash: &str) -> Result<(), DatabaseError>;
}

/// SQLite-backed cache over the `geocode_cache` table.
///
/// The hit counter is incremented database-side inside the upsert and touch
/// statements, so concurrent hits don't under-count; it remains best-effort
/// telemetry and nothing branches on its exact value.
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    /// Creates a cache over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCache { pool }
    }
}

#[async_trait]
impl GeocodeCache for SqliteCache {
    async fn get(&self, address_hash: &str) -> Result<Option<CacheEntry>, DatabaseError> {
        let entry = sqlx::query_as::<_, CacheEntry>(
            "SELECT address_hash, address_text, latitude, longitude, provider, display_name, \
             strategy, hit_count, created_at, last_used_at \
             FROM geocode_cache WHERE address_hash = ?1",
        )
        .bind(address_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn put(&self, entry: NewCacheEntry) -> Result<(), DatabaseError> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            "INSERT INTO geocode_cache \
             (address_hash, address_text, latitude, longitude, provider, display_name, strategy, \
              hit_count, created_at, last_used_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8) \
             ON CONFLICT(address_hash) DO UPDATE SET \
               address_text = excluded.address_text, \
               latitude = excluded.latitude, \
               longitude = excluded.longitude, \
               provider = excluded.provider, \
               display_name = excluded.display_name, \
               strategy = excluded.strategy, \
               hit_count = geocode_cache.hit_count + 1, \
               last_used_at = excluded.last_used_at",
        )
        .bind(&entry.address_hash)
        .bind(&entry.address_text)
        .bind(entry.latitude)
        .bind(entry.longitude)
        .bind(&entry.provider)
        .bind(&entry.display_name)
        .bind(&entry.strategy)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch(&self, address_hash: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE geocode_cache SET hit_count = hit_count + 1, last_used_at = ?2 \
             WHERE address_hash = ?1",
        )
        .bind(address_hash)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// In-memory cache for tests: a mutex-guarded map with the same upsert
/// semantics as the SQLite store.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries (test inspection helper).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GeocodeCache for MemoryCache {
    async fn get(&self, address_hash: &str) -> Result<Option<CacheEntry>, DatabaseError> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        Ok(entries.get(address_hash).cloned())
    }

    async fn put(&self, entry: NewCacheEntry) -> Result<(), DatabaseError> {
        let now = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get_mut(&entry.address_hash) {
            Some(existing) => {
                existing.address_text = entry.address_text;
                existing.latitude = entry.latitude;
                existing.longitude = entry.longitude;
                existing.provider = entry.provider;
                existing.display_name = entry.display_name;
                existing.strategy = entry.strategy;
                existing.hit_count += 1;
                existing.last_used_at = now;
            }
            None => {
                entries.insert(
                    entry.address_hash.clone(),
                    CacheEntry {
                        address_hash: entry.address_hash,
                        address_text: entry.address_text,
                        latitude: entry.latitude,
                        longitude: entry.longitude,
                        provider: entry.provider,
                        display_name: entry.display_name,
                        strategy: entry.strategy,
                        hit_count: 0,
                        created_at: now,
                        last_used_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn touch(&self, address_hash: &str) -> Result<(), DatabaseError> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        if let Some(entry) = entries.get_mut(address_hash) {
            entry.hit_count += 1;
            entry.last_used_at = Utc::now().timestamp_millis();
        }
        Ok(())
    }
}
