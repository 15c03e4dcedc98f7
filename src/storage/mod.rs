//! Persistence: connection pool, migrations, geocode cache, facility records.

mod cache;
mod migrations;
mod pool;
mod records;

pub use cache::{GeocodeCache, MemoryCache, NewCacheEntry, SqliteCache};
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use records::{MemoryRecordStore, RecordAddress, RecordStore, SavedCoordinates, SqliteRecordStore};
