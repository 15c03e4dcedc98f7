//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the engine,
//! including provider endpoints, timeouts, and retry parameters. Most of these
//! are defaults that can be overridden via the CLI or environment.

// Provider endpoints
/// Default endpoint for the free community geocoding service.
pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
/// Default endpoint for the commercial geocoding service.
pub const MAPBOX_ENDPOINT: &str = "https://api.mapbox.com";
/// Default endpoint for the CEP (Brazilian postal code) directory.
pub const VIACEP_ENDPOINT: &str = "https://viacep.com.br";

/// Default client identification string sent as the User-Agent header.
///
/// Nominatim's usage policy requires a descriptive identifier naming the
/// application, so this must never be a generic browser string. Users can
/// override it via the `--user-agent` CLI flag to add a contact address.
pub const DEFAULT_USER_AGENT: &str =
    concat!("address_resolver/", env!("CARGO_PKG_VERSION"), " (facility accreditation mapping)");

// Network timeouts
/// Hard per-request timeout in seconds, enforced on the shared HTTP client.
///
/// Applies to every provider call independently of retry/backoff so a single
/// hung request cannot stall a bulk run.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// Retry strategy
/// Base delay in milliseconds before the first retry.
/// Delays grow as `base * 2^(attempt-1)`: 1000ms, 2000ms, 4000ms, ...
pub const RETRY_BASE_DELAY_MS: u64 = 1000;
/// Maximum delay between retries in seconds (caps the exponential growth).
pub const RETRY_MAX_DELAY_SECS: u64 = 30;
/// Maximum number of attempts per provider call (initial attempt + retries).
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// Bulk driver pacing
/// Minimum spacing between consecutive resolutions in milliseconds.
///
/// Nominatim asks for at most ~1 request/second from bulk users; the
/// per-request backoff is the last line of defense, not the throttle.
pub const BULK_SPACING_MS: u64 = 1000;
/// Progress log interval for the bulk driver (every N addresses).
pub const BULK_PROGRESS_INTERVAL: usize = 25;

// Storage
/// Default SQLite database path (cache + facility records).
pub const DB_PATH: &str = "./address_resolver.db";

/// Source label reported for results served from the cache.
pub const CACHE_SOURCE: &str = "cache";
