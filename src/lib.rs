//! address_resolver library: facility address geocoding
//!
//! This library converts free-text facility addresses into latitude/longitude
//! coordinates. Resolution runs through a content-addressed SQLite cache first,
//! then through a tiered fallback sequence of provider calls (primary address,
//! alternate address, postal-code city centroid, alternate provider), each
//! wrapped in bounded retries with exponential backoff.
//!
//! # Example
//!
//! ```no_run
//! use address_resolver::{run_bulk, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("addresses.txt"),
//!     ..Default::default()
//! };
//!
//! let report = run_bulk(config).await?;
//! println!("Resolved {} of {} addresses ({} from cache)",
//!          report.resolved, report.total, report.cache_hits);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
pub mod initialization;
mod models;
mod normalize;
mod providers;
mod resolver;
mod retry;
mod service;
mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, ProviderKind};
pub use error_handling::{DatabaseError, GeocodeError, InitializationError};
pub use models::{AddressQuery, CacheEntry, GeocodedPoint, ResolutionResult};
pub use providers::{
    GeocodeProvider, MapboxClient, NominatimClient, PostalCodeCity, PostalDirectory, ViaCepClient,
};
pub use resolver::{FallbackResolver, Resolved, Strategy};
pub use retry::RetryPolicy;
pub use run::{run_bulk, RunReport};
pub use service::ResolutionService;
pub use storage::{
    init_db_pool_with_path, run_migrations, GeocodeCache, MemoryCache, MemoryRecordStore,
    NewCacheEntry, RecordAddress, RecordStore, SavedCoordinates, SqliteCache, SqliteRecordStore,
};

// Internal run module (bulk resolution driver)
mod run {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use log::{info, warn};
    use tokio::io::{AsyncBufReadExt, BufReader};

    use crate::config::{Config, BULK_PROGRESS_INTERVAL};
    use crate::error_handling::{print_outcome_statistics, Outcome, OutcomeStats};
    use crate::initialization::init_service;
    use crate::models::AddressQuery;
    use crate::storage::{init_db_pool_with_path, run_migrations};

    /// Results of a bulk resolution run.
    #[derive(Debug, Clone)]
    pub struct RunReport {
        /// Total number of addresses processed
        pub total: usize,
        /// Number of addresses successfully resolved (cache hits included)
        pub resolved: usize,
        /// Number of resolutions served from the cache
        pub cache_hits: usize,
        /// Number of addresses that could not be resolved
        pub failed: usize,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
        /// Path to the SQLite database holding the cache
        pub db_path: PathBuf,
    }

    /// Runs a bulk resolution with the provided configuration.
    ///
    /// This is the main entry point for the library. It reads addresses from
    /// the input file (one per line, `-` for stdin; empty lines and `#`
    /// comments are skipped), resolves them sequentially with the configured
    /// spacing between consecutive resolutions, and records every result in
    /// the SQLite cache.
    ///
    /// Resolutions run one at a time on purpose: the free community provider
    /// limits clients to one request per second, so the driver paces rather
    /// than parallelizes.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The input file cannot be opened
    /// - Database initialization or migration fails
    /// - The HTTP client or provider wiring cannot be initialized
    pub async fn run_bulk(config: Config) -> Result<RunReport> {
        let is_stdin = config.file.as_os_str() == "-";

        let mut stdin_lines = if is_stdin {
            info!("Reading addresses from stdin");
            Some(BufReader::new(tokio::io::stdin()).lines())
        } else {
            None
        };

        let mut file_lines = if !is_stdin {
            let file = tokio::fs::File::open(&config.file)
                .await
                .context("Failed to open input file")?;
            Some(BufReader::new(file).lines())
        } else {
            None
        };

        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        let service =
            init_service(&config, &pool).context("Failed to initialize resolution service")?;

        let stats = OutcomeStats::new();
        let start_time = std::time::Instant::now();
        let mut pacing = tokio::time::interval(std::time::Duration::from_millis(
            config.spacing_ms.max(1),
        ));
        pacing.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut total = 0usize;
        let mut resolved = 0usize;
        let mut cache_hits = 0usize;
        let mut failed = 0usize;

        loop {
            let line_result = match (&mut stdin_lines, &mut file_lines) {
                (Some(lines), _) => lines.next_line().await,
                (_, Some(lines)) => lines.next_line().await,
                (None, None) => unreachable!("one input source is always set"),
            };
            let line = match line_result {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read line from input: {e}");
                    continue;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            // Rate pacing: the first tick fires immediately, later ticks
            // keep consecutive provider calls at least spacing_ms apart
            pacing.tick().await;

            let query = AddressQuery {
                force_refresh: config.force_refresh,
                ..AddressQuery::from_text(trimmed)
            };
            let result = service.resolve_address(query).await;

            let outcome = Outcome::from_result(&result);
            stats.increment(outcome);

            total += 1;
            if result.success {
                resolved += 1;
                if result.cached {
                    cache_hits += 1;
                }
            } else {
                failed += 1;
                warn!(
                    "Could not resolve '{}': {}",
                    trimmed,
                    result.message.as_deref().unwrap_or("unknown error")
                );
            }

            if total % BULK_PROGRESS_INTERVAL == 0 {
                info!(
                    "Progress: {} processed ({} resolved, {} cached, {} failed)",
                    total, resolved, cache_hits, failed
                );
            }
        }

        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        info!(
            "Run complete: {} addresses in {:.1}s",
            total, elapsed_seconds
        );
        print_outcome_statistics(&stats);

        Ok(RunReport {
            total,
            resolved,
            cache_hits,
            failed,
            elapsed_seconds,
            db_path: config.db_path,
        })
    }
}
