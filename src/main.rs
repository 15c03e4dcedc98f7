//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `address_resolver` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use address_resolver::initialization::init_logger_with;
use address_resolver::{run_bulk, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting MAPBOX_ACCESS_TOKEN in .env without exporting it manually
    let _ = dotenvy::dotenv();

    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Run the bulk resolution using the library
    match run_bulk(config).await {
        Ok(report) => {
            println!(
                "✅ Processed {} address{} ({} resolved, {} from cache, {} failed) in {:.1}s",
                report.total,
                if report.total == 1 { "" } else { "es" },
                report.resolved,
                report.cache_hits,
                report.failed,
                report.elapsed_seconds
            );
            println!("Cache database: {}", report.db_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("address_resolver error: {:#}", e);
            process::exit(1);
        }
    }
}
