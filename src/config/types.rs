//! Configuration types and CLI options.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    BULK_SPACING_MS, DB_PATH, DEFAULT_USER_AGENT, MAPBOX_ENDPOINT, NOMINATIM_ENDPOINT,
    REQUEST_TIMEOUT_SECS, RETRY_BASE_DELAY_MS, RETRY_MAX_ATTEMPTS, VIACEP_ENDPOINT,
};

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// The geocoding backend used for the primary resolution tiers.
///
/// A closed set: the fallback resolver stays provider-agnostic and dispatches
/// through the common `GeocodeProvider` capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// The free community provider (default).
    Nominatim,
    /// The commercial provider; requires an access token.
    Mapbox,
}

impl ProviderKind {
    /// Canonical provider name as reported in results and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Nominatim => "nominatim",
            ProviderKind::Mapbox => "mapbox",
        }
    }
}

/// Engine configuration, parsed from CLI flags and environment variables.
///
/// Can also be constructed programmatically for library use:
///
/// ```no_run
/// use address_resolver::Config;
///
/// let config = Config {
///     file: std::path::PathBuf::from("addresses.txt"),
///     retry_max_attempts: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "address_resolver", about = "Resolve facility addresses to coordinates")]
pub struct Config {
    /// File with one address per line, or "-" for stdin
    #[arg(default_value = "-")]
    pub file: PathBuf,

    /// SQLite database path (geocode cache + facility records)
    #[arg(long, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Default geocoding provider
    #[arg(long, value_enum, default_value_t = ProviderKind::Nominatim)]
    pub provider: ProviderKind,

    /// Nominatim endpoint
    #[arg(long, default_value = NOMINATIM_ENDPOINT)]
    pub nominatim_endpoint: String,

    /// Mapbox endpoint
    #[arg(long, default_value = MAPBOX_ENDPOINT)]
    pub mapbox_endpoint: String,

    /// Mapbox access token; enables the alternate-provider fallback tier
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN")]
    pub mapbox_token: Option<String>,

    /// CEP directory endpoint
    #[arg(long, default_value = VIACEP_ENDPOINT)]
    pub viacep_endpoint: String,

    /// Client identification string (Nominatim usage policy requires one)
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum attempts per provider call (initial attempt + retries)
    #[arg(long, default_value_t = RETRY_MAX_ATTEMPTS)]
    pub retry_max_attempts: usize,

    /// Base retry delay in milliseconds (doubles each attempt)
    #[arg(long, default_value_t = RETRY_BASE_DELAY_MS)]
    pub retry_base_delay_ms: u64,

    /// Hard per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Minimum spacing between consecutive resolutions in milliseconds
    #[arg(long, default_value_t = BULK_SPACING_MS)]
    pub spacing_ms: u64,

    /// Bypass the cache and overwrite entries with fresh provider results
    #[arg(long)]
    pub force_refresh: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("-"),
            db_path: PathBuf::from(DB_PATH),
            provider: ProviderKind::Nominatim,
            nominatim_endpoint: NOMINATIM_ENDPOINT.to_string(),
            mapbox_endpoint: MAPBOX_ENDPOINT.to_string(),
            mapbox_token: None,
            viacep_endpoint: VIACEP_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_max_attempts: RETRY_MAX_ATTEMPTS,
            retry_base_delay_ms: RETRY_BASE_DELAY_MS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            spacing_ms: BULK_SPACING_MS,
            force_refresh: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
