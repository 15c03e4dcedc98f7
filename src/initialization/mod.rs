//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger (plain or JSON format)
//! - HTTP client (shared across providers)
//! - Provider clients and the wired resolution service
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use sqlx::{Pool, Sqlite};

use crate::config::{Config, ProviderKind};
use crate::providers::{GeocodeProvider, MapboxClient, NominatimClient, ViaCepClient};
use crate::resolver::FallbackResolver;
use crate::retry::RetryPolicy;
use crate::service::ResolutionService;
use crate::storage::{SqliteCache, SqliteRecordStore};

// Re-export public API
pub use client::init_http_client;
pub use logger::init_logger_with;

/// Wires the full resolution service from configuration and a database pool.
///
/// Picks the default provider from the configuration and always attaches the
/// CEP directory. The alternate-provider tier exists only in the default
/// setup: Nominatim as the primary with a commercial token configured. With
/// the commercial provider as the default there is no further tier to fall
/// back to. Fails fast if the commercial provider is selected as the default
/// without an access token.
pub fn init_service(config: &Config, pool: &Pool<Sqlite>) -> Result<ResolutionService, anyhow::Error> {
    let http = init_http_client(config)?;

    let nominatim: Arc<dyn GeocodeProvider> =
        Arc::new(NominatimClient::new(http.clone(), config.nominatim_endpoint.clone()));

    let mapbox: Option<Arc<dyn GeocodeProvider>> = config.mapbox_token.as_ref().map(|token| {
        Arc::new(MapboxClient::new(
            http.clone(),
            config.mapbox_endpoint.clone(),
            token.clone(),
        )) as Arc<dyn GeocodeProvider>
    });

    let (provider, alternate_provider) = match config.provider {
        ProviderKind::Nominatim => (nominatim, mapbox),
        ProviderKind::Mapbox => match mapbox {
            Some(mapbox) => (mapbox, None),
            None => bail!("mapbox selected as default provider but no access token configured"),
        },
    };

    let postal_directory = Arc::new(ViaCepClient::new(http, config.viacep_endpoint.clone()));

    let retry_policy = RetryPolicy {
        max_attempts: config.retry_max_attempts,
        base_delay: Duration::from_millis(config.retry_base_delay_ms),
    };

    let resolver = FallbackResolver::new(
        provider,
        alternate_provider,
        Some(postal_directory),
        retry_policy,
    );

    let cache = Arc::new(SqliteCache::new(pool.clone()));
    let records = Arc::new(SqliteRecordStore::new(pool.clone()));

    Ok(ResolutionService::new(cache, records, resolver))
}
