//! HTTP client initialization.
//!
//! Builds the single shared `reqwest::Client` used by every provider. All
//! providers reuse the same connection pool; per-provider behavior lives in
//! the provider types, not the client.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;
use crate::error_handling::InitializationError;

/// Initializes the shared HTTP client.
///
/// Configured with the hard per-request timeout and the descriptive
/// User-Agent from the configuration. The Nominatim usage policy requires a
/// User-Agent that identifies the application, so the header is set on the
/// client rather than per request.
pub fn init_http_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}
