//! Geocoding provider clients.
//!
//! One thin HTTP client per backend, all dispatched through the common
//! [`GeocodeProvider`] capability so the fallback resolver stays
//! provider-agnostic. Every client classifies its HTTP response into the
//! three failure kinds the retry controller understands:
//!
//! - HTTP 429 -> [`GeocodeError::RateLimited`] (triggers backoff)
//! - empty result set -> [`GeocodeError::NotFound`] (advances the fallback chain)
//! - anything else non-2xx, network, or decode failure -> [`GeocodeError::Provider`]
//!
//! The hard 30s request timeout lives on the shared `reqwest::Client`, set at
//! construction.

mod mapbox;
mod nominatim;
mod viacep;

pub use mapbox::MapboxClient;
pub use nominatim::NominatimClient;
pub use viacep::ViaCepClient;

use async_trait::async_trait;

use crate::error_handling::GeocodeError;
use crate::models::GeocodedPoint;

/// A geocoding backend: resolves one free-text query to one coordinate pair.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Canonical provider name, reported in results and logs.
    fn name(&self) -> &'static str;

    /// Forward-geocodes a query string to its best-matching coordinate pair.
    async fn geocode(&self, query: &str) -> Result<GeocodedPoint, GeocodeError>;
}

/// A city-level match for a postal code, used by the CEP-only fallback tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalCodeCity {
    /// City name (e.g. "São Paulo").
    pub city: String,
    /// State / region code (e.g. "SP").
    pub state: String,
}

/// A postal-code directory: resolves a postal code to its city and region.
#[async_trait]
pub trait PostalDirectory: Send + Sync {
    /// Resolves a postal code to its city and region, or `NotFound`.
    async fn lookup(&self, postal_code: &str) -> Result<PostalCodeCity, GeocodeError>;
}

/// Maps an HTTP status to the corresponding failure kind, or `None` for 2xx.
pub(crate) fn classify_status(
    provider: &str,
    status: reqwest::StatusCode,
) -> Option<GeocodeError> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Some(GeocodeError::RateLimited {
            provider: provider.to_string(),
        })
    } else if !status.is_success() {
        Some(GeocodeError::Provider {
            provider: provider.to_string(),
            message: format!("HTTP {}", status.as_u16()),
        })
    } else {
        None
    }
}

/// Wraps a transport-level `reqwest::Error` as a provider failure.
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> GeocodeError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };
    GeocodeError::Provider {
        provider: provider.to_string(),
        message,
    }
}

/// Wraps a response-decoding failure as a provider failure.
pub(crate) fn decode_error(provider: &str, error: impl std::fmt::Display) -> GeocodeError {
    GeocodeError::Provider {
        provider: provider.to_string(),
        message: format!("malformed response: {error}"),
    }
}
