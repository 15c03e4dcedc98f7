//! Error type definitions.
//!
//! This module defines the geocoding error taxonomy plus the ambient
//! initialization and database error types.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating or opening the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Failure modes of a geocode resolution.
///
/// The retry controller retries only transient variants (`RateLimited`,
/// `Provider`); `NotFound` is a definitive answer for one address variant
/// and advances the fallback chain instead. Only `InvalidInput` and
/// `Exhausted` ever surface to the caller.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// The query contained neither an address nor a resolvable record reference.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The provider had no match for this address variant. Retrying is
    /// pointless; the fallback resolver moves to the next tier.
    #[error("no match found for the given address")]
    NotFound,

    /// The provider answered HTTP 429. Transient; retried with backoff.
    #[error("rate limited by provider '{provider}'")]
    RateLimited {
        /// Name of the provider that rejected the request.
        provider: String,
    },

    /// Network failure, 5xx, or malformed response. Transient; retried with
    /// backoff, then the fallback chain advances.
    #[error("provider '{provider}' error: {message}")]
    Provider {
        /// Name of the provider that failed.
        provider: String,
        /// Human-readable failure detail.
        message: String,
    },

    /// Every fallback tier failed. Terminal; surfaced as `success=false`.
    #[error("all resolution strategies exhausted: {0}")]
    Exhausted(String),
}

impl GeocodeError {
    /// Whether the retry controller should retry this error within a tier.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GeocodeError::RateLimited { .. } | GeocodeError::Provider { .. }
        )
    }

    /// Short label used in attempt logging and outcome statistics.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            GeocodeError::InvalidInput(_) => "invalid_input",
            GeocodeError::NotFound => "not_found",
            GeocodeError::RateLimited { .. } => "rate_limited",
            GeocodeError::Provider { .. } => "provider_error",
            GeocodeError::Exhausted(_) => "exhausted",
        }
    }
}

/// Outcomes tracked across a bulk resolution run.
///
/// Mirrors the result of each `resolve_address` call so the driver can report
/// how many coordinates came from cache, from which fallback tier, or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum Outcome {
    /// Served from the content-addressed cache.
    CacheHit,
    /// Resolved by the primary-address tier.
    ResolvedAddress,
    /// Resolved by the alternate-address tier.
    ResolvedAlternateAddress,
    /// Resolved by the postal-code-only tier (city-level precision).
    ResolvedCepOnly,
    /// Resolved by the alternate commercial provider.
    ResolvedAlternateProvider,
    /// The query was rejected before any network or cache access.
    InvalidInput,
    /// Every tier failed.
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Outcome {
    /// Classifies a finished resolution for the bulk-run counters.
    pub fn from_result(result: &crate::models::ResolutionResult) -> Outcome {
        if result.cached {
            return Outcome::CacheHit;
        }
        if result.success {
            return match result.strategy.as_deref() {
                Some("alternate_address") => Outcome::ResolvedAlternateAddress,
                Some("cep_only") => Outcome::ResolvedCepOnly,
                Some("alternate_provider") => Outcome::ResolvedAlternateProvider,
                _ => Outcome::ResolvedAddress,
            };
        }
        // InvalidInput failures carry the taxonomy's display prefix
        if result
            .message
            .as_deref()
            .is_some_and(|m| m.starts_with("invalid input"))
        {
            return Outcome::InvalidInput;
        }
        Outcome::Failed
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CacheHit => "cache hit",
            Outcome::ResolvedAddress => "resolved (address)",
            Outcome::ResolvedAlternateAddress => "resolved (alternate address)",
            Outcome::ResolvedCepOnly => "resolved (CEP only)",
            Outcome::ResolvedAlternateProvider => "resolved (alternate provider)",
            Outcome::InvalidInput => "invalid input",
            Outcome::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_retriable_classification() {
        // Transient failures are retried within a tier
        assert!(GeocodeError::RateLimited {
            provider: "nominatim".into()
        }
        .is_retriable());
        assert!(GeocodeError::Provider {
            provider: "nominatim".into(),
            message: "HTTP 503".into()
        }
        .is_retriable());

        // NotFound advances the fallback chain instead of burning retries
        assert!(!GeocodeError::NotFound.is_retriable());
        assert!(!GeocodeError::InvalidInput("empty address".into()).is_retriable());
        assert!(!GeocodeError::Exhausted("all tiers failed".into()).is_retriable());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = GeocodeError::RateLimited {
            provider: "nominatim".into(),
        };
        assert!(err.to_string().contains("nominatim"));

        let err = GeocodeError::Provider {
            provider: "mapbox".into(),
            message: "HTTP 500".into(),
        };
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn test_all_outcomes_have_string_representation() {
        for outcome in Outcome::iter() {
            assert!(
                !outcome.as_str().is_empty(),
                "{:?} should have a non-empty label",
                outcome
            );
        }
    }
}
