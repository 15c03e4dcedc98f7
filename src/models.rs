//! Core data model for address resolution.

use serde::Serialize;

use crate::config::CACHE_SOURCE;

/// A resolution request.
///
/// At least one of `record_reference` or an address text field must be
/// present; the resolution service rejects the query otherwise without any
/// cache or network access.
#[derive(Debug, Clone, Default)]
pub struct AddressQuery {
    /// Opaque identifier resolved by the record store into address fields.
    pub record_reference: Option<String>,
    /// Primary free-text address.
    pub address_text: Option<String>,
    /// Full-form address text; preferred over `address_text` when both exist.
    pub full_address_text: Option<String>,
    /// Secondary service-location address, tried after the primary fails.
    pub alternate_address: Option<String>,
    /// Postal code (CEP) used by the city-level fallback tier.
    pub postal_code: Option<String>,
    /// Bypass the cache and overwrite any stale entry on success.
    pub force_refresh: bool,
}

impl AddressQuery {
    /// Convenience constructor for a plain free-text query.
    pub fn from_text(address: impl Into<String>) -> Self {
        AddressQuery {
            address_text: Some(address.into()),
            ..Default::default()
        }
    }

    /// The primary query text, preferring the full-form address.
    pub fn primary_text(&self) -> Option<&str> {
        self.full_address_text
            .as_deref()
            .or(self.address_text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A coordinate pair returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Provider's display name for the matched place, kept as cache metadata.
    pub display_name: Option<String>,
}

/// A persisted cache record, keyed by the SHA-256 hash of the normalized
/// address text.
///
/// Entries are upserted, never duplicated: a conflicting `put` overwrites
/// coordinates and provider metadata but increments the hit counter. The hit
/// counter is best-effort telemetry only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CacheEntry {
    /// SHA-256 hex digest of the hash-normalized address (primary key).
    pub address_hash: String,
    /// Original address text, kept for auditing.
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
    /// Number of cache hits since creation (telemetry only).
    pub hit_count: i64,
    /// Creation timestamp, epoch millis.
    pub created_at: i64,
    /// Last-used timestamp, epoch millis.
    pub last_used_at: i64,
}

/// The engine's output: either a coordinate pair with provenance, or a
/// failure with enough detail to decide whether to retry later.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    /// Whether coordinates were produced.
    pub success: bool,
    /// Latitude in decimal degrees, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// `"cache"` or the provider name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// True when the result came from the cache without a provider call.
    pub cached: bool,
    /// Provider that originally produced the coordinates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Fallback tier that succeeded; lower-precision tiers (e.g. `cep_only`)
    /// are distinguishable downstream through this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Human-readable failure detail; `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResolutionResult {
    /// A successful result served from the cache.
    pub fn from_cache(entry: &CacheEntry) -> Self {
        ResolutionResult {
            success: true,
            latitude: Some(entry.latitude),
            longitude: Some(entry.longitude),
            source: Some(CACHE_SOURCE.to_string()),
            cached: true,
            provider: Some(entry.provider.clone()),
            strategy: entry.strategy.clone(),
            message: None,
        }
    }

    /// A successful result freshly produced by a provider.
    pub fn from_provider(
        point: &GeocodedPoint,
        provider: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        let provider = provider.into();
        ResolutionResult {
            success: true,
            latitude: Some(point.latitude),
            longitude: Some(point.longitude),
            source: Some(provider.clone()),
            cached: false,
            provider: Some(provider),
            strategy: Some(strategy.into()),
            message: None,
        }
    }

    /// A failure result carrying a human-readable message.
    pub fn failure(message: impl Into<String>) -> Self {
        ResolutionResult {
            success: false,
            latitude: None,
            longitude: None,
            source: None,
            cached: false,
            provider: None,
            strategy: None,
            message: Some(message.into()),
        }
    }
}

/// One call to one provider for one address variant.
///
/// Transient, never persisted; carried only through structured logging so
/// operators can audit why a tier advanced or a coordinate is lower-precision.
#[derive(Debug)]
pub struct GeocodeAttempt<'a> {
    pub provider: &'a str,
    pub strategy: &'a str,
    pub attempts: u32,
    pub elapsed_ms: u128,
    /// `"success"` or a `GeocodeError` outcome label.
    pub outcome: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_text_prefers_full_address() {
        let query = AddressQuery {
            address_text: Some("Rua A, 1".into()),
            full_address_text: Some("Rua A, 1, Centro, Recife, PE".into()),
            ..Default::default()
        };
        assert_eq!(query.primary_text(), Some("Rua A, 1, Centro, Recife, PE"));
    }

    #[test]
    fn test_primary_text_rejects_blank() {
        let query = AddressQuery {
            address_text: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(query.primary_text(), None);
        assert_eq!(AddressQuery::default().primary_text(), None);
    }

    #[test]
    fn test_failure_result_shape() {
        let result = ResolutionResult::failure("all tiers failed");
        assert!(!result.success);
        assert!(!result.cached);
        assert!(result.latitude.is_none());
        assert_eq!(result.message.as_deref(), Some("all tiers failed"));
    }

    #[test]
    fn test_result_serialization_omits_empty_fields() {
        let json = serde_json::to_string(&ResolutionResult::failure("nope")).unwrap();
        assert!(!json.contains("latitude"));
        assert!(json.contains("\"success\":false"));
    }
}
