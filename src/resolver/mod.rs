//! Tiered fallback resolution.
//!
//! Executes resolution tiers strictly in order, stopping at the first
//! success. Each tier runs one provider call through the retry controller;
//! a tier's failure is logged and the next tier is attempted. Retry-within-a-
//! tier and advance-to-the-next-tier are deliberately separate layers: the
//! retry controller never sees the fallback sequence, and this module never
//! sleeps.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use crate::error_handling::GeocodeError;
use crate::models::{AddressQuery, GeocodeAttempt, GeocodedPoint};
use crate::normalize::normalize_for_query;
use crate::providers::{GeocodeProvider, PostalDirectory};
use crate::retry::{with_retry, RetryPolicy};

/// One step in the ordered fallback sequence.
///
/// The succeeding tier's identifier is recorded in the result so downstream
/// consumers can audit why a coordinate is lower-precision (a `CepOnly` match
/// is a city centroid, not a street address).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The query's main address text via the default provider.
    Address,
    /// The secondary service-location address via the default provider.
    AlternateAddress,
    /// City-level centroid derived from the postal code.
    CepOnly,
    /// The primary address text via the alternate commercial provider.
    AlternateProvider,
}

impl Strategy {
    /// Stable identifier stored in results and cache metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Address => "address",
            Strategy::AlternateAddress => "alternate_address",
            Strategy::CepOnly => "cep_only",
            Strategy::AlternateProvider => "alternate_provider",
        }
    }
}

/// A successful resolution: the point, who produced it, and which tier won.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The matched coordinates.
    pub point: GeocodedPoint,
    /// Provider that produced the match.
    pub provider: String,
    /// Tier that produced the match.
    pub strategy: Strategy,
}

/// Orchestrates the tiered sequence of resolution attempts.
pub struct FallbackResolver {
    provider: Arc<dyn GeocodeProvider>,
    alternate_provider: Option<Arc<dyn GeocodeProvider>>,
    postal_directory: Option<Arc<dyn PostalDirectory>>,
    retry_policy: RetryPolicy,
}

impl FallbackResolver {
    /// Builds a resolver over the given providers and retry policy.
    ///
    /// The alternate provider and postal directory are optional; their tiers
    /// are skipped entirely when absent.
    pub fn new(
        provider: Arc<dyn GeocodeProvider>,
        alternate_provider: Option<Arc<dyn GeocodeProvider>>,
        postal_directory: Option<Arc<dyn PostalDirectory>>,
        retry_policy: RetryPolicy,
    ) -> Self {
        FallbackResolver {
            provider,
            alternate_provider,
            postal_directory,
            retry_policy,
        }
    }

    /// Resolves a query through the tier sequence, returning the first
    /// success or `Exhausted` carrying the last-attempted tier's error.
    ///
    /// The query must already have a non-empty primary text; the resolution
    /// service validates this before calling in.
    pub async fn resolve(&self, query: &AddressQuery) -> Result<Resolved, GeocodeError> {
        let primary = query
            .primary_text()
            .map(normalize_for_query)
            .ok_or_else(|| GeocodeError::InvalidInput("missing address text".to_string()))?;

        // Tier 1: primary address
        let mut last_error =
            match self.attempt(&*self.provider, Strategy::Address, &primary).await {
                Ok(resolved) => return Ok(resolved),
                Err(e) => e,
            };

        // Tier 2: alternate address, if the query carries one
        if let Some(alternate) = query
            .alternate_address
            .as_deref()
            .map(normalize_for_query)
            .filter(|t| !t.is_empty())
        {
            match self
                .attempt(&*self.provider, Strategy::AlternateAddress, &alternate)
                .await
            {
                Ok(resolved) => return Ok(resolved),
                Err(e) => last_error = e,
            }
        }

        // Tier 3: postal-code-only, trading precision for a non-empty result
        if let (Some(postal_code), Some(directory)) =
            (query.postal_code.as_deref(), self.postal_directory.as_deref())
        {
            match self.attempt_postal_code(directory, postal_code).await {
                Ok(resolved) => return Ok(resolved),
                Err(e) => last_error = e,
            }
        }

        // Tier 4: primary address against the alternate provider
        if let Some(alternate_provider) = self.alternate_provider.as_deref() {
            match self
                .attempt(alternate_provider, Strategy::AlternateProvider, &primary)
                .await
            {
                Ok(resolved) => return Ok(resolved),
                Err(e) => last_error = e,
            }
        }

        Err(GeocodeError::Exhausted(last_error.to_string()))
    }

    /// Runs one tier: a single provider call wrapped in retry/backoff, with
    /// attempt-level logging.
    async fn attempt(
        &self,
        provider: &dyn GeocodeProvider,
        strategy: Strategy,
        text: &str,
    ) -> Result<Resolved, GeocodeError> {
        let started = Instant::now();
        let outcome = with_retry(self.retry_policy, || provider.geocode(text)).await;

        let attempt = GeocodeAttempt {
            provider: provider.name(),
            strategy: strategy.as_str(),
            attempts: outcome.attempts,
            elapsed_ms: started.elapsed().as_millis(),
            outcome: match &outcome.result {
                Ok(_) => "success",
                Err(e) => e.outcome_label(),
            },
        };

        match outcome.result {
            Ok(point) => {
                debug!("geocode attempt succeeded: {:?}", attempt);
                Ok(Resolved {
                    point,
                    provider: provider.name().to_string(),
                    strategy,
                })
            }
            Err(e) => {
                warn!("geocode tier failed, advancing: {:?}", attempt);
                Err(e)
            }
        }
    }

    /// Runs the postal-code tier: directory lookup, then a city-level
    /// geocode of "city, state, Brasil" through the default provider.
    async fn attempt_postal_code(
        &self,
        directory: &dyn PostalDirectory,
        postal_code: &str,
    ) -> Result<Resolved, GeocodeError> {
        let lookup = with_retry(self.retry_policy, || directory.lookup(postal_code)).await;
        let city = match lookup.result {
            Ok(city) => city,
            Err(e) => {
                warn!(
                    "postal-code lookup for '{}' failed after {} attempt(s): {}",
                    postal_code, lookup.attempts, e
                );
                return Err(e);
            }
        };

        let city_query = format!("{}, {}, Brasil", city.city, city.state);
        self.attempt(&*self.provider, Strategy::CepOnly, &city_query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::providers::PostalCodeCity;

    fn point(latitude: f64, longitude: f64) -> GeocodedPoint {
        GeocodedPoint {
            latitude,
            longitude,
            display_name: None,
        }
    }

    /// Provider that replays a scripted sequence of outcomes and records the
    /// queries it received.
    struct ScriptedProvider {
        name: &'static str,
        outcomes: Mutex<VecDeque<Result<GeocodedPoint, GeocodeError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(
            name: &'static str,
            outcomes: Vec<Result<GeocodedPoint, GeocodeError>>,
        ) -> Arc<Self> {
            Arc::new(ScriptedProvider {
                name,
                outcomes: Mutex::new(outcomes.into()),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeocodeProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn geocode(&self, query: &str) -> Result<GeocodedPoint, GeocodeError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GeocodeError::NotFound))
        }
    }

    struct FixedDirectory {
        city: PostalCodeCity,
    }

    #[async_trait]
    impl PostalDirectory for FixedDirectory {
        async fn lookup(&self, _postal_code: &str) -> Result<PostalCodeCity, GeocodeError> {
            Ok(self.city.clone())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(1),
        }
    }

    fn resolver(
        provider: Arc<ScriptedProvider>,
        alternate_provider: Option<Arc<ScriptedProvider>>,
        postal_directory: Option<Arc<dyn PostalDirectory>>,
    ) -> FallbackResolver {
        FallbackResolver::new(
            provider,
            alternate_provider.map(|p| p as Arc<dyn GeocodeProvider>),
            postal_directory,
            fast_policy(),
        )
    }

    #[tokio::test]
    async fn test_primary_address_success_stops_the_chain() {
        let provider =
            ScriptedProvider::new("nominatim", vec![Ok(point(-23.55, -46.63))]);
        let r = resolver(Arc::clone(&provider), None, None);

        let query = AddressQuery::from_text("Rua Teste, 123, São Paulo");
        let resolved = r.resolve(&query).await.unwrap();

        assert_eq!(resolved.strategy, Strategy::Address);
        assert_eq!(resolved.provider, "nominatim");
        assert_eq!(provider.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_advances_to_alternate_without_retries() {
        let provider = ScriptedProvider::new(
            "nominatim",
            vec![Err(GeocodeError::NotFound), Ok(point(-8.05, -34.9))],
        );
        let r = resolver(Arc::clone(&provider), None, None);

        let query = AddressQuery {
            address_text: Some("Rua Inexistente, 999".to_string()),
            alternate_address: Some("Avenida Conhecida, 10, Recife".to_string()),
            ..Default::default()
        };
        let resolved = r.resolve(&query).await.unwrap();

        assert_eq!(resolved.strategy, Strategy::AlternateAddress);
        // Exactly one call against the primary tier: NotFound is not retried
        let queries = provider.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0], "Rua Inexistente, 999");
        assert_eq!(queries[1], "Avenida Conhecida, 10, Recife");
    }

    #[tokio::test]
    async fn test_postal_code_tier_geocodes_city_query() {
        let provider = ScriptedProvider::new(
            "nominatim",
            vec![Err(GeocodeError::NotFound), Ok(point(-23.55, -46.63))],
        );
        let directory = Arc::new(FixedDirectory {
            city: PostalCodeCity {
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
        });
        let r = resolver(Arc::clone(&provider), None, Some(directory));

        let query = AddressQuery {
            address_text: Some("Rua das Flores, 100, São Paulo, SP".to_string()),
            postal_code: Some("01310-100".to_string()),
            ..Default::default()
        };
        let resolved = r.resolve(&query).await.unwrap();

        assert_eq!(resolved.strategy, Strategy::CepOnly);
        assert_eq!(resolved.provider, "nominatim");
        assert_eq!(provider.queries()[1], "São Paulo, SP, Brasil");
    }

    #[tokio::test]
    async fn test_alternate_provider_is_last_tier() {
        let provider = ScriptedProvider::new("nominatim", vec![Err(GeocodeError::NotFound)]);
        let mapbox = ScriptedProvider::new("mapbox", vec![Ok(point(-22.9, -43.2))]);
        let r = resolver(Arc::clone(&provider), Some(Arc::clone(&mapbox)), None);

        let query = AddressQuery::from_text("Praça XV, Rio de Janeiro");
        let resolved = r.resolve(&query).await.unwrap();

        assert_eq!(resolved.strategy, Strategy::AlternateProvider);
        assert_eq!(resolved.provider, "mapbox");
        // The alternate provider retries the *primary* address text
        assert_eq!(mapbox.queries()[0], provider.queries()[0]);
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_tier_error() {
        let provider = ScriptedProvider::new(
            "nominatim",
            vec![Err(GeocodeError::NotFound), Err(GeocodeError::NotFound)],
        );
        let r = resolver(provider, None, None);

        let query = AddressQuery {
            address_text: Some("Rua A".to_string()),
            alternate_address: Some("Rua B".to_string()),
            ..Default::default()
        };
        let err = r.resolve(&query).await.unwrap_err();

        match err {
            GeocodeError::Exhausted(message) => assert!(!message.is_empty()),
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried_within_a_tier() {
        let provider = ScriptedProvider::new(
            "nominatim",
            vec![
                Err(GeocodeError::RateLimited {
                    provider: "nominatim".into(),
                }),
                Ok(point(-23.55, -46.63)),
            ],
        );
        let r = resolver(Arc::clone(&provider), None, None);

        let resolved = r
            .resolve(&AddressQuery::from_text("Rua Teste, 1"))
            .await
            .unwrap();

        assert_eq!(resolved.strategy, Strategy::Address);
        // Two calls, both within tier 1
        assert_eq!(provider.queries().len(), 2);
    }
}
