//! Resolution service: the engine's sole externally invoked operation.
//!
//! Validates the query, consults the content-addressed cache, falls through
//! to the tiered resolver on a miss, and persists successful results to both
//! the cache and the target record. Every failure path returns a structured
//! `ResolutionResult` with `success=false`; no error ever propagates out of
//! [`ResolutionService::resolve_address`].

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use crate::error_handling::GeocodeError;
use crate::models::{AddressQuery, ResolutionResult};
use crate::normalize::{address_hash, normalize_for_query};
use crate::resolver::FallbackResolver;
use crate::storage::{GeocodeCache, NewCacheEntry, RecordStore};

/// The entrypoint component wiring cache, record store, and resolver.
pub struct ResolutionService {
    cache: Arc<dyn GeocodeCache>,
    records: Arc<dyn RecordStore>,
    resolver: FallbackResolver,
}

impl ResolutionService {
    /// Assembles a service from its injected collaborators.
    pub fn new(
        cache: Arc<dyn GeocodeCache>,
        records: Arc<dyn RecordStore>,
        resolver: FallbackResolver,
    ) -> Self {
        ResolutionService {
            cache,
            records,
            resolver,
        }
    }

    /// Resolves a query to coordinates, using the cache when possible.
    ///
    /// Returns a [`ResolutionResult`] in every case; callers inspect
    /// `success` rather than matching on errors.
    pub async fn resolve_address(&self, query: AddressQuery) -> ResolutionResult {
        // Step 1: expand the record reference (if any) and validate, before
        // any cache or network access
        let query = match self.expand_record_reference(query).await {
            Ok(query) => query,
            Err(e) => return ResolutionResult::failure(e.to_string()),
        };

        let primary = match query.primary_text().map(normalize_for_query) {
            Some(text) if !text.is_empty() => text,
            _ => {
                let e = GeocodeError::InvalidInput(
                    "query has neither address text nor a resolvable record reference".to_string(),
                );
                return ResolutionResult::failure(e.to_string());
            }
        };

        let hash = address_hash(&primary);

        // Step 2: cache consult, unless a forced refresh bypasses it
        if !query.force_refresh {
            match self.cache.get(&hash).await {
                Ok(Some(entry)) => {
                    debug!("cache hit for '{}' (hash {})", primary, &hash[..12]);
                    if let Err(e) = self.cache.touch(&hash).await {
                        warn!("failed to touch cache entry {}: {}", &hash[..12], e);
                    }
                    self.persist_to_record(&query, entry.latitude, entry.longitude)
                        .await;
                    return ResolutionResult::from_cache(&entry);
                }
                Ok(None) => {}
                Err(e) => {
                    // A broken cache must not block resolution; fall through
                    warn!("cache read failed for {}: {}", &hash[..12], e);
                }
            }
        }

        // Step 3: tiered resolution
        let resolved = match self.resolver.resolve(&query).await {
            Ok(resolved) => resolved,
            Err(e) => {
                // Step 5: no cache or record writes on failure
                info!("resolution failed for '{}': {}", primary, e);
                return ResolutionResult::failure(e.to_string());
            }
        };

        // Step 4: cache keyed by the *primary* query's hash, so subsequent
        // identical queries hit cache even though a fallback tier produced
        // the coordinates
        let entry = NewCacheEntry {
            address_hash: hash,
            address_text: primary.clone(),
            latitude: resolved.point.latitude,
            longitude: resolved.point.longitude,
            provider: resolved.provider.clone(),
            display_name: resolved.point.display_name.clone(),
            strategy: Some(resolved.strategy.as_str().to_string()),
        };
        if let Err(e) = self.cache.put(entry).await {
            warn!("failed to write cache entry for '{}': {}", primary, e);
        }

        self.persist_to_record(&query, resolved.point.latitude, resolved.point.longitude)
            .await;

        info!(
            "resolved '{}' via {} ({})",
            primary,
            resolved.provider,
            resolved.strategy.as_str()
        );
        ResolutionResult::from_provider(
            &resolved.point,
            resolved.provider,
            resolved.strategy.as_str(),
        )
    }

    /// Fills empty query fields from the referenced record's address fields.
    ///
    /// Explicit query text always wins over record fields. A reference to a
    /// missing record is an input error.
    async fn expand_record_reference(
        &self,
        mut query: AddressQuery,
    ) -> Result<AddressQuery, GeocodeError> {
        let Some(reference) = query.record_reference.clone() else {
            return Ok(query);
        };

        let record = self
            .records
            .load_address(&reference)
            .await
            .map_err(|e| GeocodeError::InvalidInput(format!("record lookup failed: {e}")))?
            .ok_or_else(|| {
                GeocodeError::InvalidInput(format!("record '{reference}' not found"))
            })?;

        if query.address_text.is_none() {
            query.address_text = record.address;
        }
        if query.full_address_text.is_none() {
            query.full_address_text = record.full_address;
        }
        if query.alternate_address.is_none() {
            query.alternate_address = record.alternate_address;
        }
        if query.postal_code.is_none() {
            query.postal_code = record.postal_code;
        }
        Ok(query)
    }

    /// Writes coordinates back to the target record, if one was referenced.
    ///
    /// Record-store failures are logged, not fatal: the coordinates are still
    /// valid and returned to the caller.
    async fn persist_to_record(&self, query: &AddressQuery, latitude: f64, longitude: f64) {
        let Some(reference) = query.record_reference.as_deref() else {
            return;
        };
        let geocoded_at = Utc::now().timestamp_millis();
        if let Err(e) = self
            .records
            .save_coordinates(reference, latitude, longitude, geocoded_at)
            .await
        {
            warn!("failed to persist coordinates to record '{}': {}", reference, e);
        }
    }
}
