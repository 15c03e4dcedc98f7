//! Assembles the resolution service from the public API alone: a
//! caller-implemented provider plugged into the exported trait seams,
//! with the in-memory cache and record store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use address_resolver::{
    AddressQuery, FallbackResolver, GeocodeCache, GeocodeError, GeocodeProvider, GeocodedPoint,
    MemoryCache, MemoryRecordStore, RecordAddress, RecordStore, ResolutionService, RetryPolicy,
};

/// A provider backed by no network at all: always returns the same point
/// and counts how many times it was asked.
struct FixedPointProvider {
    calls: AtomicUsize,
}

impl FixedPointProvider {
    fn new() -> Arc<Self> {
        Arc::new(FixedPointProvider {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl GeocodeProvider for FixedPointProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn geocode(&self, _query: &str) -> Result<GeocodedPoint, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeocodedPoint {
            latitude: -23.55,
            longitude: -46.63,
            display_name: Some("Praça da Sé, São Paulo".to_string()),
        })
    }
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn test_service_assembled_from_exported_types() {
    let provider = FixedPointProvider::new();
    let cache = Arc::new(MemoryCache::new());
    let records = Arc::new(MemoryRecordStore::new());

    let resolver = FallbackResolver::new(provider.clone(), None, None, quick_retry());
    let service = ResolutionService::new(cache.clone(), records, resolver);

    let first = service
        .resolve_address(AddressQuery::from_text("Praça da Sé, São Paulo"))
        .await;
    assert!(first.success);
    assert!(!first.cached);
    assert_eq!(first.provider.as_deref(), Some("fixed"));

    // Same address again: answered from the injected cache, not the provider
    let second = service
        .resolve_address(AddressQuery::from_text("Praça da Sé, São Paulo"))
        .await;
    assert!(second.success);
    assert!(second.cached);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_record_reference_roundtrip_through_injected_store() {
    let provider = FixedPointProvider::new();
    let records = Arc::new(MemoryRecordStore::new());
    records.insert(
        "clinic-17",
        RecordAddress {
            address: Some("Av. Paulista, 1000".to_string()),
            ..Default::default()
        },
    );

    let resolver = FallbackResolver::new(provider, None, None, quick_retry());
    let service =
        ResolutionService::new(Arc::new(MemoryCache::new()), records.clone(), resolver);

    let query = AddressQuery {
        record_reference: Some("clinic-17".to_string()),
        ..Default::default()
    };
    let result = service.resolve_address(query).await;
    assert!(result.success);

    let saved = records
        .saved("clinic-17")
        .expect("coordinates written back to the record");
    assert_eq!(saved.latitude, -23.55);
    assert_eq!(saved.longitude, -46.63);
}

#[tokio::test]
async fn test_trait_objects_accept_custom_store_impls() {
    // The seams are object-safe: boxed trait objects can stand in for the
    // bundled implementations.
    let cache: Arc<dyn GeocodeCache> = Arc::new(MemoryCache::new());
    let records: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let resolver = FallbackResolver::new(FixedPointProvider::new(), None, None, quick_retry());

    let service = ResolutionService::new(cache, records, resolver);
    let result = service.resolve_address(AddressQuery::from_text("Rua A, 1")).await;
    assert!(result.success);
}
