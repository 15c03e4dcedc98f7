// Shared test helpers for database setup and mock provider responses.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use sqlx::SqlitePool;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use address_resolver::{run_migrations, Config};

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Builds a config pointed at a mock server, with fast retries and pacing so
/// tests don't sleep for real.
#[allow(dead_code)]
pub fn test_config(mock_uri: &str) -> Config {
    Config {
        nominatim_endpoint: mock_uri.to_string(),
        mapbox_endpoint: mock_uri.to_string(),
        viacep_endpoint: mock_uri.to_string(),
        retry_base_delay_ms: 1,
        spacing_ms: 1,
        ..Default::default()
    }
}

/// A one-place Nominatim search response (coordinates as strings, per the
/// real API).
#[allow(dead_code)]
pub fn nominatim_place(lat: f64, lon: f64, display_name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!([{
        "lat": lat.to_string(),
        "lon": lon.to_string(),
        "display_name": display_name,
    }]))
}

/// Nominatim's no-match response: HTTP 200 with an empty array.
#[allow(dead_code)]
pub fn nominatim_empty() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!([]))
}

/// Mounts a Nominatim /search mock responding to every query.
#[allow(dead_code)]
pub async fn mount_nominatim(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a ViaCEP mock for any 8-digit CEP.
#[allow(dead_code)]
pub async fn mount_viacep(server: &MockServer, city: &str, state: &str) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/ws/\d{8}/json/$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "localidade": city,
            "uf": state,
        })))
        .mount(server)
        .await;
}

/// Mounts a Mapbox places mock responding to every query.
/// `center` is `[longitude, latitude]`, matching the real API.
#[allow(dead_code)]
pub async fn mount_mapbox(server: &MockServer, lon: f64, lat: f64, place_name: &str) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/geocoding/v5/mapbox\.places/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "center": [lon, lat],
                "place_name": place_name,
            }]
        })))
        .mount(server)
        .await;
}

/// Mounts a Mapbox places mock whose feature list is empty for every query.
#[allow(dead_code)]
pub async fn mount_mapbox_empty(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/geocoding/v5/mapbox\.places/.*"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "features": [] })),
        )
        .mount(server)
        .await;
}

/// Inserts a facility record and returns its id.
#[allow(dead_code)]
pub async fn insert_facility(
    pool: &SqlitePool,
    id: &str,
    address: Option<&str>,
    full_address: Option<&str>,
    alternate_address: Option<&str>,
    postal_code: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO facilities (id, address, full_address, alternate_address, postal_code) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(address)
    .bind(full_address)
    .bind(alternate_address)
    .bind(postal_code)
    .execute(pool)
    .await
    .expect("Failed to insert facility");
}

/// Number of rows currently in the geocode cache.
#[allow(dead_code)]
pub async fn cache_row_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM geocode_cache")
        .fetch_one(pool)
        .await
        .expect("Failed to count cache rows")
}
