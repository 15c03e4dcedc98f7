//! Nominatim (OpenStreetMap) client.
//!
//! The free community provider. Its usage policy requires a descriptive
//! client identification string; that string is set as the User-Agent on the
//! shared HTTP client at construction.

use async_trait::async_trait;
use serde::Deserialize;

use super::{classify_status, decode_error, transport_error, GeocodeProvider};
use crate::error_handling::GeocodeError;
use crate::models::GeocodedPoint;

const PROVIDER_NAME: &str = "nominatim";

/// Thin client for the Nominatim `/search` free-text endpoint.
pub struct NominatimClient {
    client: reqwest::Client,
    endpoint: String,
}

/// One place in a Nominatim search response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl NominatimClient {
    /// Creates a client against the given endpoint (no trailing slash).
    ///
    /// The `client` must already carry the identification User-Agent and the
    /// hard request timeout.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        NominatimClient {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl GeocodeProvider for NominatimClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn geocode(&self, query: &str) -> Result<GeocodedPoint, GeocodeError> {
        let response = self
            .client
            .get(format!("{}/search", self.endpoint))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "0"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        if let Some(err) = classify_status(PROVIDER_NAME, response.status()) {
            return Err(err);
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER_NAME, e))?;

        let place = places.into_iter().next().ok_or(GeocodeError::NotFound)?;

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|e| decode_error(PROVIDER_NAME, format!("bad latitude '{}': {e}", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|e| decode_error(PROVIDER_NAME, format!("bad longitude '{}': {e}", place.lon)))?;

        Ok(GeocodedPoint {
            latitude,
            longitude,
            display_name: place.display_name,
        })
    }
}
