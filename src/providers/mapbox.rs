//! Mapbox geocoding client.
//!
//! The commercial alternative, keyed by an access token. Used as the
//! alternate-provider fallback tier when Nominatim is the default.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{classify_status, decode_error, transport_error, GeocodeProvider};
use crate::error_handling::GeocodeError;
use crate::models::GeocodedPoint;

const PROVIDER_NAME: &str = "mapbox";

/// Thin client for the Mapbox Places forward-geocoding endpoint.
pub struct MapboxClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    features: Vec<MapboxFeature>,
}

/// One feature in a Mapbox response. `center` is `[longitude, latitude]`.
#[derive(Debug, Deserialize)]
struct MapboxFeature {
    center: Vec<f64>,
    place_name: Option<String>,
}

impl MapboxClient {
    /// Creates a client against the given endpoint (no trailing slash).
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        MapboxClient {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    /// Builds the request URL, percent-encoding the query as a path segment.
    fn request_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| decode_error(PROVIDER_NAME, format!("invalid endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| decode_error(PROVIDER_NAME, "endpoint cannot be a base URL"))?
            .extend(["geocoding", "v5", "mapbox.places"])
            .push(&format!("{query}.json"));
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("limit", "1");
        Ok(url)
    }
}

#[async_trait]
impl GeocodeProvider for MapboxClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn geocode(&self, query: &str) -> Result<GeocodedPoint, GeocodeError> {
        let url = self.request_url(query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        if let Some(err) = classify_status(PROVIDER_NAME, response.status()) {
            return Err(err);
        }

        let body: MapboxResponse = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER_NAME, e))?;

        let feature = body.features.into_iter().next().ok_or(GeocodeError::NotFound)?;

        if feature.center.len() < 2 {
            return Err(decode_error(
                PROVIDER_NAME,
                format!("feature center has {} coordinates", feature.center.len()),
            ));
        }

        Ok(GeocodedPoint {
            latitude: feature.center[1],
            longitude: feature.center[0],
            display_name: feature.place_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_query() {
        let client = MapboxClient::new(
            reqwest::Client::new(),
            "https://api.mapbox.com",
            "test-token",
        );
        let url = client.request_url("Rua das Flores, 100").unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://api.mapbox.com/geocoding/v5/mapbox.places/"));
        assert!(s.contains(".json"));
        assert!(s.contains("access_token=test-token"));
        // Spaces must not survive raw in the path
        assert!(!s.contains(' '));
    }
}
