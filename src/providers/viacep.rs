//! ViaCEP postal-code directory client.
//!
//! Resolves a Brazilian CEP to its city and state. The CEP-only fallback tier
//! then geocodes "city, state, Brasil" for a city-level centroid, trading
//! precision for a non-empty result.

use async_trait::async_trait;
use serde::Deserialize;

use super::{classify_status, decode_error, transport_error, PostalCodeCity, PostalDirectory};
use crate::error_handling::GeocodeError;

const DIRECTORY_NAME: &str = "viacep";

/// Thin client for the ViaCEP `ws/{cep}/json/` endpoint.
pub struct ViaCepClient {
    client: reqwest::Client,
    endpoint: String,
}

/// ViaCEP response body. Unknown CEPs come back as `{"erro": true}`, so the
/// address fields are all optional.
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    localidade: Option<String>,
    uf: Option<String>,
}

impl ViaCepClient {
    /// Creates a client against the given endpoint (no trailing slash).
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        ViaCepClient {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PostalDirectory for ViaCepClient {
    async fn lookup(&self, postal_code: &str) -> Result<PostalCodeCity, GeocodeError> {
        // CEPs are 8 digits; punctuation like "01310-100" is tolerated
        let digits: String = postal_code.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 8 {
            return Err(GeocodeError::NotFound);
        }

        let response = self
            .client
            .get(format!("{}/ws/{}/json/", self.endpoint, digits))
            .send()
            .await
            .map_err(|e| transport_error(DIRECTORY_NAME, e))?;

        // ViaCEP signals a malformed CEP with 400; that is a definitive
        // non-match for this tier, not a transient failure
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(GeocodeError::NotFound);
        }
        if let Some(err) = classify_status(DIRECTORY_NAME, response.status()) {
            return Err(err);
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| decode_error(DIRECTORY_NAME, e))?;

        match (body.localidade, body.uf) {
            (Some(city), Some(state)) if !city.is_empty() => Ok(PostalCodeCity { city, state }),
            _ => Err(GeocodeError::NotFound),
        }
    }
}
