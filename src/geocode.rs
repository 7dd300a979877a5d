//! Location geocoding through the Google Maps Geocoding API
//!
//! Only used to place itinerary steps on a map.

use crate::config::GeocodingConfig;
use crate::http::{build_client, ensure_success, redact_key};
use crate::models::Coordinates;
use crate::{Result, TripCreatorError};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates of the best match, `None` when nothing matched
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

pub struct GoogleGeocoder {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, config.max_retries)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TripCreatorError::configuration_missing("Google Maps API key"))?;

        let url = format!(
            "{}/maps/api/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(location),
            urlencoding::encode(api_key)
        );
        debug!("Geocoding request: {}", redact_key(&url));

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response, "Geocoding").await?;
        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| TripCreatorError::api(format!("Malformed geocoding response: {e}")))?;

        let Some(coordinates) = body.results.into_iter().next().map(|r| r.geometry.location)
        else {
            warn!(
                "No geocoding results for '{}' (status {})",
                location,
                body.status.as_deref().unwrap_or("unknown")
            );
            return Ok(None);
        };

        if !coordinates.is_valid() {
            warn!(
                "Discarding out-of-range coordinates for '{}': {:?}",
                location, coordinates
            );
            return Ok(None);
        }
        Ok(Some(coordinates))
    }
}
