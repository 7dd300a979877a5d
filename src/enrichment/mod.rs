//! Itinerary enrichment
//!
//! Attaches an image to every step and, on request, coordinates for the map.
//! Each distinct location key is looked up once per call; lookups for
//! different keys run concurrently and a failed lookup only affects the
//! steps of its own key.

pub mod parse;
pub mod single_flight;

pub use parse::{UNPARSEABLE_ITINERARY, parse_itinerary};
pub use single_flight::SingleFlight;

use crate::Result;
use crate::config::EnrichmentConfig;
use crate::geocode::Geocoder;
use crate::images::ImageSearch;
use crate::models::{Coordinates, ItineraryStep, MapMarker};
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy)]
pub struct EnrichmentOptions {
    /// Upper bound for a single lookup; hitting it means "no result"
    pub lookup_timeout: Duration,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self::from(&EnrichmentConfig::default())
    }
}

impl From<&EnrichmentConfig> for EnrichmentOptions {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            lookup_timeout: Duration::from_secs(config.lookup_timeout_seconds.into()),
        }
    }
}

/// Parse raw generator output and enrich the resulting steps.
pub async fn enrich_itinerary(
    raw: &str,
    images: &dyn ImageSearch,
    options: &EnrichmentOptions,
) -> Result<Vec<ItineraryStep>> {
    let steps = parse_itinerary(raw)?;
    Ok(enrich_steps(steps, images, options).await)
}

/// Set `image_url` on every step, sharing one lookup per location key.
///
/// Never fails: a lookup error or timeout leaves the affected steps without
/// an image. Order and length of `steps` are preserved.
#[instrument(skip_all, fields(steps = steps.len()))]
pub async fn enrich_steps(
    steps: Vec<ItineraryStep>,
    images: &dyn ImageSearch,
    options: &EnrichmentOptions,
) -> Vec<ItineraryStep> {
    let cache: SingleFlight<Option<String>> = SingleFlight::new();

    let enriched = join_all(steps.into_iter().map(|mut step| {
        let cache = &cache;
        async move {
            let key = step.location_key();
            let query = step.image_query();
            step.image_url = cache
                .get_or_resolve(&key, || lookup_image(images, query, options.lookup_timeout))
                .await;
            step
        }
    }))
    .await;

    let resolved = enriched.iter().filter(|s| s.image_url.is_some()).count();
    info!(
        "Enriched {} steps across {} locations, {} with images",
        enriched.len(),
        cache.key_count(),
        resolved
    );
    enriched
}

async fn lookup_image(images: &dyn ImageSearch, query: String, limit: Duration) -> Option<String> {
    match tokio::time::timeout(limit, images.search(&query)).await {
        Ok(Ok(image)) => {
            if image.is_none() {
                debug!("No image found for '{}'", query);
            }
            image
        }
        Ok(Err(e)) => {
            warn!("Image lookup for '{}' failed: {}", query, e);
            None
        }
        Err(_) => {
            warn!("Image lookup for '{}' timed out after {:?}", query, limit);
            None
        }
    }
}

/// One marker per step, geocoding each location key once.
#[instrument(skip_all, fields(steps = steps.len()))]
pub async fn map_markers(
    steps: &[ItineraryStep],
    geocoder: &dyn Geocoder,
    options: &EnrichmentOptions,
) -> Vec<MapMarker> {
    let cache: SingleFlight<Option<Coordinates>> = SingleFlight::new();

    join_all(steps.iter().enumerate().map(|(index, step)| {
        let cache = &cache;
        async move {
            let coordinates = cache
                .get_or_resolve(&step.location_key(), || {
                    lookup_coordinates(geocoder, &step.location, options.lookup_timeout)
                })
                .await;
            MapMarker {
                index,
                title: step.title.clone(),
                location: step.location.clone(),
                coordinates,
            }
        }
    }))
    .await
}

async fn lookup_coordinates(
    geocoder: &dyn Geocoder,
    location: &str,
    limit: Duration,
) -> Option<Coordinates> {
    match tokio::time::timeout(limit, geocoder.geocode(location)).await {
        Ok(Ok(coordinates)) => coordinates,
        Ok(Err(e)) => {
            warn!("Geocoding '{}' failed: {}", location, e);
            None
        }
        Err(_) => {
            warn!("Geocoding '{}' timed out after {:?}", location, limit);
            None
        }
    }
}
