//! Trip planning: generation, parsing, enrichment and map markers.

use crate::config::TripCreatorConfig;
use crate::enrichment::{EnrichmentOptions, enrich_itinerary, map_markers};
use crate::generator::{ItineraryGenerator, OpenAiGenerator};
use crate::geocode::{Geocoder, GoogleGeocoder};
use crate::images::{GoogleImageSearch, ImageSearch};
use crate::models::{Coordinates, TripPlan, TripRequest};
use crate::{Result, TripCreatorError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub struct TripPlanner {
    generator: Arc<dyn ItineraryGenerator>,
    images: Arc<dyn ImageSearch>,
    geocoder: Option<Arc<dyn Geocoder>>,
    options: EnrichmentOptions,
}

impl TripPlanner {
    pub fn new(
        generator: Arc<dyn ItineraryGenerator>,
        images: Arc<dyn ImageSearch>,
        options: EnrichmentOptions,
    ) -> Self {
        Self {
            generator,
            images,
            geocoder: None,
            options,
        }
    }

    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Wire the HTTP-backed collaborators. The geocoder is only attached
    /// when a Maps key is configured.
    pub fn from_config(config: &TripCreatorConfig) -> Result<Self> {
        let generator = Arc::new(OpenAiGenerator::new(&config.generator)?);
        let images = Arc::new(GoogleImageSearch::new(&config.images)?);
        let planner = Self::new(generator, images, EnrichmentOptions::from(&config.enrichment));

        if config.generator.api_key.is_none() {
            warn!("No OpenAI API key configured; trip generation will be refused");
        }
        if config.images.api_key.is_none() || config.images.search_engine_id.is_none() {
            warn!("Image search is not configured; itineraries will have no images");
        }

        let geocoder = GoogleGeocoder::new(&config.geocoding)?;
        if geocoder.is_configured() {
            Ok(planner.with_geocoder(Arc::new(geocoder)))
        } else {
            info!("No Google Maps API key configured; map markers disabled");
            Ok(planner)
        }
    }

    #[must_use]
    pub fn has_geocoder(&self) -> bool {
        self.geocoder.is_some()
    }

    /// Generate and enrich an itinerary.
    ///
    /// Generation or configuration failures abort the whole plan; image and
    /// geocoding failures only leave the affected steps without data.
    #[instrument(skip(self, request), fields(destination = %request.destination))]
    pub async fn plan_trip(&self, request: TripRequest, include_map: bool) -> Result<TripPlan> {
        let request = request.normalized()?;
        let start_time = Instant::now();

        let raw = self.generator.generate(&request).await?;
        let steps = enrich_itinerary(&raw, self.images.as_ref(), &self.options).await?;

        let markers = match (&self.geocoder, include_map) {
            (Some(geocoder), true) => map_markers(&steps, geocoder.as_ref(), &self.options).await,
            (None, true) => {
                warn!("Map markers requested but no geocoder is configured");
                Vec::new()
            }
            _ => Vec::new(),
        };

        info!(
            "Planned {} steps for {} in {:.3}s",
            steps.len(),
            request.destination,
            start_time.elapsed().as_secs_f64()
        );

        Ok(TripPlan::new(request, steps, markers))
    }

    /// Geocode a single location for the map widget
    pub async fn geocode(&self, location: &str) -> Result<Option<Coordinates>> {
        let location = location.trim();
        if location.is_empty() {
            return Err(TripCreatorError::validation("Location cannot be empty"));
        }
        let geocoder = self
            .geocoder
            .as_ref()
            .ok_or_else(|| TripCreatorError::configuration_missing("Google Maps API key"))?;
        geocoder.geocode(location).await
    }
}
