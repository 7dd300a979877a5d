//! `TripCreator` - day-by-day travel itineraries
//!
//! Generates an itinerary with a chat-completion model, attaches one image
//! per location and, optionally, map coordinates for every step.

pub mod api;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod generator;
pub mod geocode;
pub mod http;
pub mod images;
pub mod logging;
pub mod models;
pub mod planner;
pub mod web;

// Re-export core types for public API
pub use config::TripCreatorConfig;
pub use enrichment::{EnrichmentOptions, SingleFlight, enrich_itinerary, enrich_steps, parse_itinerary};
pub use error::TripCreatorError;
pub use generator::{ItineraryGenerator, OpenAiGenerator};
pub use geocode::{Geocoder, GoogleGeocoder};
pub use images::{GoogleImageSearch, ImageSearch};
pub use models::{Coordinates, ItineraryStep, MapMarker, TripPlan, TripRequest};
pub use planner::TripPlanner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripCreatorError>;
