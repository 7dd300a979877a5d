//! Data models for `TripCreator`
//!
//! - Trip: the user's request and the finished plan
//! - Itinerary: generated steps and their location keys
//! - Location: coordinates and map markers

pub mod itinerary;
pub mod location;
pub mod trip;

pub use itinerary::{ItineraryStep, location_key};
pub use location::{Coordinates, MapMarker};
pub use trip::{TripPlan, TripRequest};
