//! Geographic coordinates and map markers

use serde::{Deserialize, Serialize};

/// Latitude / longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are within the WGS84 range
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A step as shown on the map
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapMarker {
    /// Position of the step in the itinerary
    pub index: usize,
    pub title: String,
    pub location: String,
    /// `None` when the location could not be geocoded
    pub coordinates: Option<Coordinates>,
}

/// Center for the map: the first marker that has coordinates.
#[must_use]
pub fn map_center(markers: &[MapMarker]) -> Coordinates {
    markers
        .iter()
        .find_map(|m| m.coordinates)
        .unwrap_or(Coordinates::new(0.0, 0.0))
}
