//! Trip request and the finished plan

use crate::models::location::map_center;
use crate::models::{Coordinates, ItineraryStep, MapMarker};
use crate::{Result, TripCreatorError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the user asked for
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub destination: String,
    /// Free-form, e.g. "3 days"
    pub duration: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl TripRequest {
    /// Build a request, trimming fields and rejecting blanks
    pub fn new<S: Into<String>>(
        destination: S,
        duration: S,
        interests: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        Self {
            destination: destination.into(),
            duration: duration.into(),
            interests: interests.into_iter().map(Into::into).collect(),
        }
        .normalized()
    }

    /// Trim all fields, drop blank and repeated interests, and validate.
    pub fn normalized(self) -> Result<Self> {
        let destination = self.destination.trim().to_string();
        if destination.is_empty() {
            return Err(TripCreatorError::validation("Destination cannot be empty"));
        }

        let duration = self.duration.trim().to_string();
        if duration.is_empty() {
            return Err(TripCreatorError::validation("Duration cannot be empty"));
        }

        let mut interests: Vec<String> = Vec::with_capacity(self.interests.len());
        for interest in self.interests {
            let interest = interest.trim();
            if !interest.is_empty() && !interests.iter().any(|i| i == interest) {
                interests.push(interest.to_string());
            }
        }

        Ok(Self {
            destination,
            duration,
            interests,
        })
    }
}

/// A generated and enriched itinerary
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub request: TripRequest,
    pub steps: Vec<ItineraryStep>,
    /// Empty unless map markers were requested and a geocoder is configured
    #[serde(default)]
    pub markers: Vec<MapMarker>,
    /// Where to center the map, present whenever markers are
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_center: Option<Coordinates>,
    pub generated_at: DateTime<Utc>,
}

impl TripPlan {
    #[must_use]
    pub fn new(request: TripRequest, steps: Vec<ItineraryStep>, markers: Vec<MapMarker>) -> Self {
        let map_center = (!markers.is_empty()).then(|| map_center(&markers));
        Self {
            request,
            steps,
            markers,
            map_center,
            generated_at: Utc::now(),
        }
    }
}
