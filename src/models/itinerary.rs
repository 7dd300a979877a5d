//! Itinerary step model

use serde::{Deserialize, Serialize};

/// One scheduled activity of a generated itinerary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryStep {
    /// Day of the trip, starting at 1
    pub day: u32,
    /// Free-form time of day, e.g. "10:00 AM"
    pub time: String,
    pub title: String,
    pub location: String,
    /// Query for the image search, preferred over title + location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_link: Option<String>,
    /// Set by enrichment only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItineraryStep {
    #[must_use]
    pub fn new(day: u32, time: &str, title: &str, location: &str) -> Self {
        Self {
            day,
            time: time.to_string(),
            title: title.to_string(),
            location: location.to_string(),
            image_prompt: None,
            maps_link: None,
            website_link: None,
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_image_prompt(mut self, prompt: &str) -> Self {
        self.image_prompt = Some(prompt.to_string());
        self
    }

    /// Normalized location used to share lookups between steps
    #[must_use]
    pub fn location_key(&self) -> String {
        location_key(&self.location)
    }

    /// Query sent to the image search for this step
    #[must_use]
    pub fn image_query(&self) -> String {
        match self.image_prompt.as_deref().map(str::trim) {
            Some(prompt) if !prompt.is_empty() => prompt.to_string(),
            _ => format!("{} {}", self.title, self.location),
        }
    }
}

/// Trim and lowercase a location so that equivalent spellings share a key
#[must_use]
pub fn location_key(location: &str) -> String {
    location.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_key_normalizes() {
        assert_eq!(location_key("  Shibuya, Tokyo "), "shibuya, tokyo");
        assert_eq!(location_key("SHIBUYA, TOKYO"), location_key("shibuya, tokyo"));
    }

    #[test]
    fn test_image_query_prefers_prompt() {
        let step = ItineraryStep::new(1, "10:00 AM", "Visit the Eiffel Tower", "Paris, France")
            .with_image_prompt("Eiffel Tower, morning");
        assert_eq!(step.image_query(), "Eiffel Tower, morning");
    }

    #[test]
    fn test_image_query_falls_back_to_title_and_location() {
        let step = ItineraryStep::new(1, "10:00 AM", "Visit the Eiffel Tower", "Paris, France");
        assert_eq!(step.image_query(), "Visit the Eiffel Tower Paris, France");

        let blank = step.with_image_prompt("   ");
        assert_eq!(blank.image_query(), "Visit the Eiffel Tower Paris, France");
    }

    #[test]
    fn test_camel_case_round_trip_fields() {
        let json = r#"{
            "day": 2,
            "time": "9:00 AM",
            "title": "Tsukiji Outer Market",
            "location": "Tsukiji, Tokyo",
            "imagePrompt": "Tsukiji market sushi",
            "mapsLink": "https://maps.google.com/?q=Tsukiji",
            "websiteLink": "https://www.tsukiji.or.jp"
        }"#;
        let step: ItineraryStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.day, 2);
        assert_eq!(step.image_prompt.as_deref(), Some("Tsukiji market sushi"));
        assert!(step.image_url.is_none());

        let value = serde_json::to_value(&step).unwrap();
        assert!(value.get("imageUrl").is_none());
        assert_eq!(value["websiteLink"], "https://www.tsukiji.or.jp");
    }
}
