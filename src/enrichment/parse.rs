//! Parsing of generator output into itinerary steps

use crate::models::ItineraryStep;
use crate::{Result, TripCreatorError};
use tracing::{debug, warn};

pub const UNPARSEABLE_ITINERARY: &str = "could not understand the generated itinerary";

/// Parse the generator's text as a JSON array of steps.
///
/// The array may be surrounded by prose or a Markdown code fence; everything
/// outside the first `[` and the last `]` is ignored. Any failure rejects the
/// whole output.
pub fn parse_itinerary(raw: &str) -> Result<Vec<ItineraryStep>> {
    let Some(json) = extract_json_array(raw) else {
        warn!("Generator output contains no JSON array ({} chars)", raw.len());
        return Err(TripCreatorError::generation(UNPARSEABLE_ITINERARY));
    };

    let mut steps: Vec<ItineraryStep> = serde_json::from_str(json).map_err(|e| {
        warn!("Generator output is not a valid step list: {}", e);
        debug!("Rejected generator output: {}", raw);
        TripCreatorError::generation(UNPARSEABLE_ITINERARY)
    })?;

    if let Some(step) = steps.iter().find(|s| s.day == 0) {
        warn!("Generated step '{}' has day 0", step.title);
        return Err(TripCreatorError::generation(UNPARSEABLE_ITINERARY));
    }

    // image URLs only ever come from enrichment
    for step in &mut steps {
        step.image_url = None;
    }

    debug!("Parsed {} itinerary steps", steps.len());
    Ok(steps)
}

fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (start < end).then(|| &raw[start..=end])
}
