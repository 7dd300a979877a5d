//! Itinerary generation through an OpenAI-compatible chat completion API

use crate::config::GeneratorConfig;
use crate::http::{build_client, ensure_success};
use crate::models::TripRequest;
use crate::{Result, TripCreatorError};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Produces raw itinerary text for a trip request
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn generate(&self, request: &TripRequest) -> Result<String>;
}

/// Build the prompt sent to the model
#[must_use]
pub fn build_prompt(request: &TripRequest) -> String {
    format!(
        r#"Create a day-by-day travel itinerary for a {duration} trip to {destination}. Focus on interests like {interests}. Include timestamps (e.g., 10:00 AM), activity names, and locations. Each item should be in a structured JSON format like:

[
  {{
    "day": 1,
    "time": "10:00 AM",
    "title": "Visit the Eiffel Tower",
    "location": "Paris, France",
    "imagePrompt": "Eiffel Tower, morning",
    "mapsLink": "https://maps.google.com/?q=Eiffel+Tower",
    "websiteLink": "https://www.toureiffel.paris/en"
  }},
  ...
]

Respond with the JSON array only."#,
        duration = request.duration,
        destination = request.destination,
        interests = request.interests.join(", "),
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completion client
pub struct OpenAiGenerator {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, config.max_retries)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ItineraryGenerator for OpenAiGenerator {
    #[instrument(skip(self, request), fields(destination = %request.destination, model = %self.model))]
    async fn generate(&self, request: &TripRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TripCreatorError::configuration_missing("OpenAI API key"))?;

        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
        };

        info!(
            "Requesting itinerary for a {} trip to {}",
            request.duration, request.destination
        );
        let start_time = Instant::now();

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response, "Itinerary generator").await?;

        let chat: ChatResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse chat completion response: {}", e);
            TripCreatorError::generation(format!("Malformed completion response: {e}"))
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| TripCreatorError::generation("No response from the itinerary generator"))?;

        info!(
            "Received itinerary text ({} chars) in {:.3}s",
            content.len(),
            start_time.elapsed().as_secs_f64()
        );
        debug!("Generator output: {}", content);

        Ok(content)
    }
}
