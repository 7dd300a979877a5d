//! End-to-end tests for the TripCreator HTTP API

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tripcreator::config::ServerConfig;
use tripcreator::{
    Coordinates, EnrichmentOptions, Geocoder, ImageSearch, ItineraryGenerator, TripCreatorConfig,
    TripPlanner, TripRequest, web,
};

const TOKYO_ITINERARY: &str = r#"```json
[
  {"day": 1, "time": "10:00 AM", "title": "Shibuya Crossing", "location": "Shibuya, Tokyo",
   "mapsLink": "https://maps.google.com/?q=Shibuya+Crossing"},
  {"day": 1, "time": "12:30 PM", "title": "Sushi lunch", "location": "shibuya, tokyo"},
  {"day": 2, "time": "9:00 AM", "title": "Senso-ji", "location": "Asakusa, Tokyo",
   "imagePrompt": "Senso-ji temple gate"}
]
```"#;

struct CannedGenerator(&'static str);

#[async_trait]
impl ItineraryGenerator for CannedGenerator {
    async fn generate(&self, _request: &TripRequest) -> tripcreator::Result<String> {
        Ok(self.0.to_string())
    }
}

#[derive(Default)]
struct RecordingImages {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageSearch for RecordingImages {
    async fn search(&self, query: &str) -> tripcreator::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if query.contains("Senso-ji") {
            return Ok(None);
        }
        Ok(Some(format!("https://images.example/{}.jpg", query.replace(' ', "_"))))
    }
}

struct TokyoGeocoder;

#[async_trait]
impl Geocoder for TokyoGeocoder {
    async fn geocode(&self, location: &str) -> tripcreator::Result<Option<Coordinates>> {
        Ok(location
            .to_lowercase()
            .contains("tokyo")
            .then(|| Coordinates::new(35.68, 139.76)))
    }
}

async fn spawn(planner: TripPlanner) -> String {
    let config = ServerConfig {
        static_dir: "does/not/exist".to_string(),
        ..ServerConfig::default()
    };
    let app = web::app(&config, Arc::new(planner));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn planner(itinerary: &'static str, images: Arc<RecordingImages>) -> TripPlanner {
    TripPlanner::new(
        Arc::new(CannedGenerator(itinerary)),
        images,
        EnrichmentOptions::default(),
    )
}

#[tokio::test]
async fn test_health() {
    let base = spawn(planner("[]", Arc::default())).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], tripcreator::VERSION);
    assert_eq!(body["maps"], false);
}

#[tokio::test]
async fn test_create_trip_shares_images_per_location() {
    let images = Arc::new(RecordingImages::default());
    let base = spawn(planner(TOKYO_ITINERARY, images.clone())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "Tokyo", "duration": "3 days", "interests": ["Food"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let plan: Value = response.json().await.unwrap();
    let steps = plan["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["title"], "Shibuya Crossing");
    assert_eq!(steps[2]["title"], "Senso-ji");

    // two distinct locations, two lookups
    assert_eq!(images.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        steps[0]["imageUrl"],
        "https://images.example/Shibuya_Crossing_Shibuya,_Tokyo.jpg"
    );
    assert_eq!(steps[0]["imageUrl"], steps[1]["imageUrl"]);
    assert!(steps[2].get("imageUrl").is_none());
    assert_eq!(steps[0]["mapsLink"], "https://maps.google.com/?q=Shibuya+Crossing");

    assert_eq!(plan["request"]["interests"], json!(["Food"]));
    assert_eq!(plan["markers"], json!([]));
    assert!(plan.get("mapCenter").is_none());
    assert!(plan["generatedAt"].is_string());
}

#[tokio::test]
async fn test_create_trip_with_map_markers() {
    let images = Arc::new(RecordingImages::default());
    let base = spawn(planner(TOKYO_ITINERARY, images).with_geocoder(Arc::new(TokyoGeocoder))).await;

    let plan: Value = reqwest::Client::new()
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "Tokyo", "duration": "3 days", "includeMap": true}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let markers = plan["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 3);
    assert_eq!(markers[2]["index"], 2);
    assert_eq!(markers[2]["title"], "Senso-ji");
    assert_eq!(markers[0]["coordinates"], json!({"lat": 35.68, "lng": 139.76}));
    assert_eq!(plan["mapCenter"], json!({"lat": 35.68, "lng": 139.76}));
}

#[tokio::test]
async fn test_unparseable_itinerary_is_bad_gateway() {
    let images = Arc::new(RecordingImages::default());
    let base = spawn(planner("Sorry, I can't help with that.", images.clone())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "Tokyo", "duration": "3 days", "interests": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Could not understand the generated itinerary")
    );
    assert_eq!(body["retryable"], true);
    assert!(body.get("steps").is_none());
    assert_eq!(images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_blank_destination_is_bad_request() {
    let base = spawn(planner(TOKYO_ITINERARY, Arc::default())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "   ", "duration": "3 days"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Destination"));
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_request() {
    let images = Arc::new(RecordingImages::default());
    let base = spawn(planner(TOKYO_ITINERARY, images.clone())).await;
    let client = reqwest::Client::new();

    let missing_duration = client
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "Tokyo"}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_duration.status(), 400);
    let body: Value = missing_duration.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("duration"));
    assert_eq!(body["retryable"], false);

    let wrong_interests = client
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "Tokyo", "duration": "3 days", "interests": "Food"}))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_interests.status(), 400);
    let body: Value = wrong_interests.json().await.unwrap();
    assert!(body["error"].is_string());

    let missing_location = client
        .post(format!("{base}/geocode"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_location.status(), 400);

    assert_eq!(images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let base = spawn(planner(TOKYO_ITINERARY, Arc::default())).await;
    let interests: Vec<String> = (0..5_000).map(|i| format!("interest {i}")).collect();

    let response = reqwest::Client::new()
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "Tokyo", "duration": "3 days", "interests": interests}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);
}

#[tokio::test]
async fn test_unconfigured_service_fails_closed() {
    // Default configuration carries no credentials
    let mut config = TripCreatorConfig::default();
    config.generator.base_url = "http://127.0.0.1:9".to_string();
    config.images.base_url = "http://127.0.0.1:9".to_string();
    config.geocoding.base_url = "http://127.0.0.1:9".to_string();
    let planner = TripPlanner::from_config(&config).unwrap();
    assert!(!planner.has_geocoder());
    let base = spawn(planner).await;
    let client = reqwest::Client::new();

    let trips = client
        .post(format!("{base}/trips"))
        .json(&json!({"destination": "Tokyo", "duration": "3 days"}))
        .send()
        .await
        .unwrap();
    assert_eq!(trips.status(), 503);

    let geocode = client
        .post(format!("{base}/geocode"))
        .json(&json!({"location": "Shibuya, Tokyo"}))
        .send()
        .await
        .unwrap();
    assert_eq!(geocode.status(), 503);
}

#[tokio::test]
async fn test_geocode_endpoint() {
    let base = spawn(planner("[]", Arc::default()).with_geocoder(Arc::new(TokyoGeocoder))).await;
    let client = reqwest::Client::new();

    let found: Value = client
        .post(format!("{base}/geocode"))
        .json(&json!({"location": "Shibuya, Tokyo"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found["coordinates"], json!({"lat": 35.68, "lng": 139.76}));

    let missing: Value = client
        .post(format!("{base}/geocode"))
        .json(&json!({"location": "Atlantis"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(missing["coordinates"].is_null());
}
