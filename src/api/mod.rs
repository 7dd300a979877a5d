use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use crate::{
    TripCreatorError, VERSION,
    models::{Coordinates, TripPlan, TripRequest},
    planner::TripPlanner,
};

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripBody {
    #[serde(flatten)]
    pub request: TripRequest,
    #[serde(default)]
    pub include_map: bool,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeBody {
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodeReply {
    pub coordinates: Option<Coordinates>,
}

/// Error reply carrying the user-facing message
pub struct ApiError(TripCreatorError);

impl From<TripCreatorError> for ApiError {
    fn from(err: TripCreatorError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TripCreatorError::validation(rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            TripCreatorError::Validation { .. } => StatusCode::BAD_REQUEST,
            TripCreatorError::Generation { .. }
            | TripCreatorError::Api { .. }
            | TripCreatorError::ImageLookup { .. } => StatusCode::BAD_GATEWAY,
            TripCreatorError::ConfigurationMissing { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TripCreatorError::Config { .. } | TripCreatorError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        let body = json!({
            "error": self.0.user_message(),
            "retryable": self.0.is_retryable(),
        });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trips", post(create_trip))
        .route("/geocode", post(geocode))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "maps": state.planner.has_geocoder(),
    }))
}

async fn create_trip(
    State(state): State<AppState>,
    payload: Result<Json<CreateTripBody>, JsonRejection>,
) -> Result<Json<TripPlan>, ApiError> {
    let Json(body) = payload?;
    let plan = state
        .planner
        .plan_trip(body.request, body.include_map)
        .await?;
    Ok(Json(plan))
}

async fn geocode(
    State(state): State<AppState>,
    payload: Result<Json<GeocodeBody>, JsonRejection>,
) -> Result<Json<GeocodeReply>, ApiError> {
    let Json(body) = payload?;
    let coordinates = state.planner.geocode(&body.location).await?;
    Ok(Json(GeocodeReply { coordinates }))
}
