//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::Coordinate;
use crate::dispatch::{
    AncillaryRecipient, DeliveryReport, EmailChannel, MessagingChannel, SubjectInfo,
};
use crate::engine::AlertOutcome;
use crate::error::Error;
use crate::geo::GeoBackend;
use crate::ranking::{EmergencyContact, Ranking};
use crate::server::state::AppState;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sos", post(sos_handler))
        .route("/api/rank", post(rank_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Alert request body
#[derive(Debug, Deserialize)]
pub struct SosRequest {
    pub contacts: Vec<EmergencyContact>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng")]
    pub longitude: Option<f64>,
    pub subject: SubjectInfo,
    #[serde(default)]
    pub ancillary: Vec<AncillaryRecipient>,
}

/// Ranking request body
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub contacts: Vec<EmergencyContact>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng")]
    pub longitude: Option<f64>,
}

/// Both or neither of latitude/longitude must be given
fn user_coordinate(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinate>, Error> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => Coordinate::try_new(lat, lng).map(Some),
        (None, None) => Ok(None),
        _ => Err(Error::InvalidCoordinates(
            "latitude and longitude must be given together".to_string(),
        )),
    }
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    /// Present when sends were attempted but nobody was reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<DeliveryReport>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "EMPTY_CONTACTS" | "INVALID_CONTACT" | "INVALID_COORDINATES" => StatusCode::BAD_REQUEST,
            "DELIVERY_FAILED" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::EmptyContacts => "EMPTY_CONTACTS",
            Error::InvalidContact(_) => "INVALID_CONTACT",
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::TotalDeliveryFailure(_) => "DELIVERY_FAILED",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        if !err.is_input_error() {
            error!(code, error = %err, "Request failed");
        }

        let error = err.to_string();
        let report = match err {
            Error::TotalDeliveryFailure(report) => Some(report),
            _ => None,
        };

        ApiError {
            error,
            code: code.to_string(),
            report,
        }
    }
}

/// Rank contacts and alert the best one
///
/// POST /api/sos
async fn sos_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SosRequest>,
) -> Result<Json<AlertOutcome>, ApiError> {
    let user = user_coordinate(req.latitude, req.longitude)?;

    let outcome = state
        .engine
        .select_and_notify(&req.contacts, user, req.subject, req.ancillary)
        .await?;

    Ok(Json(outcome))
}

/// Rank contacts without sending anything
///
/// POST /api/rank
async fn rank_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RankRequest>,
) -> Result<Json<Ranking>, ApiError> {
    let user = user_coordinate(req.latitude, req.longitude)?;
    let ranking = state.engine.rank(&req.contacts, user).await?;
    Ok(Json(ranking))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub geocoding: String,
    pub messaging: String,
    pub email: String,
    /// Places currently held by the geocoordinate cache
    pub cached_places: usize,
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let resolver = state.engine.ranker().resolver();
    let dispatcher = state.engine.dispatcher();

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        geocoding: resolver.backend().name().to_string(),
        messaging: dispatcher.messenger().name().to_string(),
        email: dispatcher.mailer().name().to_string(),
        cached_places: resolver.cache().len(),
        uptime_secs: state.uptime_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::ConfiguredEngine;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.geocoding.backend = "static".to_string();
        config
            .geocoding
            .places
            .insert("Mumbai".to_string(), Coordinate::new(19.0760, 72.8777));
        config
            .geocoding
            .places
            .insert("Delhi".to_string(), Coordinate::new(28.6139, 77.2090));
        Arc::new(AppState::new(&config).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();

        assert!(status.running);
        assert_eq!(status.geocoding, "static");
        assert_eq!(status.messaging, "console");
        assert_eq!(status.email, "console");
        assert_eq!(status.cached_places, 0);
    }

    #[tokio::test]
    async fn test_dry_run_engine_state() {
        let mut config = Config::default();
        config.geocoding.backend = "static".to_string();
        config.messaging.provider = "twilio".to_string();
        let state = AppState::with_engine(ConfiguredEngine::dry_run(&config).unwrap());
        let app = create_router(Arc::new(state));

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(status.messaging, "console");
    }

    #[tokio::test]
    async fn test_sos_endpoint() {
        let app = create_router(create_test_state());

        let request_body = serde_json::json!({
            "contacts": [
                {"name": "Cousin", "phone": "9811111111", "city": "Delhi", "priority": 2},
                {"name": "Sister", "phone": "9822222222", "city": "Mumbai", "priority": 1}
            ],
            "latitude": 19.0760,
            "longitude": 72.8777,
            "subject": {"name": "Ravi"},
            "ancillary": [{"label": "insurance", "email": "claims@example.com"}]
        });

        let response = app.oneshot(post_json("/api/sos", request_body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let outcome: AlertOutcome = serde_json::from_slice(&body).unwrap();

        assert_eq!(outcome.ranking.best().unwrap().contact.name, "Sister");
        assert_eq!(outcome.report.succeeded_count, 2);
        assert_eq!(outcome.report.failed_count, 0);
    }

    #[tokio::test]
    async fn test_sos_total_failure() {
        let app = create_router(create_test_state());

        let request_body = serde_json::json!({
            "contacts": [{"name": "Nobody"}],
            "subject": {"name": "Ravi"}
        });

        let response = app.oneshot(post_json("/api/sos", request_body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: ApiError = serde_json::from_slice(&body).unwrap();

        assert_eq!(err.code, "DELIVERY_FAILED");
        assert_eq!(err.report.unwrap().succeeded_count, 0);
    }

    #[tokio::test]
    async fn test_sos_empty_contacts() {
        let app = create_router(create_test_state());

        let request_body = serde_json::json!({
            "contacts": [],
            "subject": {"name": "Ravi"}
        });

        let response = app.oneshot(post_json("/api/sos", request_body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: ApiError = serde_json::from_slice(&body).unwrap();

        assert_eq!(err.code, "EMPTY_CONTACTS");
        assert!(err.report.is_none());
    }

    #[tokio::test]
    async fn test_rank_invalid_coordinates() {
        let app = create_router(create_test_state());

        let request_body = serde_json::json!({
            "contacts": [{"name": "Asha", "phone": "1"}],
            "lat": 91.0,
            "lng": 72.0
        });

        let response = app.oneshot(post_json("/api/rank", request_body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: ApiError = serde_json::from_slice(&body).unwrap();

        assert_eq!(err.code, "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_rank_half_coordinate() {
        let app = create_router(create_test_state());

        let request_body = serde_json::json!({
            "contacts": [{"name": "Asha", "phone": "1"}],
            "latitude": 19.0
        });

        let response = app.oneshot(post_json("/api/rank", request_body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rank_endpoint() {
        let app = create_router(create_test_state());

        let request_body = serde_json::json!({
            "contacts": [
                {"name": "A", "phone": "1", "place": "Delhi", "priority": 1},
                {"name": "B", "phone": "2", "place": "Mumbai", "priority": 1}
            ],
            "latitude": 19.0760,
            "longitude": 72.8777
        });

        let response = app.oneshot(post_json("/api/rank", request_body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let ranking: Ranking = serde_json::from_slice(&body).unwrap();

        let names: Vec<_> = ranking.contacts.iter().map(|c| c.contact.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(ranking.contacts[0].is_exact_place_match);
    }
}
