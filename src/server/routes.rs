//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::region::{available_regions, Region};
use crate::coord::{Coordinate, SelectionType};
use crate::environment::{synthesize_at, EnvironmentalSnapshot, SynthesisOptions, UnitSystem};
use crate::error::Error;
use crate::format::{available_formats, FormatInfo};
use crate::geo::resolver::{resolve_name, search_places};
use crate::geo::{GeoBackend, PlaceName, SearchResult};
use crate::selection::SelectedLocation;
use crate::server::state::AppState;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::debug;

/// Locate the frontend: `./static`, else `static/` next to the executable
fn static_dir() -> PathBuf {
    let local = PathBuf::from("static");
    if local.exists() {
        return local;
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// Create the API router
pub fn create_router<G: GeoBackend + 'static>(state: Arc<AppState<G>>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler::<G>))
        .route("/api/formats", get(formats_handler))
        .route("/api/snapshot", get(snapshot_handler::<G>))
        .route("/api/reverse", get(reverse_handler::<G>))
        .route("/api/search", get(search_handler::<G>))
        .route("/api/select", post(select_handler::<G>))
        .route("/api/selection", get(selection_handler::<G>))
        .route("/api/preview", post(preview_handler::<G>))
        .route("/api/preview/confirm", post(confirm_handler::<G>))
        .route("/api/preview/cancel", post(cancel_handler::<G>))
        .route("/api/recent", get(recent_handler::<G>))
        .route("/api/regions", get(regions_handler))
        .route("/api/regions/:name/select", post(region_select_handler::<G>))
        .nest_service(
            "/",
            ServeDir::new(static_dir()).append_index_html_on_directories(true),
        )
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "UNKNOWN_REGION" | "NO_PREVIEW" => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::UnknownRegion(_) => "UNKNOWN_REGION",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Geocoding(_) => "GEOCODING_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

/// Coordinate query parameters
#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lon: f64,
}

impl PointQuery {
    fn coordinate(&self) -> Result<Coordinate, ApiError> {
        let coord = Coordinate::new(self.lat, self.lon);
        coord.validate()?;
        Ok(coord)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub units: UnitSystem,
    pub geocoder: String,
    pub has_selection: bool,
    pub uptime_secs: u64,
}

/// GET /api/status
async fn status_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Json<StatusResponse> {
    let config = state.config.read().await;
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        units: config.synthesis.units,
        geocoder: config.geocoding.base_url.clone(),
        has_selection: state.workflow.current().is_some(),
        uptime_secs: state.uptime_secs(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatsResponse {
    pub formats: Vec<FormatInfo>,
}

/// GET /api/formats
async fn formats_handler() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: available_formats(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub lat: f64,
    pub lon: f64,
    pub units: Option<UnitSystem>,
    pub month: Option<u32>,
}

/// Synthesize metrics without touching the selection
///
/// GET /api/snapshot?lat&lon[&units][&month]
async fn snapshot_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<EnvironmentalSnapshot>, ApiError> {
    let coord = Coordinate::new(query.lat, query.lon);
    coord.validate()?;

    let mut options = state.workflow.settings().synthesis;
    if let Some(units) = query.units {
        options = SynthesisOptions {
            units,
            ..options
        };
    }
    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            return Err(ApiError::new(
                "INVALID_MONTH",
                format!("Month must be 1-12, got {}", month),
            ));
        }
        options = options.with_month(month);
    }

    Ok(Json(synthesize_at(coord, &options)))
}

/// Resolve a place name, falling back on failure or timeout
///
/// GET /api/reverse?lat&lon
async fn reverse_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<PlaceName>, ApiError> {
    let coord = query.coordinate()?;
    let timeout = state.workflow.settings().timeout;
    Ok(Json(resolve_name(state.backend(), coord, timeout).await))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Forward search; failures and timeouts yield an empty list
///
/// GET /api/search?q[&limit]
async fn search_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let q = query.q.trim();
    if q.is_empty() {
        return Json(SearchResponse {
            results: Vec::new(),
        });
    }

    let default_limit = state.config.read().await.geocoding.search_limit;
    let limit = query.limit.unwrap_or(default_limit).clamp(1, default_limit.max(1));

    let timeout = state.workflow.settings().timeout;
    let results = search_places(state.backend(), q, limit, timeout).await;
    Json(SearchResponse { results })
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub selection_type: SelectionType,
    /// Wait for the place name before responding
    #[serde(default)]
    pub wait: bool,
}

/// Commit a coordinate as the current selection
///
/// POST /api/select
async fn select_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectedLocation>, ApiError> {
    let coord = Coordinate::new(req.lat, req.lon);
    coord.validate()?;

    let pending = state.workflow.select_coordinate(coord, req.selection_type).await;
    if !req.wait {
        return Ok(Json(pending.location));
    }

    let request_id = pending.location.request_id;
    if let Err(e) = pending.resolution.await {
        debug!("Resolution task for request {} ended abnormally: {}", request_id, e);
    }
    Ok(Json(state.workflow.current().unwrap_or(pending.location)))
}

/// GET /api/selection
async fn selection_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Json<Option<SelectedLocation>> {
    Json(state.workflow.current())
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub selection_type: SelectionType,
}

/// POST /api/preview
async fn preview_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<SelectedLocation>, ApiError> {
    let coord = Coordinate::new(req.lat, req.lon);
    coord.validate()?;
    Ok(Json(
        state
            .workflow
            .preview_coordinate(coord, req.selection_type)
            .await,
    ))
}

/// POST /api/preview/confirm
async fn confirm_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<SelectedLocation>, ApiError> {
    state
        .workflow
        .confirm()
        .await
        .map(|pending| Json(pending.location))
        .ok_or_else(|| ApiError::new("NO_PREVIEW", "No preview to confirm"))
}

/// POST /api/preview/cancel
async fn cancel_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Json<Option<SelectedLocation>> {
    Json(state.workflow.cancel().await)
}

/// GET /api/recent
async fn recent_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Json<Vec<SelectedLocation>> {
    Json(state.workflow.recent().await)
}

#[derive(Debug, Serialize)]
pub struct RegionInfo {
    #[serde(flatten)]
    pub region: Region,
    pub center: Coordinate,
}

/// GET /api/regions
async fn regions_handler() -> Json<Vec<RegionInfo>> {
    Json(
        available_regions()
            .iter()
            .map(|region| RegionInfo {
                region: region.clone(),
                center: region.center(),
            })
            .collect(),
    )
}

/// POST /api/regions/:name/select
async fn region_select_handler<G: GeoBackend + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(name): Path<String>,
) -> Result<Json<SelectedLocation>, ApiError> {
    Ok(Json(state.workflow.select_region(&name).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geo::mock::MockBackend;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState<MockBackend>> {
        let backend = MockBackend::new().with_name(Coordinate::new(-1.2921, 36.8219), "Nairobi");
        Arc::new(AppState::new(Config::default(), backend))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state());
        let (status, body) = get_json(app, "/api/status").await;

        assert_eq!(status, StatusCode::OK);
        let status: StatusResponse = serde_json::from_value(body).unwrap();
        assert!(status.running);
        assert_eq!(status.units, UnitSystem::Metric);
        assert!(!status.has_selection);
    }

    #[tokio::test]
    async fn test_formats_endpoint() {
        let app = create_router(create_test_state());
        let (_, body) = get_json(app, "/api/formats").await;
        assert_eq!(body["formats"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_endpoint() {
        let app = create_router(create_test_state());
        let (status, body) =
            get_json(app, "/api/snapshot?lat=-1.2921&lon=36.8219&units=imperial&month=7").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["units"], "imperial");
        assert_eq!(body["month"], 7);
        assert!(body["temperature"].is_number());
    }

    #[tokio::test]
    async fn test_snapshot_rejects_bad_input() {
        let state = create_test_state();

        let (status, body) =
            get_json(create_router(state.clone()), "/api/snapshot?lat=95&lon=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");

        let (status, body) =
            get_json(create_router(state), "/api/snapshot?lat=0&lon=0&month=13").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_MONTH");
    }

    #[tokio::test]
    async fn test_reverse_endpoint() {
        let app = create_router(create_test_state());
        let (status, body) = get_json(app, "/api/reverse?lat=-1.2921&lon=36.8219").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Nairobi");
        assert_eq!(body["country"], "Kenya");
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let state = create_test_state();

        let (_, body) = get_json(create_router(state.clone()), "/api/search?q=Nyeri&limit=2").await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["placeName"], "Nyeri 0");

        let (_, body) = get_json(create_router(state.clone()), "/api/search?q=%20").await;
        assert!(body["results"].as_array().unwrap().is_empty());
        assert_eq!(state.backend().queries(), vec!["Nyeri"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_endpoint_times_out() {
        let backend = MockBackend::new().with_search_delay("Nyeri", Duration::from_secs(3600));
        let state = Arc::new(AppState::new(Config::default(), backend));

        let request = get_json(create_router(state), "/api/search?q=Nyeri");
        let (status, body) = tokio::time::timeout(Duration::from_secs(60), request)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_select_and_selection() {
        let state = create_test_state();

        let (status, body) = post_json(
            create_router(state.clone()),
            "/api/select",
            json!({"lat": -1.2921, "lon": 36.8219, "selection_type": "click", "wait": true}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isLoading"], false);
        assert_eq!(body["place"]["name"], "Nairobi");

        let (_, body) = get_json(create_router(state.clone()), "/api/selection").await;
        assert_eq!(body["place"]["name"], "Nairobi");

        let (_, body) = get_json(create_router(state), "/api/recent").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_select_returns_provisional() {
        let app = create_router(create_test_state());
        let (_, body) = post_json(app, "/api/select", json!({"lat": 0.5, "lon": 35.0})).await;

        assert_eq!(body["isLoading"], true);
        assert_eq!(body["place"]["name"], "Locating...");
        assert_eq!(body["selectionType"], "click");
    }

    #[tokio::test]
    async fn test_preview_flow() {
        let state = create_test_state();

        let (status, body) = post_json(
            create_router(state.clone()),
            "/api/preview/confirm",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NO_PREVIEW");

        let (_, body) = post_json(
            create_router(state.clone()),
            "/api/preview",
            json!({"lat": 0.5, "lon": 35.0, "selection_type": "search"}),
        )
        .await;
        assert_eq!(body["isPreview"], true);

        let (_, body) = post_json(
            create_router(state.clone()),
            "/api/preview/cancel",
            json!({}),
        )
        .await;
        assert!(body.is_null());

        post_json(
            create_router(state.clone()),
            "/api/preview",
            json!({"lat": 0.5, "lon": 35.0}),
        )
        .await;
        let (status, body) = post_json(
            create_router(state.clone()),
            "/api/preview/confirm",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isPreview"], false);
        assert!(state.workflow.current().is_some());
    }

    #[tokio::test]
    async fn test_regions() {
        let state = create_test_state();

        let (_, body) = get_json(create_router(state.clone()), "/api/regions").await;
        let regions = body.as_array().unwrap();
        assert_eq!(regions.len(), 3);
        assert!(regions[0]["center"]["lat"].is_number());

        let (status, body) = post_json(
            create_router(state.clone()),
            "/api/regions/kisumu/select",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["place"]["name"], "Kisumu");
        assert_eq!(body["selectionType"], "region");

        let (status, body) = post_json(
            create_router(state),
            "/api/regions/atlantis/select",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNKNOWN_REGION");
    }
}
