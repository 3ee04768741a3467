use std::collections::BTreeMap;
use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::config::Config;
use crate::evolution::history::{build_timeline, cumulative_change, TimelineEntry};
use crate::evolution::summary::summarize_report;
use crate::evolution::{compute_evolution, EvolutionReport, MetricKey};
use crate::measurements::{extract, MeasurementPair};
use crate::types::{Baseline, CheckinSnapshot};

const MAX_BATCH: usize = 500;

#[derive(Clone)]
struct ApiState {
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct ExtractRequest {
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchExtractRequest {
    #[serde(default)]
    texts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct EvolutionRequest {
    current: CheckinSnapshot,
    previous: Option<CheckinSnapshot>,
    baseline: Option<Baseline>,
}

#[derive(Debug, Clone, Deserialize)]
struct TimelineRequest {
    #[serde(default)]
    checkins: Vec<CheckinSnapshot>,
    baseline: Option<Baseline>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ExtractResponse {
    #[serde(flatten)]
    pair: MeasurementPair,
    waist_to_hip_ratio: Option<f64>,
}

impl From<MeasurementPair> for ExtractResponse {
    fn from(pair: MeasurementPair) -> Self {
        Self {
            waist_to_hip_ratio: pair.waist_to_hip_ratio(),
            pair,
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchExtractResponse {
    results: Vec<ExtractResponse>,
}

#[derive(Debug, Serialize)]
struct EvolutionResponse {
    report: EvolutionReport,
    summary: String,
}

#[derive(Debug, Serialize)]
struct TimelineResponse {
    entries: Vec<TimelineEntry>,
    cumulative: BTreeMap<&'static str, f64>,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/extract", post(extract_one))
        .route("/v1/extract/batch", post(extract_batch))
        .route("/v1/evolution", post(evolution))
        .route("/v1/timeline", post(timeline))
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(ApiState { config });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn extract_one(Json(request): Json<ExtractRequest>) -> ApiResult<ExtractResponse> {
    Ok(ok(extract(&request.text).into()))
}

async fn extract_batch(Json(request): Json<BatchExtractRequest>) -> ApiResult<BatchExtractResponse> {
    if request.texts.is_empty() {
        return Err(ApiError::bad_request("texts must not be empty"));
    }
    if request.texts.len() > MAX_BATCH {
        return Err(ApiError::bad_request(format!(
            "batch of {} texts exceeds the limit of {MAX_BATCH}",
            request.texts.len()
        )));
    }
    debug!(count = request.texts.len(), "extracting batch");
    let results = request
        .texts
        .iter()
        .map(|text| extract(text).into())
        .collect();
    Ok(ok(BatchExtractResponse { results }))
}

async fn evolution(Json(request): Json<EvolutionRequest>) -> ApiResult<EvolutionResponse> {
    let report = compute_evolution(
        &request.current,
        request.previous.as_ref(),
        request.baseline.as_ref(),
    );
    let summary = summarize_report(&report);
    Ok(ok(EvolutionResponse { report, summary }))
}

async fn timeline(Json(request): Json<TimelineRequest>) -> ApiResult<TimelineResponse> {
    if request.checkins.is_empty() {
        return Err(ApiError::bad_request("checkins must not be empty"));
    }
    let entries = build_timeline(&request.checkins, request.baseline.as_ref());
    let cumulative = MetricKey::ALL
        .iter()
        .filter_map(|&key| cumulative_change(&entries, key).map(|change| (key.as_slug(), change)))
        .collect();
    Ok(ok(TimelineResponse {
        entries,
        cumulative,
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}
