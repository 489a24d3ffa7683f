//! API handlers
//!
//! All handlers return `Response` via [`ApiResponse`] or [`ApiErrorResponse`].
//! Request bodies carry raw strings; parsing happens here so malformed dates
//! and times surface as 400 rather than as JSON extractor rejections.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::geo::{JitterSource, RngJitter, SequenceJitter};
use crate::planner::{BookingRequest, EvaluationRequest, RoutePlanner};
use crate::types::clock::parse_date;
use crate::types::{BaseLocation, Client, GeoPoint};

/// Jitter shared by all requests. Locked only while one booking's offsets
/// are drawn, never across ledger I/O.
pub type SharedJitter = Arc<Mutex<Box<dyn JitterSource + Send>>>;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub planner: Arc<RoutePlanner>,
    pub jitter: SharedJitter,
}

impl ApiState {
    /// State with entropy-seeded jitter.
    pub fn new(planner: Arc<RoutePlanner>) -> Self {
        Self::with_jitter(planner, Box::new(RngJitter::from_entropy()))
    }

    pub fn with_jitter(planner: Arc<RoutePlanner>, jitter: Box<dyn JitterSource + Send>) -> Self {
        Self {
            planner,
            jitter: Arc::new(Mutex::new(jitter)),
        }
    }

    /// Draw the latitude and longitude offsets for one coordinate
    /// resolution and release the shared source.
    pub(crate) fn draw_offsets(&self) -> Result<SequenceJitter, Response> {
        let max = self.planner.lookup().jitter_degrees();
        let mut source = self
            .jitter
            .lock()
            .map_err(|e| ApiErrorResponse::internal(format!("Jitter source unavailable: {e}")))?;
        let dlat = source.offset(max);
        let dlon = source.offset(max);
        Ok(SequenceJitter::new(vec![dlat, dlon]))
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiErrorResponse::bad_request(e.body_text()))
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EvaluateBody {
    pub date: String,
    pub client: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct BookBody {
    pub date: String,
    pub client: String,
    pub time: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewClientBody {
    pub name: String,
    pub neighborhood: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub base: String,
}

#[derive(Debug, Serialize)]
pub struct NeighborhoodEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize)]
pub struct NeighborhoodsResponse {
    pub base: BaseLocation,
    pub fallback: GeoPoint,
    pub standard_slots: Vec<String>,
    pub neighborhoods: Vec<NeighborhoodEntry>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/health
pub async fn health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        base: state.planner.base().name.clone(),
    })
}

/// GET /api/v1/neighborhoods
pub async fn neighborhoods(State(state): State<ApiState>) -> Response {
    let lookup = state.planner.lookup();
    ApiResponse::ok(NeighborhoodsResponse {
        base: state.planner.base().clone(),
        fallback: lookup.fallback(),
        standard_slots: state.planner.standard_slots().to_vec(),
        neighborhoods: lookup
            .entries()
            .map(|(name, p)| NeighborhoodEntry {
                name: name.to_string(),
                lat: p.lat,
                lon: p.lon,
            })
            .collect(),
    })
}

/// GET /api/v1/clients
pub async fn list_clients(State(state): State<ApiState>) -> Response {
    match state.planner.clients() {
        Ok(clients) => ApiResponse::ok(clients),
        Err(e) => ApiErrorResponse::from_route_error(&e),
    }
}

/// POST /api/v1/clients
pub async fn add_client(
    State(state): State<ApiState>,
    body: Result<Json<NewClientBody>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let client = Client {
        name: body.name,
        neighborhood: body.neighborhood,
        contact: body.contact,
        notes: body.notes,
    };
    match state.planner.add_client(client) {
        Ok(stored) => ApiResponse::created(stored),
        Err(e) => ApiErrorResponse::from_route_error(&e),
    }
}

/// GET /api/v1/dates
pub async fn booked_dates(State(state): State<ApiState>) -> Response {
    match state.planner.booked_dates() {
        Ok(dates) => ApiResponse::ok(dates),
        Err(e) => ApiErrorResponse::from_route_error(&e),
    }
}

/// GET /api/v1/schedule/:date
pub async fn schedule(State(state): State<ApiState>, Path(date): Path<String>) -> Response {
    let result = parse_date(&date).and_then(|d| state.planner.schedule(d));
    match result {
        Ok(day) => ApiResponse::ok(day),
        Err(e) => ApiErrorResponse::from_route_error(&e),
    }
}

/// GET /api/v1/route/:date
pub async fn day_route(State(state): State<ApiState>, Path(date): Path<String>) -> Response {
    let result = parse_date(&date).and_then(|d| state.planner.day_route(d));
    match result {
        Ok(route) => ApiResponse::ok(route),
        Err(e) => ApiErrorResponse::from_route_error(&e),
    }
}

/// POST /api/v1/evaluate
pub async fn evaluate(
    State(state): State<ApiState>,
    body: Result<Json<EvaluateBody>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let request = match EvaluationRequest::parse(&body.date, &body.client, &body.time) {
        Ok(r) => r,
        Err(e) => return ApiErrorResponse::from_route_error(&e),
    };
    let mut jitter = match state.draw_offsets() {
        Ok(j) => j,
        Err(resp) => return resp,
    };
    match state.planner.evaluate(&request, &mut jitter) {
        Ok(assessment) => ApiResponse::ok(assessment),
        Err(e) => ApiErrorResponse::from_route_error(&e),
    }
}

/// POST /api/v1/appointments
pub async fn book(
    State(state): State<ApiState>,
    body: Result<Json<BookBody>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let request = match BookingRequest::parse(
        &body.date,
        &body.client,
        &body.time,
        body.service.as_deref(),
    ) {
        Ok(r) => r,
        Err(e) => return ApiErrorResponse::from_route_error(&e),
    };
    let mut jitter = match state.draw_offsets() {
        Ok(j) => j,
        Err(resp) => return resp,
    };
    match state.planner.confirm(&request, &mut jitter) {
        Ok(appointment) => ApiResponse::created(appointment),
        Err(e) => ApiErrorResponse::from_route_error(&e),
    }
}
