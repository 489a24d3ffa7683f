//! API route definitions
//!
//! - /api/v1/health - liveness and operator base
//! - /api/v1/neighborhoods - lookup table, base and standard slots
//! - /api/v1/clients - client directory
//! - /api/v1/dates - days with at least one booking
//! - /api/v1/schedule/:date - the day's appointments
//! - /api/v1/route/:date - ordered route with legs and totals
//! - /api/v1/evaluate - classify a proposed booking
//! - /api/v1/appointments - confirm a booking

use axum::{routing::{get, post}, Router};

use super::handlers::{self, ApiState};

/// Create all v1 API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/neighborhoods", get(handlers::neighborhoods))
        .route("/clients", get(handlers::list_clients).post(handlers::add_client))
        .route("/dates", get(handlers::booked_dates))
        .route("/schedule/:date", get(handlers::schedule))
        .route("/route/:date", get(handlers::day_route))
        .route("/evaluate", post(handlers::evaluate))
        .route("/appointments", post(handlers::book))
        .with_state(state)
}
