//! Route Advisor: proximity scoring for mobile-service bookings
//!
//! An operator travels from a fixed base to clients across the city. Before a
//! booking is confirmed, the advisor classifies how well the client's
//! neighborhood fits the day's existing route.
//!
//! ## Architecture
//!
//! - **Geo**: neighborhood lookup, haversine distance, coordinate jitter
//! - **Advisor**: the rule-based classifier (ideal / acceptable / risky)
//! - **Storage**: appointment ledger and client directory (CSV or in-memory)
//! - **Planner**: evaluates and confirms bookings against the stores
//! - **Route**: the day's ordered route and occupancy timeline
//! - **API**: axum HTTP surface over the planner

pub mod advisor;
pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod planner;
pub mod route;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, RouteConfig};

// Re-export commonly used types
pub use types::{
    Appointment, BaseLocation, Candidate, Classification, Client, GeoPoint, ReasonLabel,
    Recommendation, ReferencePoint,
};

pub use advisor::ProximityAdvisor;
pub use error::RouteError;
pub use geo::{haversine_km, GeoLookup, JitterSource, NoJitter, RngJitter, SequenceJitter};
pub use planner::{Assessment, BookingRequest, EvaluationRequest, RoutePlanner};
pub use route::{DayRoute, OccupancySlot};
pub use storage::{ClientBook, LedgerStore, StorageError};
