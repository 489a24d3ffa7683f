//! Shared data structures for the route advisor
//!
//! - `GeoPoint` / `BaseLocation`: coordinates and the operator's start point
//! - `Appointment`, `Candidate`, `Client`: ledger rows, proposed bookings, directory entries
//! - `Recommendation`: the advisor's classification of a candidate
//! - `clock`: `HH:MM` / `YYYY-MM-DD` parsing shared by the CLI, API and ledger

pub mod clock;
mod geo;
mod appointment;
mod recommendation;

pub use geo::*;
pub use appointment::*;
pub use recommendation::*;
