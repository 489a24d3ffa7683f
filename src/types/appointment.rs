//! Ledger rows, proposed bookings and the client directory entry

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::clock::hhmm;
use super::GeoPoint;

/// One confirmed booking in a day's schedule.
///
/// Coordinates are resolved once at confirmation (lookup + jitter) and
/// frozen; later reads never recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub client: String,
    pub neighborhood: String,
    pub service: String,
    pub lat: f64,
    pub lon: f64,
    /// Free-form label (e.g. "Pendiente"); ignored by the advisor
    pub status: String,
}

impl Appointment {
    pub const fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// A proposed booking under evaluation. Never persisted until confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub neighborhood: String,
    #[serde(with = "hhmm")]
    pub proposed_time: NaiveTime,
    pub location: GeoPoint,
}

impl Candidate {
    pub fn new(neighborhood: impl Into<String>, proposed_time: NaiveTime, location: GeoPoint) -> Self {
        Self {
            neighborhood: neighborhood.into(),
            proposed_time,
            location,
        }
    }
}

/// A client directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub neighborhood: String,
    #[serde(default)]
    pub contact: String,
    /// Technical notes (hair type, products, access instructions, ...)
    #[serde(default)]
    pub notes: String,
}

impl Client {
    pub fn new(name: impl Into<String>, neighborhood: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            neighborhood: neighborhood.into(),
            contact: String::new(),
            notes: String::new(),
        }
    }
}
