//! Neighborhood lookup table
//!
//! Read-only after construction; share it behind an `Arc`.

use chrono::NaiveTime;
use std::collections::BTreeMap;
use tracing::warn;

use super::JitterSource;
use crate::config::{defaults, GeoConfig};
use crate::types::{BaseLocation, Candidate, GeoPoint};

/// Maps neighborhood names to approximate centre coordinates.
#[derive(Debug, Clone)]
pub struct GeoLookup {
    table: BTreeMap<String, GeoPoint>,
    fallback: GeoPoint,
    jitter_degrees: f64,
}

impl GeoLookup {
    pub fn new(table: BTreeMap<String, GeoPoint>, fallback: GeoPoint, jitter_degrees: f64) -> Self {
        Self {
            table,
            fallback,
            jitter_degrees,
        }
    }

    pub fn from_config(config: &GeoConfig) -> Self {
        let table = config
            .neighborhoods
            .iter()
            .map(|(name, pair)| (name.clone(), GeoPoint::from(*pair)))
            .collect();
        Self::new(
            table,
            GeoPoint::new(config.fallback_lat, config.fallback_lon),
            config.jitter_degrees,
        )
    }

    /// Built-in Montevideo table.
    pub fn montevideo() -> Self {
        Self::from_config(&GeoConfig::default())
    }

    pub fn contains(&self, neighborhood: &str) -> bool {
        self.table.contains_key(neighborhood)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, GeoPoint)> {
        self.table.iter().map(|(name, point)| (name.as_str(), *point))
    }

    pub const fn fallback(&self) -> GeoPoint {
        self.fallback
    }

    pub const fn jitter_degrees(&self) -> f64 {
        self.jitter_degrees
    }

    /// Base coordinate for a neighborhood, or the fallback point if unknown.
    pub fn resolve(&self, neighborhood: &str) -> GeoPoint {
        if let Some(point) = self.table.get(neighborhood) {
            *point
        } else {
            warn!(
                neighborhood = %neighborhood,
                fallback = %self.fallback,
                "Unknown neighborhood, using fallback coordinate"
            );
            self.fallback
        }
    }

    /// Base coordinate plus independent latitude and longitude jitter.
    pub fn resolve_jittered(&self, neighborhood: &str, jitter: &mut dyn JitterSource) -> GeoPoint {
        let point = self.resolve(neighborhood);
        let dlat = jitter.offset(self.jitter_degrees);
        let dlon = jitter.offset(self.jitter_degrees);
        point.offset(dlat, dlon)
    }

    /// Build a candidate with freshly jittered coordinates.
    pub fn candidate(
        &self,
        neighborhood: &str,
        proposed_time: NaiveTime,
        jitter: &mut dyn JitterSource,
    ) -> Candidate {
        Candidate::new(
            neighborhood,
            proposed_time,
            self.resolve_jittered(neighborhood, jitter),
        )
    }

    /// The operator's base. Never jittered.
    pub fn base(&self, neighborhood: &str) -> BaseLocation {
        BaseLocation::new(neighborhood, self.resolve(neighborhood))
    }
}

impl Default for GeoLookup {
    fn default() -> Self {
        Self::montevideo()
    }
}

/// Documented fallback for unknown neighborhoods.
pub const FALLBACK_POINT: GeoPoint =
    GeoPoint::new(defaults::FALLBACK_POINT[0], defaults::FALLBACK_POINT[1]);
