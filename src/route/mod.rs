//! Day Route - the ordered route a day's schedule implies
//!
//! Produces the data a map or timeline needs: numbered stops, the polyline
//! from base through every stop, per-leg and total distance, the map centre,
//! and which appointments sit close in time to a proposed slot.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::geo::{haversine_km, round_km};
use crate::types::clock::hhmm;
use crate::types::{Appointment, BaseLocation, GeoPoint};

/// One numbered stop on the route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStop {
    /// 1-based position in the day
    pub number: usize,
    pub appointment: Appointment,
}

/// Straight-line leg between consecutive points.
#[derive(Debug, Clone, Serialize)]
pub struct RouteLeg {
    /// Label of the origin ("Base" or the client name)
    pub from: String,
    pub to: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRoute {
    pub base: BaseLocation,
    pub stops: Vec<RouteStop>,
    pub legs: Vec<RouteLeg>,
    pub total_km: f64,
    /// Mean of stop coordinates; `None` for an empty day
    pub center: Option<GeoPoint>,
    /// Base first, then every stop in order
    pub path: Vec<GeoPoint>,
}

impl DayRoute {
    pub fn build(schedule: &[Appointment], base: &BaseLocation) -> Self {
        let mut ordered: Vec<Appointment> = schedule.to_vec();
        ordered.sort_by_key(|a| a.time);

        let mut path = Vec::with_capacity(ordered.len() + 1);
        path.push(base.point);
        path.extend(ordered.iter().map(Appointment::location));

        let mut legs = Vec::with_capacity(ordered.len());
        let mut from_label = "Base".to_string();
        let mut from_point = base.point;
        for appt in &ordered {
            let distance_km = haversine_km(from_point, appt.location());
            legs.push(RouteLeg {
                from: from_label,
                to: appt.client.clone(),
                distance_km,
            });
            from_label = appt.client.clone();
            from_point = appt.location();
        }
        let total_km = round_km(legs.iter().map(|l| l.distance_km).sum());

        let center = if ordered.is_empty() {
            None
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = ordered.len() as f64;
            let lat = ordered.iter().map(|a| a.lat).sum::<f64>() / n;
            let lon = ordered.iter().map(|a| a.lon).sum::<f64>() / n;
            Some(GeoPoint::new(lat, lon))
        };

        let stops = ordered
            .into_iter()
            .enumerate()
            .map(|(i, appointment)| RouteStop {
                number: i + 1,
                appointment,
            })
            .collect();

        Self {
            base: base.clone(),
            stops,
            legs,
            total_km,
            center,
            path,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Timeline card for one booked slot.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancySlot {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub client: String,
    pub neighborhood: String,
    /// Booked hour is within `window_hours` of the proposed hour
    pub near: bool,
}

/// Occupancy timeline for a proposed time, sorted by time.
///
/// Compares whole hours only: with a window of 1, a 09:59 booking is near a
/// 09:00 proposal but a 10:00 booking is not.
pub fn occupancy(schedule: &[Appointment], proposed: NaiveTime, window_hours: u32) -> Vec<OccupancySlot> {
    let mut ordered: Vec<&Appointment> = schedule.iter().collect();
    ordered.sort_by_key(|a| a.time);
    ordered
        .into_iter()
        .map(|a| OccupancySlot {
            time: a.time,
            client: a.client.clone(),
            neighborhood: a.neighborhood.clone(),
            near: a.time.hour().abs_diff(proposed.hour()) < window_hours,
        })
        .collect()
}
