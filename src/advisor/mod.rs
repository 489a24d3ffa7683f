//! Proximity Advisor - classifies how a candidate booking fits the day's route
//!
//! Pure and synchronous: no I/O, no shared state, safe to call concurrently.
//!
//! ## Rules
//!
//! 1. Empty day: distance from base. Below `first_booking_ideal_max_km` is
//!    ideal, anything else acceptable.
//! 2. Split the schedule at the proposed time. Appointments at the same time
//!    count as *before*.
//! 3. No previous stop: the candidate opens the route. It is risky only when
//!    it lands more than `detour_max_km` from the next booking.
//! 4. Previous stop present: banded on distance from that stop
//!    (`< ideal_max_km` ideal, `< acceptable_max_km` acceptable, else risky).
//!
//! In case 4 the following appointment is never examined. A candidate
//! squeezed between two bookings is only checked against the earlier one.

use tracing::debug;

use crate::config::ProximityThresholds;
use crate::geo::haversine_km;
use crate::types::{
    Appointment, BaseLocation, Candidate, Classification, ReasonLabel, Recommendation,
    ReferencePoint,
};

/// Rule-based route-fit classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityAdvisor {
    thresholds: ProximityThresholds,
}

impl ProximityAdvisor {
    pub const fn new(thresholds: ProximityThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify `candidate` against `schedule` (any order) and `base`.
    pub fn evaluate(
        &self,
        schedule: &[Appointment],
        candidate: &Candidate,
        base: &BaseLocation,
    ) -> Recommendation {
        let t = &self.thresholds;

        if schedule.is_empty() {
            let dist = haversine_km(base.point, candidate.location);
            let classification = if dist < t.first_booking_ideal_max_km {
                Classification::Ideal
            } else {
                Classification::Acceptable
            };
            return self.finish(Recommendation {
                classification,
                reason_label: ReasonLabel::FirstBooking,
                distance_km: dist,
                reference_point: ReferencePoint::Base,
                message: format!("Leaving from base ({}). Distance: {dist:.1} km.", base.name),
            });
        }

        let (prev, next) = neighbors(schedule, candidate);

        let Some(prev) = prev else {
            let dist_from_base = haversine_km(base.point, candidate.location);
            if let Some(next) = next {
                let dist_to_next = haversine_km(candidate.location, next.location());
                if dist_to_next > t.detour_max_km {
                    return self.finish(Recommendation {
                        classification: Classification::Risky,
                        reason_label: ReasonLabel::LargeDetour,
                        distance_km: dist_to_next,
                        reference_point: ReferencePoint::NextAppointment,
                        message: format!(
                            "Moves {dist_to_next:.1} km away from the next client ({} in {}).",
                            next.client, next.neighborhood
                        ),
                    });
                }
            }
            return self.finish(Recommendation {
                classification: Classification::Ideal,
                reason_label: ReasonLabel::GoodStart,
                distance_km: dist_from_base,
                reference_point: ReferencePoint::Base,
                message: format!("Route start. {dist_from_base:.1} km from base."),
            });
        };

        let dist = haversine_km(prev.location(), candidate.location);
        let (classification, reason_label, message) = if dist < t.ideal_max_km {
            (
                Classification::Ideal,
                ReasonLabel::IdealZone,
                format!("Only {dist:.1} km from {} in {}.", prev.client, prev.neighborhood),
            )
        } else if dist < t.acceptable_max_km {
            (
                Classification::Acceptable,
                ReasonLabel::AcceptableDistance,
                format!("Moves {dist:.1} km from {}.", prev.neighborhood),
            )
        } else {
            (
                Classification::Risky,
                ReasonLabel::LogisticJump,
                format!(
                    "Far from the previous booking: {dist:.1} km from {} in {}.",
                    prev.client, prev.neighborhood
                ),
            )
        };

        self.finish(Recommendation {
            classification,
            reason_label,
            distance_km: dist,
            reference_point: ReferencePoint::PreviousAppointment,
            message,
        })
    }

    fn finish(&self, rec: Recommendation) -> Recommendation {
        debug!(
            classification = %rec.classification,
            reason = %rec.reason_label,
            distance_km = rec.distance_km,
            "Proximity evaluated"
        );
        rec
    }
}

/// The latest appointment at or before the proposed time, and the earliest
/// one strictly after it.
///
/// Ties keep input order: among equal times `prev` is the last listed and
/// `next` the first listed, as a stable ascending sort would give.
fn neighbors<'a>(
    schedule: &'a [Appointment],
    candidate: &Candidate,
) -> (Option<&'a Appointment>, Option<&'a Appointment>) {
    let mut ordered: Vec<&Appointment> = schedule.iter().collect();
    ordered.sort_by_key(|a| a.time);

    let split = ordered.partition_point(|a| a.time <= candidate.proposed_time);
    let prev = split.checked_sub(1).map(|i| ordered[i]);
    let next = ordered.get(split).copied();
    (prev, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoLookup;
    use crate::types::GeoPoint;
    use chrono::{NaiveDate, NaiveTime};

    /// One degree of latitude on the 6371 km sphere.
    const KM_PER_DEG_LAT: f64 = 111.194_926_644_558_73;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn appt(time: NaiveTime, client: &str, neighborhood: &str, point: GeoPoint) -> Appointment {
        Appointment {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            time,
            client: client.to_string(),
            neighborhood: neighborhood.to_string(),
            service: "Corte".to_string(),
            lat: point.lat,
            lon: point.lon,
            status: "Pendiente".to_string(),
        }
    }

    fn in_hood(time: NaiveTime, client: &str, neighborhood: &str) -> Appointment {
        appt(time, client, neighborhood, GeoLookup::montevideo().resolve(neighborhood))
    }

    fn candidate(neighborhood: &str, time: NaiveTime) -> Candidate {
        Candidate::new(neighborhood, time, GeoLookup::montevideo().resolve(neighborhood))
    }

    fn base() -> BaseLocation {
        GeoLookup::montevideo().base("Malvín")
    }

    #[test]
    fn test_empty_day_near_base_is_ideal() {
        let rec = ProximityAdvisor::default().evaluate(&[], &candidate("Carrasco", at(9, 0)), &base());
        assert_eq!(rec.classification, Classification::Ideal);
        assert_eq!(rec.reason_label, ReasonLabel::FirstBooking);
        assert_eq!(rec.reference_point, ReferencePoint::Base);
        assert_eq!(rec.distance_km, 4.9);
    }

    #[test]
    fn test_empty_day_far_from_base_is_acceptable() {
        let rec = ProximityAdvisor::default().evaluate(&[], &candidate("Prado", at(9, 0)), &base());
        assert_eq!(rec.classification, Classification::Acceptable);
        assert_eq!(rec.reason_label, ReasonLabel::FirstBooking);
        assert!(rec.distance_km >= 8.0);
    }

    #[test]
    fn test_prev_bands() {
        let advisor = ProximityAdvisor::default();
        let schedule = vec![in_hood(at(9, 0), "Ana", "Pocitos")];

        let ideal = advisor.evaluate(&schedule, &candidate("Buceo", at(10, 0)), &base());
        assert_eq!(ideal.classification, Classification::Ideal);
        assert_eq!(ideal.reason_label, ReasonLabel::IdealZone);
        assert_eq!(ideal.reference_point, ReferencePoint::PreviousAppointment);

        let acceptable = advisor.evaluate(&schedule, &candidate("Centro", at(10, 0)), &base());
        assert_eq!(acceptable.classification, Classification::Acceptable);
        assert_eq!(acceptable.reason_label, ReasonLabel::AcceptableDistance);

        let risky = advisor.evaluate(&schedule, &candidate("Carrasco", at(10, 0)), &base());
        assert_eq!(risky.classification, Classification::Risky);
        assert_eq!(risky.reason_label, ReasonLabel::LogisticJump);
        assert!(risky.message.contains("Ana"));
    }

    #[test]
    fn test_band_boundaries_are_inclusive_below() {
        let advisor = ProximityAdvisor::default();
        let origin = GeoPoint::new(-34.9, -56.1);
        let schedule = vec![appt(at(9, 0), "Ana", "Test", origin)];

        let four = Candidate::new("Test", at(10, 0), origin.offset(4.0 / KM_PER_DEG_LAT, 0.0));
        let rec = advisor.evaluate(&schedule, &four, &base());
        assert_eq!(rec.distance_km, 4.0);
        assert_eq!(rec.classification, Classification::Acceptable);

        let eight = Candidate::new("Test", at(10, 0), origin.offset(8.0 / KM_PER_DEG_LAT, 0.0));
        let rec = advisor.evaluate(&schedule, &eight, &base());
        assert_eq!(rec.distance_km, 8.0);
        assert_eq!(rec.classification, Classification::Risky);
    }

    #[test]
    fn test_first_stop_good_start() {
        let schedule = vec![in_hood(at(10, 0), "Bea", "Centro")];
        let rec = ProximityAdvisor::default().evaluate(&schedule, &candidate("Cordón", at(9, 0)), &base());
        assert_eq!(rec.classification, Classification::Ideal);
        assert_eq!(rec.reason_label, ReasonLabel::GoodStart);
        assert_eq!(rec.reference_point, ReferencePoint::Base);
    }

    #[test]
    fn test_first_stop_large_detour() {
        let schedule = vec![in_hood(at(10, 0), "Bea", "Centro")];
        let rec = ProximityAdvisor::default().evaluate(&schedule, &candidate("Carrasco", at(9, 0)), &base());
        assert_eq!(rec.classification, Classification::Risky);
        assert_eq!(rec.reason_label, ReasonLabel::LargeDetour);
        assert_eq!(rec.reference_point, ReferencePoint::NextAppointment);
        assert!(rec.distance_km > 10.0);
        assert!(rec.message.contains("Bea"));
    }

    #[test]
    fn test_equal_time_goes_before() {
        let schedule = vec![in_hood(at(9, 0), "Ana", "Pocitos")];
        let rec = ProximityAdvisor::default().evaluate(&schedule, &candidate("Carrasco", at(9, 0)), &base());
        assert_eq!(rec.reference_point, ReferencePoint::PreviousAppointment);
        assert_eq!(rec.reason_label, ReasonLabel::LogisticJump);
    }

    #[test]
    fn test_tied_times_pick_last_listed_as_prev() {
        let schedule = vec![
            in_hood(at(9, 0), "Ana", "Carrasco"),
            in_hood(at(9, 0), "Bea", "Pocitos"),
        ];
        let rec = ProximityAdvisor::default().evaluate(&schedule, &candidate("Buceo", at(9, 30)), &base());
        assert!(rec.message.contains("Bea"), "{}", rec.message);
        assert_eq!(rec.classification, Classification::Ideal);
    }

    #[test]
    fn test_unsorted_schedule_is_sorted_internally() {
        let schedule = vec![
            in_hood(at(15, 0), "Late", "Carrasco"),
            in_hood(at(8, 0), "Early", "Carrasco"),
            in_hood(at(11, 0), "Mid", "Pocitos"),
        ];
        let rec = ProximityAdvisor::default().evaluate(&schedule, &candidate("Buceo", at(12, 0)), &base());
        assert!(rec.message.contains("Mid"));
        assert_eq!(rec.classification, Classification::Ideal);
    }

    #[test]
    fn test_next_ignored_when_prev_present() {
        // Far-away 09:30 booking right after the candidate does not matter.
        let schedule = vec![
            in_hood(at(9, 0), "Ana", "Pocitos"),
            in_hood(at(9, 30), "Far", "Carrasco"),
        ];
        let rec = ProximityAdvisor::default().evaluate(&schedule, &candidate("Buceo", at(9, 15)), &base());
        assert_eq!(rec.classification, Classification::Ideal);
        assert_eq!(rec.reason_label, ReasonLabel::IdealZone);
    }

    #[test]
    fn test_custom_thresholds() {
        let advisor = ProximityAdvisor::new(ProximityThresholds {
            ideal_max_km: 1.0,
            acceptable_max_km: 2.0,
            first_booking_ideal_max_km: 1.0,
            detour_max_km: 5.0,
        });
        let schedule = vec![in_hood(at(9, 0), "Ana", "Pocitos")];
        let rec = advisor.evaluate(&schedule, &candidate("Buceo", at(10, 0)), &base());
        assert_eq!(rec.classification, Classification::Acceptable);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let advisor = ProximityAdvisor::default();
        let schedule = vec![in_hood(at(9, 0), "Ana", "Pocitos")];
        let c = candidate("Centro", at(10, 0));
        let b = base();
        assert_eq!(advisor.evaluate(&schedule, &c, &b), advisor.evaluate(&schedule, &c, &b));
    }
}
