//! Advisor output: classification, reason and the distance behind it

use serde::{Deserialize, Serialize};

/// Route-fit classification for a candidate booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Ideal = 0,
    Acceptable = 1,
    Risky = 2,
}

impl Classification {
    /// Traffic-light colour used by dashboards.
    pub const fn color(self) -> &'static str {
        match self {
            Classification::Ideal => "green",
            Classification::Acceptable => "orange",
            Classification::Risky => "red",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Ideal => write!(f, "IDEAL"),
            Classification::Acceptable => write!(f, "ACCEPTABLE"),
            Classification::Risky => write!(f, "RISKY"),
        }
    }
}

/// Which rule produced the classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReasonLabel {
    /// Empty day, measured from base
    #[serde(rename = "First Booking")]
    FirstBooking,
    /// Candidate becomes the first stop and stays close to the next one
    #[serde(rename = "Good Start")]
    GoodStart,
    /// Candidate becomes the first stop but is far from the next one
    #[serde(rename = "Large Detour")]
    LargeDetour,
    #[serde(rename = "Ideal Zone")]
    IdealZone,
    #[serde(rename = "Acceptable Distance")]
    AcceptableDistance,
    #[serde(rename = "Logistic Jump")]
    LogisticJump,
}

impl ReasonLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReasonLabel::FirstBooking => "First Booking",
            ReasonLabel::GoodStart => "Good Start",
            ReasonLabel::LargeDetour => "Large Detour",
            ReasonLabel::IdealZone => "Ideal Zone",
            ReasonLabel::AcceptableDistance => "Acceptable Distance",
            ReasonLabel::LogisticJump => "Logistic Jump",
        }
    }
}

impl std::fmt::Display for ReasonLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The point `distance_km` was measured from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePoint {
    Base,
    PreviousAppointment,
    /// Only produced by the Large Detour rule
    NextAppointment,
}

/// Result of `ProximityAdvisor::evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub classification: Classification,
    pub reason_label: ReasonLabel,
    /// Haversine distance rounded to 0.1 km
    pub distance_km: f64,
    pub reference_point: ReferencePoint,
    /// Operator-facing sentence
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_ordering() {
        assert!(Classification::Ideal < Classification::Acceptable);
        assert!(Classification::Acceptable < Classification::Risky);
    }

    #[test]
    fn test_reason_label_serializes_as_text() {
        let json = serde_json::to_string(&ReasonLabel::LogisticJump).unwrap();
        assert_eq!(json, "\"Logistic Jump\"");
        let back: ReasonLabel = serde_json::from_str("\"Good Start\"").unwrap();
        assert_eq!(back, ReasonLabel::GoodStart);
    }

    #[test]
    fn test_colors() {
        assert_eq!(Classification::Ideal.color(), "green");
        assert_eq!(Classification::Acceptable.color(), "orange");
        assert_eq!(Classification::Risky.color(), "red");
    }
}
