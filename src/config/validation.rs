//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility range checks.
//!
//! The raw TOML is first walked as a `toml::Value` tree and compared against
//! the known field names, emitting "did you mean?" warnings. Serde
//! deserialization runs afterwards. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Children of this table are user-defined neighborhood names.
const FREE_FORM_TABLE: &str = "geo.neighborhoods";

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path for `RouteConfig`.
///
/// Must be kept in step with the structs in `route_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        "operator",
        "operator.name",
        "operator.base_neighborhood",
        "thresholds",
        "thresholds.ideal_max_km",
        "thresholds.acceptable_max_km",
        "thresholds.first_booking_ideal_max_km",
        "thresholds.detour_max_km",
        "geo",
        "geo.jitter_degrees",
        "geo.fallback_lat",
        "geo.fallback_lon",
        "geo.neighborhoods",
        "booking",
        "booking.default_service",
        "booking.default_status",
        "booking.standard_slots",
        "booking.near_window_hours",
        "storage",
        "storage.data_dir",
        "storage.agenda_file",
        "storage.clients_file",
        "server",
        "server.addr",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect dotted key paths from a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() && path != FREE_FORM_TABLE {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation
// ============================================================================

/// Warnings for every unknown key in a raw TOML document.
///
/// Syntax errors yield no warnings; serde reports them afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausibility Ranges
// ============================================================================

/// Suspicious-but-legal values. Hard errors live in `RouteConfig::validate`.
pub fn validate_ranges(config: &super::RouteConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // ~1 km of jitter starts to move markers into the next neighborhood
    if config.geo.jitter_degrees > 0.01 {
        warnings.push(ValidationWarning {
            field: "geo.jitter_degrees".to_string(),
            message: format!(
                "jitter_degrees = {} is large (> 0.01°, about 1 km)",
                config.geo.jitter_degrees
            ),
            suggestion: None,
        });
    }

    let t = &config.thresholds;
    for (field, value) in [
        ("thresholds.acceptable_max_km", t.acceptable_max_km),
        ("thresholds.first_booking_ideal_max_km", t.first_booking_ideal_max_km),
        ("thresholds.detour_max_km", t.detour_max_km),
    ] {
        if value > 100.0 {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!("{field} = {value:.1} km is outside a typical city range (<= 100 km)"),
                suggestion: None,
            });
        }
    }

    if t.detour_max_km < t.ideal_max_km {
        warnings.push(ValidationWarning {
            field: "thresholds.detour_max_km".to_string(),
            message: format!(
                "detour_max_km ({:.1}) is below ideal_max_km ({:.1}); most new first stops will be risky",
                t.detour_max_km, t.ideal_max_km
            ),
            suggestion: None,
        });
    }

    warnings
}
