//! Config Validation Tests
//!
//! Covers unknown-key detection with "did you mean?" suggestions, hard
//! validation errors, plausibility warnings and TOML round-trips.

use route_advisor::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use route_advisor::config::{ConfigError, RouteConfig};

fn validation_errors(config: &RouteConfig) -> Vec<String> {
    match config.validate() {
        Err(ConfigError::Validation(errors)) => errors,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => Vec::new(),
    }
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_threshold_warns_with_suggestion() {
    let toml_str = r#"
[thresholds]
ideal_max_kms = 3.5
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "thresholds.ideal_max_kms");
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("thresholds.ideal_max_km")
    );
}

#[test]
fn typo_in_operator_section_warns() {
    let toml_str = r#"
[operator]
naem = "Lucía"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("operator.name"));
}

#[test]
fn custom_neighborhoods_are_not_flagged() {
    let toml_str = r#"
[operator]
base_neighborhood = "Sayago"

[geo.neighborhoods]
Sayago = [-34.833, -56.212]
"Villa Española" = [-34.862, -56.146]
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
}

#[test]
fn unknown_section_warns() {
    let toml_str = r#"
[vehicle]
fuel = "diesel"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().any(|w| w.field == "vehicle"));
    assert!(warnings.iter().any(|w| w.field == "vehicle.fuel"));
}

#[test]
fn empty_toml_produces_zero_warnings() {
    assert!(validate_unknown_keys("").is_empty());
}

#[test]
fn suggest_correction_returns_none_for_garbage() {
    let known = known_config_keys();
    assert!(suggest_correction("zzzzzzzzzzzzzzzz", &known).is_none());
}

#[test]
fn known_keys_cover_every_section() {
    let known = known_config_keys();
    for section in ["operator", "thresholds", "geo", "booking", "storage", "server"] {
        assert!(known.contains(section), "missing section {section}");
    }
}

// ============================================================================
// Hard Validation
// ============================================================================

#[test]
fn all_defaults_pass_validation() {
    let config = RouteConfig::default();
    assert!(config.validate().is_ok());
    assert!(validate_ranges(&config).is_empty());
}

#[test]
fn inverted_bands_are_rejected() {
    let mut config = RouteConfig::default();
    config.thresholds.ideal_max_km = 9.0;
    config.thresholds.acceptable_max_km = 8.0;
    let errors = validation_errors(&config);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("ideal_max_km"));
}

#[test]
fn non_positive_threshold_is_rejected() {
    let mut config = RouteConfig::default();
    config.thresholds.detour_max_km = 0.0;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("detour_max_km")));

    config.thresholds.detour_max_km = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn negative_jitter_is_rejected() {
    let mut config = RouteConfig::default();
    config.geo.jitter_degrees = -0.001;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("jitter_degrees")));
}

#[test]
fn base_outside_table_is_rejected() {
    let mut config = RouteConfig::default();
    config.operator.base_neighborhood = "Atlantis".to_string();
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("Atlantis")));
}

#[test]
fn malformed_slot_is_rejected() {
    let mut config = RouteConfig::default();
    config.booking.standard_slots.push("noon".to_string());
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("'noon'")));
}

#[test]
fn every_problem_is_reported_at_once() {
    let mut config = RouteConfig::default();
    config.geo.jitter_degrees = -1.0;
    config.booking.near_window_hours = 0;
    config.server.addr = "not an address".to_string();
    assert_eq!(validation_errors(&config).len(), 3);
}

// ============================================================================
// Plausibility Warnings
// ============================================================================

#[test]
fn large_jitter_warns_but_validates() {
    let mut config = RouteConfig::default();
    config.geo.jitter_degrees = 0.05;
    assert!(config.validate().is_ok());
    let warnings = validate_ranges(&config);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "geo.jitter_degrees");
}

// ============================================================================
// TOML Round-trip
// ============================================================================

#[test]
fn partial_toml_fills_defaults() {
    let config = RouteConfig::from_toml_str(
        r#"
[operator]
name = "Lucía"

[thresholds]
ideal_max_km = 3.0
"#,
    )
    .unwrap();
    assert_eq!(config.operator.name, "Lucía");
    assert_eq!(config.operator.base_neighborhood, "Malvín");
    assert_eq!(config.thresholds.ideal_max_km, 3.0);
    assert_eq!(config.thresholds.acceptable_max_km, 8.0);
    assert_eq!(config.geo.neighborhoods.len(), 13);
    assert_eq!(config.booking.standard_slots, vec!["09:00", "11:00", "14:00", "17:00"]);
}

#[test]
fn config_roundtrip_preserves_values() {
    let mut config = RouteConfig::default();
    config.operator.name = "Lucía".to_string();
    config.thresholds.detour_max_km = 12.5;
    config.booking.default_service = "Color".to_string();

    let toml_str = config.to_toml().unwrap();
    let back = RouteConfig::from_toml_str(&toml_str).unwrap();
    assert_eq!(back.operator.name, "Lucía");
    assert_eq!(back.thresholds, config.thresholds);
    assert_eq!(back.booking.default_service, "Color");
    assert_eq!(back.geo.neighborhoods, config.geo.neighborhoods);
}

#[test]
fn invalid_file_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("route_config.toml");
    std::fs::write(&path, "[thresholds]\nideal_max_km = 10.0\n").unwrap();
    assert!(matches!(
        RouteConfig::load_from_file(&path),
        Err(ConfigError::Validation(_))
    ));
}
