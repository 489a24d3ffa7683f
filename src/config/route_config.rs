//! Route Configuration - proximity thresholds, neighborhood table and storage paths
//!
//! Every constant the advisor depends on is a field here. Each struct
//! implements `Default` from `config::defaults`, so running without a config
//! file behaves exactly like the historical hardcoded version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "ROUTE_ADVISOR_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "route_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one operator deployment.
///
/// Load with `RouteConfig::load()` which searches:
/// 1. `$ROUTE_ADVISOR_CONFIG`
/// 2. `./route_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub operator: OperatorInfo,

    #[serde(default)]
    pub thresholds: ProximityThresholds,

    #[serde(default)]
    pub geo: GeoConfig,

    #[serde(default)]
    pub booking: BookingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl RouteConfig {
    /// Load configuration using the standard search order.
    ///
    /// Invalid files are logged and skipped, never fatal.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), operator = %config.operator.name, "Loaded route config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(operator = %config.operator.name, "Loaded route config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Route config saved");
        Ok(())
    }

    /// Validate thresholds, coordinates and slots for internal consistency.
    ///
    /// Rules:
    /// - Distance thresholds must be finite and > 0
    /// - The ideal band must end before the acceptable band
    /// - Jitter must be finite and >= 0
    /// - All coordinates must be valid WGS84 degrees
    /// - The base neighborhood must exist in the table
    /// - Standard slots must parse as `HH:MM`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let mut errors: Vec<String> = Vec::new();

        for (name, value) in [
            ("thresholds.ideal_max_km", t.ideal_max_km),
            ("thresholds.acceptable_max_km", t.acceptable_max_km),
            ("thresholds.first_booking_ideal_max_km", t.first_booking_ideal_max_km),
            ("thresholds.detour_max_km", t.detour_max_km),
        ] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} must be a finite number > 0 (got {value})"));
            }
        }

        if t.ideal_max_km >= t.acceptable_max_km {
            errors.push(format!(
                "thresholds.ideal_max_km ({:.1}) must be less than acceptable_max_km ({:.1})",
                t.ideal_max_km, t.acceptable_max_km
            ));
        }

        let g = &self.geo;
        if !g.jitter_degrees.is_finite() || g.jitter_degrees < 0.0 {
            errors.push(format!(
                "geo.jitter_degrees must be a finite number >= 0 (got {})",
                g.jitter_degrees
            ));
        }
        if let Some(e) = check_coordinate("geo.fallback", g.fallback_lat, g.fallback_lon) {
            errors.push(e);
        }
        if g.neighborhoods.is_empty() {
            errors.push("geo.neighborhoods must contain at least one entry".to_string());
        }
        for (name, [lat, lon]) in &g.neighborhoods {
            if let Some(e) = check_coordinate(&format!("geo.neighborhoods.{name}"), *lat, *lon) {
                errors.push(e);
            }
        }
        if !g.neighborhoods.contains_key(&self.operator.base_neighborhood) {
            errors.push(format!(
                "operator.base_neighborhood '{}' is not in geo.neighborhoods",
                self.operator.base_neighborhood
            ));
        }

        let b = &self.booking;
        for slot in &b.standard_slots {
            if crate::types::clock::parse_time(slot).is_err() {
                errors.push(format!("booking.standard_slots: '{slot}' is not a valid HH:MM time"));
            }
        }
        if b.near_window_hours == 0 {
            errors.push("booking.near_window_hours must be > 0".to_string());
        }

        if self.server.addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!("server.addr '{}' is not a valid socket address", self.server.addr));
        }

        let range_warnings = super::validation::validate_ranges(self);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

fn check_coordinate(name: &str, lat: f64, lon: f64) -> Option<String> {
    if !lat.is_finite() || !lon.is_finite() {
        return Some(format!("{name}: coordinates must be finite (got {lat}, {lon})"));
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Some(format!("{name}: ({lat}, {lon}) is outside valid lat/lon range"));
    }
    None
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Operator
// ============================================================================

/// Who is driving the route and where the day starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorInfo {
    /// Appears in logs only
    #[serde(default = "default_operator_name")]
    pub name: String,

    /// Neighborhood used as the day's starting point (must be in `geo.neighborhoods`)
    #[serde(default = "default_base_neighborhood")]
    pub base_neighborhood: String,
}

fn default_operator_name() -> String {
    "Operator".to_string()
}
fn default_base_neighborhood() -> String {
    defaults::BASE_NEIGHBORHOOD.to_string()
}

impl Default for OperatorInfo {
    fn default() -> Self {
        Self {
            name: default_operator_name(),
            base_neighborhood: default_base_neighborhood(),
        }
    }
}

// ============================================================================
// Proximity Thresholds
// ============================================================================

/// Distance bands used by `ProximityAdvisor` (km, compared after rounding to 0.1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityThresholds {
    /// Previous stop closer than this: ideal.
    #[serde(default = "default_ideal_max")]
    pub ideal_max_km: f64,

    /// Previous stop closer than this (and not ideal): acceptable. Otherwise risky.
    #[serde(default = "default_acceptable_max")]
    pub acceptable_max_km: f64,

    /// Empty day: base closer than this is ideal, otherwise acceptable.
    #[serde(default = "default_first_booking_ideal_max")]
    pub first_booking_ideal_max_km: f64,

    /// New first stop further than this from the next booking: risky.
    #[serde(default = "default_detour_max")]
    pub detour_max_km: f64,
}

fn default_ideal_max() -> f64 { defaults::IDEAL_MAX_KM }
fn default_acceptable_max() -> f64 { defaults::ACCEPTABLE_MAX_KM }
fn default_first_booking_ideal_max() -> f64 { defaults::FIRST_BOOKING_IDEAL_MAX_KM }
fn default_detour_max() -> f64 { defaults::DETOUR_MAX_KM }

impl Default for ProximityThresholds {
    fn default() -> Self {
        Self {
            ideal_max_km: default_ideal_max(),
            acceptable_max_km: default_acceptable_max(),
            first_booking_ideal_max_km: default_first_booking_ideal_max(),
            detour_max_km: default_detour_max(),
        }
    }
}

// ============================================================================
// Geo Lookup
// ============================================================================

/// Neighborhood table and jitter settings.
///
/// Supplying `[geo.neighborhoods]` replaces the built-in table entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Uniform noise added to each coordinate at booking time (± degrees).
    #[serde(default = "default_jitter")]
    pub jitter_degrees: f64,

    #[serde(default = "default_fallback_lat")]
    pub fallback_lat: f64,

    #[serde(default = "default_fallback_lon")]
    pub fallback_lon: f64,

    /// Neighborhood name -> `[lat, lon]`
    #[serde(default = "default_neighborhoods")]
    pub neighborhoods: BTreeMap<String, [f64; 2]>,
}

fn default_jitter() -> f64 { defaults::JITTER_DEGREES }
fn default_fallback_lat() -> f64 { defaults::FALLBACK_POINT[0] }
fn default_fallback_lon() -> f64 { defaults::FALLBACK_POINT[1] }

fn default_neighborhoods() -> BTreeMap<String, [f64; 2]> {
    defaults::NEIGHBORHOODS
        .iter()
        .map(|(name, point)| ((*name).to_string(), *point))
        .collect()
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            jitter_degrees: default_jitter(),
            fallback_lat: default_fallback_lat(),
            fallback_lon: default_fallback_lon(),
            neighborhoods: default_neighborhoods(),
        }
    }
}

// ============================================================================
// Booking
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Service written on confirmed bookings when none is given.
    #[serde(default = "default_service")]
    pub default_service: String,

    /// Status written on confirmed bookings.
    #[serde(default = "default_status")]
    pub default_status: String,

    /// Quick-pick `HH:MM` slots offered to callers.
    #[serde(default = "default_standard_slots")]
    pub standard_slots: Vec<String>,

    /// Occupancy timeline: appointments closer than this (hours) are flagged.
    #[serde(default = "default_near_window")]
    pub near_window_hours: u32,
}

fn default_service() -> String { defaults::DEFAULT_SERVICE.to_string() }
fn default_status() -> String { defaults::DEFAULT_STATUS.to_string() }
fn default_standard_slots() -> Vec<String> {
    defaults::STANDARD_SLOTS.iter().map(|s| (*s).to_string()).collect()
}
fn default_near_window() -> u32 { defaults::NEAR_WINDOW_HOURS }

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_service: default_service(),
            default_status: default_status(),
            standard_slots: default_standard_slots(),
            near_window_hours: default_near_window(),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Flat-file locations for the ledger and the client directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_agenda_file")]
    pub agenda_file: String,

    #[serde(default = "default_clients_file")]
    pub clients_file: String,
}

fn default_data_dir() -> PathBuf { PathBuf::from(defaults::DATA_DIR) }
fn default_agenda_file() -> String { defaults::AGENDA_FILE.to_string() }
fn default_clients_file() -> String { defaults::CLIENTS_FILE.to_string() }

impl StorageConfig {
    pub fn agenda_path(&self) -> PathBuf {
        self.data_dir.join(&self.agenda_file)
    }

    pub fn clients_path(&self) -> PathBuf {
        self.data_dir.join(&self.clients_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            agenda_file: default_agenda_file(),
            clients_file: default_clients_file(),
        }
    }
}

// ============================================================================
// Server Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP bind address. Overridden by `--addr`.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
