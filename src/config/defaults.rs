//! System-wide default constants.
//!
//! Grouped by subsystem. Config structs use these for their `Default` impls,
//! so an absent `route_config.toml` reproduces the historical behaviour.

// ============================================================================
// Geometry
// ============================================================================

/// Mean Earth radius used by the haversine distance (km).
///
/// Fixed, not configurable: distances must be reproducible across installs.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Maximum jitter applied to each coordinate at booking time (degrees).
///
/// 0.002° is roughly 200 m, enough to separate map markers in one neighborhood.
pub const JITTER_DEGREES: f64 = 0.002;

/// Coordinate used for neighborhoods missing from the lookup table.
pub const FALLBACK_POINT: [f64; 2] = [-34.90, -56.16];

/// Default base neighborhood.
pub const BASE_NEIGHBORHOOD: &str = "Malvín";

/// Built-in neighborhood table (Montevideo), `[lat, lon]`.
pub const NEIGHBORHOODS: &[(&str, [f64; 2])] = &[
    ("Pocitos", [-34.908, -56.145]),
    ("Carrasco", [-34.885, -56.058]),
    ("Centro", [-34.905, -56.190]),
    ("Malvín", [-34.895, -56.110]),
    ("Punta Carretas", [-34.920, -56.160]),
    ("Cordón", [-34.900, -56.170]),
    ("Prado", [-34.855, -56.200]),
    ("Buceo", [-34.900, -56.130]),
    ("Ciudad Vieja", [-34.907, -56.205]),
    ("Parque Batlle", [-34.895, -56.155]),
    ("Tres Cruces", [-34.892, -56.165]),
    ("Punta Gorda", [-34.890, -56.090]),
    ("La Blanqueada", [-34.880, -56.150]),
];

// ============================================================================
// Proximity Thresholds
// ============================================================================

/// Below this distance from the previous stop the candidate is ideal (km).
pub const IDEAL_MAX_KM: f64 = 4.0;

/// Below this distance from the previous stop the candidate is acceptable (km).
pub const ACCEPTABLE_MAX_KM: f64 = 8.0;

/// First booking of an empty day: ideal below this distance from base (km).
pub const FIRST_BOOKING_IDEAL_MAX_KM: f64 = 8.0;

/// A new first stop further than this from the next booking is a detour (km).
pub const DETOUR_MAX_KM: f64 = 10.0;

// ============================================================================
// Booking
// ============================================================================

pub const DEFAULT_SERVICE: &str = "Corte";

pub const DEFAULT_STATUS: &str = "Pendiente";

/// Quick-pick slots offered by the booking form.
pub const STANDARD_SLOTS: &[&str] = &["09:00", "11:00", "14:00", "17:00"];

/// Appointments within this many hours of the proposed time are flagged as near.
pub const NEAR_WINDOW_HOURS: u32 = 1;

// ============================================================================
// Storage / Server
// ============================================================================

pub const DATA_DIR: &str = "./data";

pub const AGENDA_FILE: &str = "agenda_db.csv";

pub const CLIENTS_FILE: &str = "clientes_db.csv";

pub const SERVER_ADDR: &str = "0.0.0.0:8080";
