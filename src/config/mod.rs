//! Route Configuration Module
//!
//! Operator-tunable settings loaded from TOML: proximity thresholds, the
//! neighborhood table, booking defaults, storage paths and the HTTP address.
//!
//! ## Loading Order
//!
//! 1. `ROUTE_ADVISOR_CONFIG` environment variable (path to TOML file)
//! 2. `route_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Unlike a process-wide singleton, the loaded `RouteConfig` is passed
//! explicitly to the components that need it (`GeoLookup::from_config`,
//! `ProximityAdvisor::new`, `RoutePlanner::from_config`).

mod route_config;
pub mod defaults;
pub mod validation;

pub use route_config::*;
