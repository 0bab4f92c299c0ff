//! Shared infrastructure for the Lifeline dispatch platform
//!
//! This crate contains the pieces every other Lifeline crate leans on:
//! - Geospatial math (great-circle distance, bearing, travel estimates)
//! - Typed configuration with TOML loading
//! - Structured logging initialization
//! - Timestamp helpers

pub mod config;
pub mod geo;
pub mod logging;
pub mod time;

pub use config::{ArrivalConfig, DispatchConfig, HazardConfig, MatchingConfig};
pub use geo::{haversine_km, initial_bearing_deg, CongestionBands, GeoError, LatLon};
pub use time::now_ms;
