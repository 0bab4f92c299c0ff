//! Geospatial math for dispatch decisions
//!
//! Pure functions, no state. Distances are great-circle (haversine) over a
//! spherical Earth; travel estimates apply a banded congestion multiplier
//! so short urban hops are not scored as free-flowing highway runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// Latitude outside [-90, 90]
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]
    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl LatLon {
    /// Create a coordinate pair without validating bounds
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both components are inside valid WGS84 bounds
    pub fn validate(&self) -> Result<(), GeoError> {
        if !self.lat.is_finite() || self.lat < -90.0 || self.lat > 90.0 {
            return Err(GeoError::LatitudeOutOfRange(self.lat));
        }
        if !self.lon.is_finite() || self.lon < -180.0 || self.lon > 180.0 {
            return Err(GeoError::LongitudeOutOfRange(self.lon));
        }
        Ok(())
    }
}

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_km(a: &LatLon, b: &LatLon) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Initial bearing from `a` to `b` in degrees, normalized to [0, 360).
pub fn initial_bearing_deg(a: &LatLon, b: &LatLon) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Congestion multipliers applied to travel estimates by distance band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CongestionBands {
    /// Band boundary for dense urban trips (km)
    pub short_band_km: f64,
    /// Multiplier below `short_band_km`
    pub short_multiplier: f64,
    /// Band boundary for mid-range trips (km)
    pub mid_band_km: f64,
    /// Multiplier below `mid_band_km`
    pub mid_multiplier: f64,
    /// Multiplier for everything farther out
    pub long_multiplier: f64,
}

impl Default for CongestionBands {
    fn default() -> Self {
        Self {
            short_band_km: 5.0,
            short_multiplier: 1.5,
            mid_band_km: 20.0,
            mid_multiplier: 1.3,
            long_multiplier: 1.1,
        }
    }
}

impl CongestionBands {
    /// Multiplier for a given trip distance
    pub fn multiplier_for(&self, distance_km: f64) -> f64 {
        if distance_km < self.short_band_km {
            self.short_multiplier
        } else if distance_km < self.mid_band_km {
            self.mid_multiplier
        } else {
            self.long_multiplier
        }
    }
}

/// Estimated travel time in minutes at `speed_kmh`, congestion-adjusted.
///
/// Returns 0.0 for non-positive speeds rather than dividing by zero; callers
/// validate speed at configuration load.
pub fn eta_minutes(distance_km: f64, speed_kmh: f64, bands: &CongestionBands) -> f64 {
    if speed_kmh <= 0.0 {
        return 0.0;
    }
    let hours = distance_km / speed_kmh;
    hours * 60.0 * bands.multiplier_for(distance_km)
}
