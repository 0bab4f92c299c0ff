//! Configuration management for the Lifeline dispatch core.

use crate::geo::CongestionBands;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub matching: MatchingConfig,
    pub arrival: ArrivalConfig,
    pub hazards: HazardConfig,
}

/// Candidate search and travel-estimate tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Default search radius when a caller does not supply one (km)
    pub default_radius_km: f64,
    /// Default result limit for ranked candidate queries
    pub default_limit: usize,
    /// How many candidates a freshly created alert is offered to
    pub candidate_fanout: usize,
    /// Assumed responder travel speed (km/h)
    pub assumed_speed_kmh: f64,
    /// Congestion multipliers by distance band
    pub congestion: CongestionBands,
}

/// Proximity-based arrival detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivalConfig {
    /// Distance at which a busy agent is considered on scene (meters)
    pub threshold_m: f64,
}

/// Hazard feed polling and deduplication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardConfig {
    /// Poll cadence for weather-class feeds (seconds)
    pub weather_poll_secs: u64,
    /// Poll cadence for seismic-class feeds (seconds)
    pub seismic_poll_secs: u64,
    /// Per-fetch timeout; a slow feed skips the cycle (seconds)
    pub fetch_timeout_secs: u64,
    /// Dedup monitoring window; entries unseen this long are purged (seconds)
    pub monitoring_window_secs: u64,
    /// Radius used when assessing hazard severity around a report (km)
    pub assessment_radius_km: f64,
}

impl DispatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            matching: MatchingConfig {
                default_radius_km: 50.0,
                default_limit: 10,
                candidate_fanout: 3,
                assumed_speed_kmh: 40.0,
                congestion: CongestionBands::default(),
            },
            arrival: ArrivalConfig { threshold_m: 50.0 },
            hazards: HazardConfig {
                weather_poll_secs: 900,
                seismic_poll_secs: 60,
                fetch_timeout_secs: 5,
                monitoring_window_secs: 6 * 3600,
                assessment_radius_km: 100.0,
            },
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
