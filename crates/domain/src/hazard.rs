//! External hazard types and the severity assessment seam
//!
//! Disaster events come from external feeds (seismic, weather), get
//! deduplicated and severity-tagged, and feed back into incident priority
//! escalation through the [`HazardAssessor`] trait.

use crate::types::GeoPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hazard severity tiers, ordered low to critical
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Severity {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

/// Hazard event categories recognized by the classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Quake,
    Storm,
    Flood,
    Wildfire,
    Tsunami,
    Volcano,
    Cyclone,
    Other,
}

/// Named region a hazard applies to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HazardRegion {
    /// Stable region code from the source feed
    pub code: String,
    /// Human-readable region name
    pub name: String,
    /// Representative coordinates
    pub location: GeoPoint,
}

/// Composite key suppressing duplicate publications of the same hazard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub region_code: String,
    pub kind: HazardKind,
    pub title: String,
}

/// A deduplicated, severity-tagged external hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisasterEvent {
    /// Opaque unique key
    pub id: String,
    /// Which feed produced this event
    pub source_feed: String,
    /// Hazard category
    pub kind: HazardKind,
    /// Source-provided headline
    pub title: String,
    /// Classified severity
    pub severity: Severity,
    /// Affected region
    pub region: HazardRegion,
    /// First sighting (epoch ms)
    pub first_seen_at: u64,
    /// Most recent sighting (epoch ms)
    pub last_seen_at: u64,
}

impl DisasterEvent {
    /// Key under which repeat sightings are suppressed
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            region_code: self.region.code.clone(),
            kind: self.kind,
            title: self.title.clone(),
        }
    }
}

/// Failure of the hazard-severity lookup
///
/// The lifecycle manager degrades on this error: the report proceeds with
/// its category-derived base priority instead of failing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssessmentError {
    #[error("hazard assessment unavailable: {0}")]
    Unavailable(String),
}

/// Severity lookup around a point, consumed during incident creation
pub trait HazardAssessor: Send + Sync {
    /// Highest live hazard severity near `point`, or `None` when quiet
    fn severity_near(&self, point: &GeoPoint) -> Result<Option<Severity>, AssessmentError>;
}
