//! Static severity classification
//!
//! Magnitude-bearing events use the seismic thresholds; everything else
//! falls back to a per-kind default. Events classifying below Medium fall
//! under the alerting floor and are skipped by the scheduler.

use crate::feed::RawHazardEvent;
use lifeline_domain::{HazardKind, Severity};

/// Classify a raw event's severity from the static lookup table
pub fn classify_severity(raw: &RawHazardEvent) -> Severity {
    if let Some(magnitude) = raw.magnitude {
        return if magnitude >= 7.0 {
            Severity::Critical
        } else if magnitude >= 6.0 {
            Severity::High
        } else if magnitude >= 4.5 {
            Severity::Medium
        } else {
            Severity::Low
        };
    }

    match raw.kind {
        HazardKind::Quake
        | HazardKind::Tsunami
        | HazardKind::Volcano
        | HazardKind::Cyclone => Severity::Critical,
        HazardKind::Storm | HazardKind::Flood | HazardKind::Wildfire => Severity::High,
        HazardKind::Other => Severity::Medium,
    }
}
