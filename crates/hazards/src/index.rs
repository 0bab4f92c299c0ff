//! Live hazard index backing priority escalation
//!
//! A read-optimized view of live disaster events that answers "what is the
//! worst hazard near this point right now" for the lifecycle manager's
//! create path. The scheduler refreshes it alongside the dedup cache.

use lifeline_core::haversine_km;
use lifeline_domain::hazard::AssessmentError;
use lifeline_domain::{DedupKey, DisasterEvent, GeoPoint, HazardAssessor, Severity};
use std::collections::HashMap;
use std::sync::RwLock;

struct IndexEntry {
    location: GeoPoint,
    severity: Severity,
    last_seen_at: u64,
}

/// Thread-safe index of live hazards by dedup key
pub struct HazardIndex {
    entries: RwLock<HashMap<DedupKey, IndexEntry>>,
    radius_km: f64,
}

impl HazardIndex {
    pub fn new(radius_km: f64) -> Self {
        Self { entries: RwLock::new(HashMap::new()), radius_km }
    }

    /// Insert or refresh a live event
    pub fn upsert(&self, event: &DisasterEvent) {
        self.entries.write().expect("hazard index lock poisoned").insert(
            event.dedup_key(),
            IndexEntry {
                location: event.region.location,
                severity: event.severity,
                last_seen_at: event.last_seen_at,
            },
        );
    }

    /// Drop entries unseen for longer than `window_ms`
    pub fn purge_expired(&self, now: u64, window_ms: u64) {
        self.entries
            .write()
            .expect("hazard index lock poisoned")
            .retain(|_, entry| now.saturating_sub(entry.last_seen_at) <= window_ms);
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("hazard index lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HazardAssessor for HazardIndex {
    fn severity_near(&self, point: &GeoPoint) -> Result<Option<Severity>, AssessmentError> {
        let entries = self.entries.read().expect("hazard index lock poisoned");
        Ok(entries
            .values()
            .filter(|entry| {
                haversine_km(&entry.location.as_latlon(), &point.as_latlon()) <= self.radius_km
            })
            .map(|entry| entry.severity)
            .max())
    }
}
