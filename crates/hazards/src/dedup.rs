//! Keyed suppression of repeat hazard sightings
//!
//! A live event exists per (region code, kind, title) within the
//! monitoring window. Repeat sightings bump `last_seen_at` and are not
//! republished. Entries unseen past the window are purged, so a
//! long-running hazard that goes quiet and returns is announced again.

use crate::feed::RawHazardEvent;
use lifeline_domain::{DedupKey, DisasterEvent, GeoPoint, HazardRegion, Severity};
use std::collections::HashMap;
use std::time::Duration;

/// Result of observing one raw event
#[derive(Debug, Clone)]
pub enum Observation {
    /// First sighting within the window; publish it
    Fresh(DisasterEvent),
    /// Already live, `last_seen_at` refreshed; suppressed from publication
    Repeat(DisasterEvent),
}

impl Observation {
    /// The live event behind this sighting, fresh or not
    pub fn event(&self) -> &DisasterEvent {
        match self {
            Observation::Fresh(event) | Observation::Repeat(event) => event,
        }
    }
}

/// Live disaster events keyed for dedup
pub struct DedupCache {
    entries: HashMap<DedupKey, DisasterEvent>,
    window: Duration,
}

impl DedupCache {
    pub fn new(window: Duration) -> Self {
        Self { entries: HashMap::new(), window }
    }

    /// Record a sighting, returning whether it is fresh or a repeat
    pub fn observe(&mut self, raw: &RawHazardEvent, severity: Severity, now: u64) -> Observation {
        let key = DedupKey {
            region_code: raw.region_code.clone(),
            kind: raw.kind,
            title: raw.title.clone(),
        };

        if let Some(live) = self.entries.get_mut(&key) {
            live.last_seen_at = now;
            return Observation::Repeat(live.clone());
        }

        let event = DisasterEvent {
            id: uuid::Uuid::new_v4().to_string(),
            source_feed: raw.source_feed.clone(),
            kind: raw.kind,
            title: raw.title.clone(),
            severity,
            region: HazardRegion {
                code: raw.region_code.clone(),
                name: raw.region_name.clone(),
                location: GeoPoint::new(raw.lat, raw.lon),
            },
            first_seen_at: now,
            last_seen_at: now,
        };
        self.entries.insert(key, event.clone());
        Observation::Fresh(event)
    }

    /// Drop entries unseen for longer than the monitoring window
    pub fn purge_expired(&mut self, now: u64) -> usize {
        let window_ms = self.window.as_millis() as u64;
        let before = self.entries.len();
        self.entries
            .retain(|_, event| now.saturating_sub(event.last_seen_at) <= window_ms);
        before - self.entries.len()
    }

    /// Number of live events
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of live events (dashboards, index refresh)
    pub fn live_events(&self) -> Vec<DisasterEvent> {
        self.entries.values().cloned().collect()
    }
}
