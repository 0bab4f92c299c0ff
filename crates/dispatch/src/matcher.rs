//! Geospatial candidate ranking
//!
//! Pure reads over a registry snapshot: filter by availability and
//! specialization, discard beyond radius, rank by distance with rating as
//! the tie-break. The matcher never mutates agent or incident state; the
//! lifecycle manager performs the actual assignment under its own
//! concurrency control.

use lifeline_core::config::MatchingConfig;
use lifeline_core::geo::{eta_minutes, haversine_km};
use lifeline_domain::events::CandidateSummary;
use lifeline_domain::{Agent, GeoPoint, IncidentCategory};
use serde::Serialize;
use std::cmp::Ordering;

/// A candidate agent with its distance and travel estimate
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub agent: Agent,
    /// Great-circle distance to the incident (km)
    pub distance_km: f64,
    /// Congestion-adjusted travel estimate (minutes)
    pub eta_minutes: f64,
}

impl RankedCandidate {
    /// Compact form carried inside broadcast events
    pub fn summary(&self) -> CandidateSummary {
        CandidateSummary {
            agent_id: self.agent.id.clone(),
            distance_km: self.distance_km,
            eta_minutes: self.eta_minutes,
        }
    }
}

/// Rank eligible agents for an incident.
///
/// Specialized categories keep agents whose specialization matches or is
/// general; an available agent with an unrelated specialization is excluded
/// even when closer. Results are sorted by ascending distance, ties broken
/// by descending rating, truncated to `limit`.
pub fn rank_candidates(
    agents: &[Agent],
    location: &GeoPoint,
    category: IncidentCategory,
    radius_km: f64,
    limit: usize,
    matching: &MatchingConfig,
) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = agents
        .iter()
        .filter(|agent| agent.is_available())
        .filter(|agent| agent.specialization.covers(category))
        .filter_map(|agent| {
            let distance_km = haversine_km(&agent.location.as_latlon(), &location.as_latlon());
            (distance_km <= radius_km).then(|| RankedCandidate {
                agent: agent.clone(),
                distance_km,
                eta_minutes: eta_minutes(
                    distance_km,
                    matching.assumed_speed_kmh,
                    &matching.congestion,
                ),
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.agent
                    .rating
                    .partial_cmp(&a.agent.rating)
                    .unwrap_or(Ordering::Equal)
            })
    });
    candidates.truncate(limit);
    candidates
}
