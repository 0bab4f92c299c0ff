//! Broadcast topics and the outbound event catalog
//!
//! Every state change the core fans out is one of these events, addressed
//! to one of these topics. Transport layers serialize the tagged enum
//! as-is; there is no per-handler payload shaping.

use crate::hazard::DisasterEvent;
use crate::status::IncidentStatus;
use crate::types::{Agent, Incident};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named publish/subscribe channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// All on-duty agent connections
    Agents,
    /// A single reporter's connections
    User(String),
    /// A single agent's connections
    Agent(String),
    /// Observer dashboards
    AdminDashboards,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Agents => write!(f, "agents"),
            Topic::User(id) => write!(f, "user-{}", id),
            Topic::Agent(id) => write!(f, "agent-{}", id),
            Topic::AdminDashboards => write!(f, "admin-dashboards"),
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "agents" {
            return Ok(Topic::Agents);
        }
        if s == "admin-dashboards" {
            return Ok(Topic::AdminDashboards);
        }
        if let Some(id) = s.strip_prefix("user-") {
            if !id.is_empty() {
                return Ok(Topic::User(id.to_string()));
            }
        }
        if let Some(id) = s.strip_prefix("agent-") {
            if !id.is_empty() {
                return Ok(Topic::Agent(id.to_string()));
            }
        }
        Err(format!("unknown topic: {}", s))
    }
}

/// Ranked candidate summary carried inside `alert-created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    /// Candidate agent id
    pub agent_id: String,
    /// Great-circle distance to the incident (km)
    pub distance_km: f64,
    /// Congestion-adjusted travel estimate (minutes)
    pub eta_minutes: f64,
}

/// Events emitted by the dispatch core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum DispatchEvent {
    /// A new incident exists; offered to nearby candidates
    AlertCreated {
        incident: Incident,
        candidates: Vec<CandidateSummary>,
    },
    /// A responder accepted the incident
    AlertAssigned {
        incident: Incident,
        agent: Agent,
        eta_minutes: f64,
    },
    /// Retraction: the incident is taken, other candidates stand down
    SosAssigned {
        alert_id: String,
        agent_id: String,
    },
    /// The incident moved through its lifecycle
    StatusUpdate {
        alert_id: String,
        status: IncidentStatus,
        timestamp: u64,
    },
    /// The reporter withdrew the incident
    AlertCancelled {
        alert_id: String,
    },
    /// A fresh external hazard cleared deduplication
    DisasterAlert {
        disaster: DisasterEvent,
    },
}

impl DispatchEvent {
    /// Wire name of this event, matching the serde tag
    pub fn name(&self) -> &'static str {
        match self {
            DispatchEvent::AlertCreated { .. } => "alert-created",
            DispatchEvent::AlertAssigned { .. } => "alert-assigned",
            DispatchEvent::SosAssigned { .. } => "sos-assigned",
            DispatchEvent::StatusUpdate { .. } => "status-update",
            DispatchEvent::AlertCancelled { .. } => "alert-cancelled",
            DispatchEvent::DisasterAlert { .. } => "disaster-alert",
        }
    }
}
