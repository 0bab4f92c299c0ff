//! Incident and agent status enumerations
//!
//! The incident transition table lives here and nowhere else. Call sites
//! ask `can_transition_to` instead of re-deriving legality ad hoc.

use serde::{Deserialize, Serialize};

/// Incident lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Reported, waiting for a responder
    Pending,
    /// A responder accepted the incident
    Assigned,
    /// The responder is traveling to the scene
    EnRoute,
    /// The responder is on scene
    Arrived,
    /// Resolved; terminal
    Completed,
    /// Withdrawn by the reporter; terminal
    Cancelled,
}

impl IncidentStatus {
    /// Terminal states are retained for audit and never leave
    pub fn is_terminal(&self) -> bool {
        matches!(self, IncidentStatus::Completed | IncidentStatus::Cancelled)
    }

    /// States in which an agent must be bound to the incident
    pub fn is_active_assignment(&self) -> bool {
        matches!(
            self,
            IncidentStatus::Assigned | IncidentStatus::EnRoute | IncidentStatus::Arrived
        )
    }

    /// Whether `next` is a legal single step from this state
    pub fn can_transition_to(&self, next: IncidentStatus) -> bool {
        use IncidentStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Assigned, EnRoute)
                | (EnRoute, Arrived)
                | (Arrived, Completed)
                | (Pending, Cancelled)
                | (Assigned, Cancelled)
        )
    }
}

/// Responder availability states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Free to take an incident
    Available,
    /// Bound to exactly one non-terminal incident; derived, never client-set
    Busy,
    /// Off duty
    Offline,
}
