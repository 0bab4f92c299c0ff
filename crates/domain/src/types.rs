//! Incident and agent entities
//!
//! The canonical record shapes shared by the registry, the lifecycle
//! manager, the matcher, and the transport layers.

use crate::priority::Priority;
use crate::status::{AgentStatus, IncidentStatus};
use lifeline_core::geo::LatLon;
use serde::{Deserialize, Serialize};

/// Geographic point attached to a report or a responder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Reported fix accuracy in meters (optional)
    pub accuracy_m: Option<f32>,
}

impl GeoPoint {
    /// Point without an accuracy estimate
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, accuracy_m: None }
    }

    /// View as a bare coordinate pair for geo math
    pub fn as_latlon(&self) -> LatLon {
        LatLon { lat: self.lat, lon: self.lon }
    }
}

/// Report categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentCategory {
    Medical,
    Fire,
    Police,
    NaturalDisaster,
    Accident,
    Other,
}

impl IncidentCategory {
    /// Specialization a responder must carry for this category, if any.
    ///
    /// Accident and Other reports accept any available responder.
    pub fn required_specialization(&self) -> Option<Specialization> {
        match self {
            IncidentCategory::Medical => Some(Specialization::Medical),
            IncidentCategory::Fire => Some(Specialization::Fire),
            IncidentCategory::Police => Some(Specialization::Police),
            IncidentCategory::NaturalDisaster => Some(Specialization::NaturalDisaster),
            IncidentCategory::Accident | IncidentCategory::Other => None,
        }
    }
}

/// Responder specializations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Specialization {
    Medical,
    Fire,
    Police,
    NaturalDisaster,
    /// Eligible for every category
    General,
}

impl Specialization {
    /// Whether this specialization satisfies a category requirement
    pub fn covers(&self, category: IncidentCategory) -> bool {
        match category.required_specialization() {
            None => true,
            Some(required) => *self == required || *self == Specialization::General,
        }
    }
}

/// A timestamped note attached to an incident
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentNote {
    /// Who wrote the note
    pub author_id: String,
    /// Free-form text
    pub text: String,
    /// Epoch milliseconds
    pub timestamp: u64,
}

/// A tracked emergency report with a lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Opaque unique key
    pub id: String,
    /// Who filed the report
    pub reporter_id: String,
    /// Where the emergency is
    pub location: GeoPoint,
    /// Report category
    pub category: IncidentCategory,
    /// Current priority tier
    pub priority: Priority,
    /// Lifecycle state
    pub status: IncidentStatus,
    /// Responder bound to this incident, set only while the assignment is active
    pub assigned_agent_id: Option<String>,
    /// Reporter-supplied description
    pub description: String,
    /// Epoch milliseconds
    pub created_at: u64,
    /// Stamped when a responder accepts
    pub assigned_at: Option<u64>,
    /// Stamped when the responder reaches the scene
    pub arrived_at: Option<u64>,
    /// Stamped on completion
    pub completed_at: Option<u64>,
    /// Stamped on cancellation
    pub cancelled_at: Option<u64>,
    /// Ordered annotation trail
    pub notes: Vec<IncidentNote>,
}

impl Incident {
    /// Create a fresh pending incident
    pub fn new(
        reporter_id: impl Into<String>,
        location: GeoPoint,
        category: IncidentCategory,
        priority: Priority,
        description: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reporter_id: reporter_id.into(),
            location,
            category,
            priority,
            status: IncidentStatus::Pending,
            assigned_agent_id: None,
            description: description.into(),
            created_at,
            assigned_at: None,
            arrived_at: None,
            completed_at: None,
            cancelled_at: None,
            notes: Vec::new(),
        }
    }

    /// Append a note to the annotation trail
    pub fn add_note(&mut self, author_id: impl Into<String>, text: impl Into<String>, now: u64) {
        self.notes.push(IncidentNote {
            author_id: author_id.into(),
            text: text.into(),
            timestamp: now,
        });
    }

    /// Structural invariant: an agent is bound iff the assignment is active
    pub fn invariants_hold(&self) -> bool {
        self.assigned_agent_id.is_some() == self.status.is_active_assignment()
    }
}

/// A field responder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Opaque unique key
    pub id: String,
    /// Last known position
    pub location: GeoPoint,
    /// When the position was last refreshed (epoch ms)
    pub location_updated_at: u64,
    /// Availability state
    pub status: AgentStatus,
    /// What this responder is trained for
    pub specialization: Specialization,
    /// Aggregate service rating
    pub rating: f32,
}

impl Agent {
    pub fn is_available(&self) -> bool {
        self.status == AgentStatus::Available
    }
}
