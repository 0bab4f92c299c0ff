//! Domain model for the Lifeline dispatch core
//!
//! This crate contains pure domain logic with no I/O dependencies:
//! - Incident, agent, and disaster-event entities
//! - Closed status enumerations with the centralized transition table
//! - Priority derivation and escalation rules
//! - The broadcast topic and event catalog
//! - The operation-level error taxonomy

pub mod error;
pub mod events;
pub mod hazard;
pub mod priority;
pub mod status;
pub mod types;

pub use error::{DispatchError, Result};
pub use events::{DispatchEvent, Topic};
pub use hazard::{
    AssessmentError, DedupKey, DisasterEvent, HazardAssessor, HazardKind, HazardRegion, Severity,
};
pub use priority::Priority;
pub use status::{AgentStatus, IncidentStatus};
pub use types::{Agent, GeoPoint, Incident, IncidentCategory, IncidentNote, Specialization};
