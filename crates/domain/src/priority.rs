//! Priority derivation and escalation
//!
//! Base priority comes from the report category; a live hazard assessment
//! around the report location can escalate it one tier.

use crate::hazard::Severity;
use crate::types::IncidentCategory;
use serde::{Deserialize, Serialize};

/// Incident priority tiers, ordered low to critical
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Priority {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl Priority {
    /// Base priority for a report category
    pub fn for_category(category: IncidentCategory) -> Self {
        use IncidentCategory::*;
        match category {
            Medical | Fire | NaturalDisaster => Priority::Critical,
            Accident | Police => Priority::High,
            Other => Priority::Medium,
        }
    }

    /// One tier up, saturating at critical
    pub fn escalated(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High | Priority::Critical => Priority::Critical,
        }
    }

    /// Apply a hazard assessment: severities of high or above escalate
    pub fn with_hazard_assessment(self, assessment: Option<Severity>) -> Self {
        match assessment {
            Some(severity) if severity >= Severity::High => self.escalated(),
            _ => self,
        }
    }
}
