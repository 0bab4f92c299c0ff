//! Operation-level error taxonomy
//!
//! Every mutating dispatch operation reports failures through this enum so
//! transport layers can map them uniformly (HTTP status codes, log fields).

use crate::status::IncidentStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// Malformed input; no state was changed
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown incident or agent id; no state was changed
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent operation won the race, or the record is already terminal
    #[error("conflict: {0}")]
    Conflict(String),

    /// The acting party is not entitled to mutate this record
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Requested status is not adjacent in the lifecycle table
    #[error("invalid transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Status the incident currently holds
        from: IncidentStatus,
        /// Status the caller asked for
        to: IncidentStatus,
    },

    /// A required collaborator (store, feed) is unreachable
    #[error("dependency failure: {0}")]
    Dependency(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
