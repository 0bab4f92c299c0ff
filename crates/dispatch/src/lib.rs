//! Incident dispatch for the Lifeline platform
//!
//! This crate owns the coordination core:
//! - [`AgentRegistry`]: responder locations, availability, reservations
//! - [`matcher`]: geospatial candidate ranking (pure reads)
//! - [`LifecycleManager`]: the incident state machine and its side effects
//! - [`IncidentStore`]: the persistence seam
//! - [`NotificationGateway`]: the push/SMS side channel seam
//!
//! # Flow
//!
//! A report enters through `LifecycleManager::create`, which validates it,
//! derives priority (escalated by live hazard assessments), persists the
//! pending incident, and offers it to ranked candidates. `assign` is the
//! critical section: an atomic "still pending, agent still available"
//! check-and-set that makes double-booking impossible. Status updates walk
//! the centralized transition table, and every mutation fans out through
//! the broadcast router after persistence.

pub mod lifecycle;
pub mod matcher;
pub mod notify;
pub mod registry;
pub mod store;

pub use lifecycle::{AssignmentOutcome, CreatedAlert, LifecycleManager};
pub use matcher::{rank_candidates, RankedCandidate};
pub use notify::{LogNotifier, NotificationGateway, NotifyError};
pub use registry::{ActiveAssignment, AgentRegistry, ArrivalSignal};
pub use store::{IncidentStore, MemoryIncidentStore, StoreError};
