//! Cross-crate integration tests for the Lifeline dispatch platform
//!
//! This suite exercises the public seams that unit tests cannot cover in
//! isolation:
//! - Full incident walks: report, assignment, field updates, completion
//! - Concurrent assignment races across the lifecycle/registry boundary
//! - The hazard pipeline end to end: feed, dedup, broadcast, escalation
//! - Proximity arrival flowing from the registry into the state machine

pub mod test_utils;

#[cfg(test)]
mod incident_flow_tests;

#[cfg(test)]
mod matching_tests;

#[cfg(test)]
mod hazard_pipeline_tests;
