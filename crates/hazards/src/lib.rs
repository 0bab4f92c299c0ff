//! Disaster feed deduplication and classification
//!
//! Ingests periodic batches of raw hazard reports from external feeds,
//! assigns severity from a static lookup, suppresses repeat sightings
//! within a monitoring window, and publishes fresh events through the
//! broadcast router. The live-event index doubles as the hazard assessor
//! used for incident priority escalation.

pub mod classify;
pub mod dedup;
pub mod feed;
pub mod index;
pub mod scheduler;

pub use classify::classify_severity;
pub use dedup::{DedupCache, Observation};
pub use feed::{FeedError, HazardFeed, RawHazardEvent};
pub use index::HazardIndex;
pub use scheduler::{FeedBinding, FeedScheduler};
