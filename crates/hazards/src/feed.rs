//! External hazard feed seam
//!
//! Feeds are pull-based collaborators: each poll returns a batch of raw
//! events. Concrete implementations wrap seismic and weather provider
//! APIs; the scheduler only sees this trait.

use futures_util::future::BoxFuture;
use lifeline_domain::HazardKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feed fetch failures; logged and skipped for the cycle, never fatal
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedError {
    /// Provider unreachable or returned a transport error
    #[error("feed connection error: {0}")]
    Connection(String),

    /// Provider payload could not be decoded
    #[error("feed payload error: {0}")]
    Payload(String),
}

/// One raw event as reported by a provider, before dedup/classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHazardEvent {
    /// Feed that produced the event
    pub source_feed: String,
    /// Hazard category
    pub kind: HazardKind,
    /// Provider headline; part of the dedup key
    pub title: String,
    /// Stable region code; part of the dedup key
    pub region_code: String,
    /// Human-readable region name
    pub region_name: String,
    /// Representative latitude
    pub lat: f64,
    /// Representative longitude
    pub lon: f64,
    /// Magnitude where the provider reports one (quakes)
    pub magnitude: Option<f64>,
}

/// A pull-based external hazard feed
pub trait HazardFeed: Send + Sync {
    /// Feed name for logging and `source_feed` attribution
    fn name(&self) -> &str;

    /// Fetch the current batch of raw events
    fn poll(&self) -> BoxFuture<'_, Result<Vec<RawHazardEvent>, FeedError>>;
}
