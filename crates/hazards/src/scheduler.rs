//! Per-feed polling loops
//!
//! Every configured feed runs on its own interval (seismic feeds poll
//! much faster than weather feeds). A fetch failure or timeout skips that
//! feed's cycle and never aborts the scheduler.

use crate::classify::classify_severity;
use crate::dedup::{DedupCache, Observation};
use crate::feed::HazardFeed;
use crate::index::HazardIndex;
use lifeline_broadcast::BroadcastRouter;
use lifeline_core::config::HazardConfig;
use lifeline_core::now_ms;
use lifeline_domain::{DispatchEvent, Severity, Topic};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A feed with its polling cadence
#[derive(Clone)]
pub struct FeedBinding {
    pub feed: Arc<dyn HazardFeed>,
    pub interval: Duration,
}

/// Drives the dedup/classify/publish pipeline for all bound feeds
pub struct FeedScheduler {
    feeds: Vec<FeedBinding>,
    router: Arc<BroadcastRouter>,
    index: Arc<HazardIndex>,
    cache: Mutex<DedupCache>,
    fetch_timeout: Duration,
    window_ms: u64,
}

impl FeedScheduler {
    pub fn new(
        router: Arc<BroadcastRouter>,
        index: Arc<HazardIndex>,
        config: &HazardConfig,
    ) -> Self {
        let window = Duration::from_secs(config.monitoring_window_secs);
        Self {
            feeds: Vec::new(),
            router,
            index,
            cache: Mutex::new(DedupCache::new(window)),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            window_ms: config.monitoring_window_secs * 1000,
        }
    }

    /// Bind a feed with its polling interval
    pub fn add_feed(&mut self, feed: Arc<dyn HazardFeed>, interval: Duration) {
        self.feeds.push(FeedBinding { feed, interval });
    }

    /// Spawn one polling loop per bound feed; returns immediately
    pub fn run(self: Arc<Self>) {
        for binding in self.feeds.clone() {
            let scheduler = Arc::clone(&self);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(binding.interval);
                loop {
                    ticker.tick().await;
                    scheduler.poll_feed_once(&binding).await;
                }
            });
        }
    }

    /// One polling cycle for one feed: fetch, classify, dedup, publish
    pub async fn poll_feed_once(&self, binding: &FeedBinding) {
        let batch = match tokio::time::timeout(self.fetch_timeout, binding.feed.poll()).await {
            Ok(Ok(batch)) => batch,
            Ok(Err(e)) => {
                warn!(feed = binding.feed.name(), "fetch failed, skipping cycle: {}", e);
                return;
            }
            Err(_) => {
                warn!(feed = binding.feed.name(), "fetch timed out, skipping cycle");
                return;
            }
        };

        let now = now_ms();
        let mut fresh = Vec::new();
        {
            let mut cache = self.cache.lock().await;
            cache.purge_expired(now);
            self.index.purge_expired(now, self.window_ms);

            for raw in &batch {
                let severity = classify_severity(raw);
                if severity < Severity::Medium {
                    debug!(
                        feed = binding.feed.name(),
                        title = %raw.title,
                        "below alerting floor, skipped"
                    );
                    continue;
                }
                // Repeats also refresh the index entry, or it expires
                // mid-hazard while the dedup cache keeps suppressing.
                match cache.observe(raw, severity, now) {
                    Observation::Fresh(event) => {
                        self.index.upsert(&event);
                        fresh.push(event);
                    }
                    Observation::Repeat(event) => self.index.upsert(&event),
                }
            }
        }

        for event in fresh {
            info!(
                feed = binding.feed.name(),
                title = %event.title,
                severity = ?event.severity,
                "disaster alert"
            );
            let alert = DispatchEvent::DisasterAlert { disaster: event };
            self.router.publish(&Topic::Agents, alert.clone()).await;
            self.router.publish(&Topic::AdminDashboards, alert).await;
        }
    }

    /// Number of live deduplicated events
    pub async fn live_event_count(&self) -> usize {
        self.cache.lock().await.len()
    }
}
