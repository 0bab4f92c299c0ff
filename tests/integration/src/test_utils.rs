//! Shared fixtures for the integration suite

use futures_util::future::BoxFuture;
use lifeline_broadcast::BroadcastRouter;
use lifeline_core::config::DispatchConfig;
use lifeline_dispatch::{
    AgentRegistry, ArrivalSignal, LifecycleManager, LogNotifier, MemoryIncidentStore,
};
use lifeline_domain::{Agent, AgentStatus, GeoPoint, HazardAssessor, HazardKind, Specialization};
use lifeline_hazards::{FeedError, HazardFeed, HazardIndex, RawHazardEvent};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Johannesburg CBD; the fixture origin for geospatial scenarios
pub const ORIGIN: (f64, f64) = (-26.2041, 28.0473);

/// A point roughly `km` kilometers north of `lat`
pub fn offset_north_km(lat: f64, km: f64) -> f64 {
    lat + km / 111.0
}

/// Fully wired in-process dispatch stack
pub struct DispatchHarness {
    pub lifecycle: Arc<LifecycleManager>,
    pub registry: Arc<AgentRegistry>,
    pub router: Arc<BroadcastRouter>,
    pub index: Arc<HazardIndex>,
    pub arrival_rx: Option<mpsc::UnboundedReceiver<ArrivalSignal>>,
    pub config: DispatchConfig,
}

impl DispatchHarness {
    /// Build the full stack the way the gateway binary wires it: memory
    /// store, registry with the arrival channel attached, hazard index as
    /// the lifecycle's assessor.
    pub fn new() -> Self {
        let config = DispatchConfig::default_config();
        let registry = Arc::new(AgentRegistry::new(config.arrival.threshold_m));
        let router = Arc::new(BroadcastRouter::new());
        let index = Arc::new(HazardIndex::new(config.hazards.assessment_radius_km));

        let (arrival_tx, arrival_rx) = mpsc::unbounded_channel();
        registry.set_arrival_channel(arrival_tx);

        let lifecycle = Arc::new(
            LifecycleManager::new(
                Arc::new(MemoryIncidentStore::new()),
                Arc::clone(&registry),
                Arc::clone(&router),
                Arc::new(LogNotifier),
                config.clone(),
            )
            .with_assessor(Arc::clone(&index) as Arc<dyn HazardAssessor>),
        );

        Self {
            lifecycle,
            registry,
            router,
            index,
            arrival_rx: Some(arrival_rx),
            config,
        }
    }

    /// Spawn the arrival pump on the harness's signal channel
    pub fn spawn_arrival_pump(&mut self) {
        let rx = self
            .arrival_rx
            .take()
            .expect("arrival pump already spawned");
        tokio::spawn(Arc::clone(&self.lifecycle).run_arrival_pump(rx));
    }
}

impl Default for DispatchHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// An available responder at the given coordinates
pub fn available_agent(
    id: &str,
    lat: f64,
    lon: f64,
    specialization: Specialization,
    rating: f32,
) -> Agent {
    Agent {
        id: id.to_string(),
        location: GeoPoint::new(lat, lon),
        location_updated_at: current_timestamp_ms(),
        status: AgentStatus::Available,
        specialization,
        rating,
    }
}

/// Feed returning scripted batches in order, then empty batches
pub struct ScriptedFeed {
    name: String,
    batches: Mutex<Vec<Result<Vec<RawHazardEvent>, FeedError>>>,
}

impl ScriptedFeed {
    pub fn new(name: &str, batches: Vec<Result<Vec<RawHazardEvent>, FeedError>>) -> Self {
        Self { name: name.to_string(), batches: Mutex::new(batches) }
    }
}

impl HazardFeed for ScriptedFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&self) -> BoxFuture<'_, Result<Vec<RawHazardEvent>, FeedError>> {
        let next = {
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                Ok(Vec::new())
            } else {
                batches.remove(0)
            }
        };
        Box::pin(async move { next })
    }
}

/// A raw quake report near the fixture origin
pub fn raw_quake(region_code: &str, title: &str, magnitude: f64) -> RawHazardEvent {
    RawHazardEvent {
        source_feed: "seismic-test".to_string(),
        kind: HazardKind::Quake,
        title: title.to_string(),
        region_code: region_code.to_string(),
        region_name: region_code.to_string(),
        lat: ORIGIN.0,
        lon: ORIGIN.1,
        magnitude: Some(magnitude),
    }
}
