use lifeline_broadcast::BroadcastRouter;
use lifeline_dispatch::{
    AgentRegistry, ArrivalSignal, LifecycleManager, LogNotifier, MemoryIncidentStore,
};
use lifeline_domain::HazardAssessor;
use lifeline_hazards::HazardIndex;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::Config;

pub struct AppState {
    pub config: Config,
    pub lifecycle: Arc<LifecycleManager>,
    pub registry: Arc<AgentRegistry>,
    pub router: Arc<BroadcastRouter>,
    pub index: Arc<HazardIndex>,
}

impl AppState {
    /// Wire the in-process components.
    ///
    /// Returns the arrival-signal receiver alongside the state; the caller
    /// spawns the lifecycle arrival pump on it.
    pub fn new(config: Config) -> (Self, mpsc::UnboundedReceiver<ArrivalSignal>) {
        let router = Arc::new(BroadcastRouter::new());
        let registry = Arc::new(AgentRegistry::new(config.dispatch.arrival.threshold_m));
        let index = Arc::new(HazardIndex::new(config.dispatch.hazards.assessment_radius_km));

        let (arrival_tx, arrival_rx) = mpsc::unbounded_channel();
        registry.set_arrival_channel(arrival_tx);

        let lifecycle = Arc::new(
            LifecycleManager::new(
                Arc::new(MemoryIncidentStore::new()),
                Arc::clone(&registry),
                Arc::clone(&router),
                Arc::new(LogNotifier),
                config.dispatch.clone(),
            )
            .with_assessor(Arc::clone(&index) as Arc<dyn HazardAssessor>),
        );

        let state = AppState { config, lifecycle, registry, router, index };
        (state, arrival_rx)
    }
}
