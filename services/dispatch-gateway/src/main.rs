use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use lifeline_broadcast::WsGateway;
use lifeline_core::{logging, now_ms};
use lifeline_hazards::{FeedScheduler, HazardFeed};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::info;

mod config;
mod feeds;
mod handlers;
mod state;

use config::Config;
use feeds::HttpJsonFeed;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::from_env()?;
    let (state, arrival_rx) = AppState::new(config.clone());
    let state = Arc::new(state);

    // Proximity arrivals flow from the registry into the lifecycle manager.
    tokio::spawn(Arc::clone(&state.lifecycle).run_arrival_pump(arrival_rx));

    // External hazard feeds, when configured.
    let mut scheduler = FeedScheduler::new(
        Arc::clone(&state.router),
        Arc::clone(&state.index),
        &config.dispatch.hazards,
    );
    if let Some(url) = &config.seismic_feed_url {
        let feed: Arc<dyn HazardFeed> = Arc::new(HttpJsonFeed::new("seismic", url));
        scheduler.add_feed(feed, Duration::from_secs(config.dispatch.hazards.seismic_poll_secs));
    }
    if let Some(url) = &config.weather_feed_url {
        let feed: Arc<dyn HazardFeed> = Arc::new(HttpJsonFeed::new("weather", url));
        scheduler.add_feed(feed, Duration::from_secs(config.dispatch.hazards.weather_poll_secs));
    }
    Arc::new(scheduler).run();

    // Live connections subscribe to topics over the WebSocket gateway.
    let ws_addr = SocketAddr::from(([0, 0, 0, 0], config.ws_port));
    let ws_gateway = Arc::new(WsGateway::new(ws_addr, Arc::clone(&state.router)));
    tokio::spawn(async move {
        if let Err(e) = ws_gateway.run().await {
            tracing::error!("WebSocket gateway exited: {}", e);
        }
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/alerts", post(handlers::create_alert))
        .route("/alerts/:id/assign", post(handlers::assign_alert))
        .route("/alerts/:id/status", post(handlers::update_alert_status))
        .route("/alerts/:id/cancel", post(handlers::cancel_alert))
        .route("/agents/nearby", get(handlers::nearby_agents))
        .route("/agents/:id", put(handlers::upsert_agent))
        .route("/agents/:id/location", post(handlers::update_agent_location))
        .route("/agents/:id/status", post(handlers::update_agent_status))
        .with_state(state)
        .layer(ServiceBuilder::new().into_inner());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("dispatch gateway listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "dispatch-gateway",
        "timestamp": now_ms()
    }))
}
