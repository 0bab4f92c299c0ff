//! Structured logging for the Lifeline dispatch platform.
//!
//! Initialization is centralized here so every service and test harness
//! configures `tracing` the same way: `RUST_LOG`-driven filtering with
//! either human-readable or JSON output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize human-readable logging.
///
/// Log level is taken from `RUST_LOG`, defaulting to `info`.
///
/// # Example
/// ```no_run
/// use lifeline_core::logging;
///
/// logging::init();
/// tracing::info!("dispatch core started");
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .init();
}

/// Initialize JSON logging for production log aggregation.
///
/// # Example
/// ```no_run
/// use lifeline_core::logging;
///
/// logging::init_json();
/// tracing::info!(service = "dispatch-gateway", "service started");
/// ```
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true).with_thread_ids(true))
        .init();
}
