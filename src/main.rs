// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{routing::{delete, get, post}, Router};
use tokio::sync::{mpsc, Mutex};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::data_feed::run_poller;
use crate::application::pipeline::Panel;
use crate::infrastructure::config::{load_feed_config, load_panel_config};
use crate::infrastructure::influx_feed::InfluxFeed;
use crate::infrastructure::memory_map::{InMemoryMap, SharedPanel};
use crate::infrastructure::topology_loader::run_topology_loader;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_layer_choice, data_error, data_received, get_color_schemes, get_config, get_layers,
    get_legend, get_status, health_check, put_config, remove_layer_choice,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let panel_config = load_panel_config()?;
    let feed_config = load_feed_config()?;

    // Map widget reports layer loads through the topology loader
    let (load_tx, load_rx) = mpsc::unbounded_channel();
    let panel: SharedPanel = Arc::new(Mutex::new(Panel::new(
        panel_config,
        InMemoryMap::new(load_tx),
    )));
    tokio::spawn(run_topology_loader(load_rx, panel.clone()));

    // Optional polling feed
    if let Some(feed_config) = feed_config {
        let every = Duration::from_secs(feed_config.poll_interval_secs.max(1));
        tracing::info!(
            "Polling {} targets from InfluxDB every {:?}",
            feed_config.targets.len(),
            every
        );
        let feed = Arc::new(InfluxFeed::new(feed_config));
        tokio::spawn(run_poller(feed, panel.clone(), every));
    }

    let state = Arc::new(AppState { panel });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/data", post(data_received))
        .route("/data-error", post(data_error))
        .route("/layers", get(get_layers))
        .route("/legend", get(get_legend))
        .route("/config", get(get_config).put(put_config))
        .route("/config/layers", post(add_layer_choice))
        .route("/config/layers/:index", delete(remove_layer_choice))
        .route("/color-schemes", get(get_color_schemes))
        .route("/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("Starting network map telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
