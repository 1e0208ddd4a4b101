//! Server mode — runs the registry, the status updater, and the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use roster_api::{ApiState, build_router};
use roster_proxy::RouteLocator;
use roster_registry::{ApplicationStore, EventHub, StatusUpdater};

pub struct ServerOptions {
    pub port: u16,
    pub monitor_period_ms: u64,
    pub status_lifetime_ms: u64,
    pub probe_timeout_ms: u64,
    pub proxy_prefix: String,
}

pub async fn run_server(opts: ServerOptions) -> anyhow::Result<()> {
    info!("roster registry starting");

    // ── Directory + events ───────────────────────────────────────
    let store = ApplicationStore::new();
    let hub = EventHub::new();

    // ── Route locator, refreshed on every registry event ─────────
    let locator = Arc::new(
        RouteLocator::new(store.clone()).with_proxy_prefix(opts.proxy_prefix),
    );
    hub.subscribe(locator.listener());
    info!("route locator wired to registry events");

    // ── Status updater ───────────────────────────────────────────
    let updater = StatusUpdater::new(store.clone(), hub.clone())
        .with_status_lifetime(Duration::from_millis(opts.status_lifetime_ms))
        .with_probe_timeout(Duration::from_millis(opts.probe_timeout_ms));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let updater_shutdown = shutdown_rx.clone();
    let monitor_period = Duration::from_millis(opts.monitor_period_ms);
    let updater_handle = tokio::spawn(async move {
        updater.run(monitor_period, updater_shutdown).await;
    });

    // ── REST API server ──────────────────────────────────────────
    let router = build_router(ApiState {
        store,
        hub,
        locator,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "registry API listening");

    let mut server_shutdown = shutdown_rx.clone();
    let server_handle = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "API server error");
        }
    });

    // ── Wait for shutdown ────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    let _ = updater_handle.await;
    let _ = server_handle.await;
    info!("roster registry stopped");
    Ok(())
}
