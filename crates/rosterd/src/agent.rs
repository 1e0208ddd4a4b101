//! Announce mode — registers a service with a remote registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use roster_client::{ApplicationRegistrator, ClientConfig, ClientProperties};

pub struct AgentOptions {
    pub registry_url: String,
    pub name: String,
    pub port: Option<u16>,
    pub host: String,
    pub prefer_ip: bool,
    pub ip: Option<String>,
    pub service_url: Option<String>,
    pub management_url: Option<String>,
    pub health_url: Option<String>,
    pub period_ms: u64,
    pub timeout_ms: u64,
}

pub async fn run_agent(opts: AgentOptions) -> anyhow::Result<()> {
    info!(registry = %opts.registry_url, name = %opts.name, "roster announcer starting");

    let mut config = ClientConfig::new(opts.name);
    config.host = opts.host;
    config.prefer_ip = opts.prefer_ip;
    config.ip = opts.ip;
    config.service_url = opts.service_url;
    config.management_url = opts.management_url;
    config.health_url = opts.health_url;

    let props = Arc::new(ClientProperties::new(config));
    if let Some(port) = opts.port {
        // The announced service is already bound; report it so URL
        // derivation can proceed.
        props.mark_ready(port);
    }

    let registrator = Arc::new(
        ApplicationRegistrator::new(opts.registry_url, props)
            .with_request_timeout(Duration::from_millis(opts.timeout_ms)),
    );

    // ── Registration loop ────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_registrator = Arc::clone(&registrator);
    let period = Duration::from_millis(opts.period_ms);
    let loop_handle = tokio::spawn(async move {
        loop_registrator.run(period, shutdown_rx).await;
    });

    // ── Wait for shutdown ────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = loop_handle.await;

    // Best effort: a failed deregistration just means the registry will
    // see this client go OFFLINE through its health polling.
    registrator.deregister().await;

    info!("roster announcer stopped");
    Ok(())
}
