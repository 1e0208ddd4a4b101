//! rosterd — the Roster daemon.
//!
//! Two modes:
//! - `serve` runs the registry: application directory, status polling,
//!   route table, and the REST API.
//! - `announce` runs the client side: periodically registers a service
//!   with a remote registry and deregisters it on shutdown.
//!
//! # Usage
//!
//! ```text
//! rosterd serve --port 8080
//! rosterd announce --registry-url http://admin:8080 --name orders \
//!     --service-url http://orders:8080
//! ```

mod agent;
mod server;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rosterd", about = "Roster service registry daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the registry server.
    Serve {
        /// Port the REST API listens on.
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Polling tick cadence in milliseconds.
        #[arg(long, default_value = "10000")]
        monitor_period_ms: u64,

        /// How long a determined status stays fresh, in milliseconds.
        #[arg(long, default_value = "30000")]
        status_lifetime_ms: u64,

        /// Per-probe timeout (connect + read) in milliseconds.
        #[arg(long, default_value = "2000")]
        probe_timeout_ms: u64,

        /// Path prefix derived proxy routes live under.
        #[arg(long, default_value = "/proxied")]
        proxy_prefix: String,
    },

    /// Announce a service to a remote registry.
    Announce {
        /// Base URL of the registry.
        #[arg(long)]
        registry_url: String,

        /// Name to register with.
        #[arg(long)]
        name: String,

        /// Local port the announced service is bound on.
        #[arg(long)]
        port: Option<u16>,

        /// Hostname used in derived URLs.
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Register the configured IP instead of the hostname.
        #[arg(long, default_value = "false")]
        prefer_ip: bool,

        /// IP address used with --prefer-ip.
        #[arg(long)]
        ip: Option<String>,

        /// Explicit service URL (overrides derivation).
        #[arg(long)]
        service_url: Option<String>,

        /// Explicit management URL (overrides derivation).
        #[arg(long)]
        management_url: Option<String>,

        /// Explicit health URL (overrides derivation).
        #[arg(long)]
        health_url: Option<String>,

        /// Registration retry period in milliseconds.
        #[arg(long, default_value = "10000")]
        period_ms: u64,

        /// Per-request timeout in milliseconds.
        #[arg(long, default_value = "2000")]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rosterd=debug,roster_registry=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            monitor_period_ms,
            status_lifetime_ms,
            probe_timeout_ms,
            proxy_prefix,
        } => {
            server::run_server(server::ServerOptions {
                port,
                monitor_period_ms,
                status_lifetime_ms,
                probe_timeout_ms,
                proxy_prefix,
            })
            .await
        }
        Command::Announce {
            registry_url,
            name,
            port,
            host,
            prefer_ip,
            ip,
            service_url,
            management_url,
            health_url,
            period_ms,
            timeout_ms,
        } => {
            agent::run_agent(agent::AgentOptions {
                registry_url,
                name,
                port,
                host,
                prefer_ip,
                ip,
                service_url,
                management_url,
                health_url,
                period_ms,
                timeout_ms,
            })
            .await
        }
    }
}
