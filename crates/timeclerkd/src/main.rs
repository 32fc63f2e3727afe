//! timeclerkd - The volunteer time-tracking kiosk backend service
//!
//! Wires together configuration, the Ledger client, the SMS gateway
//! and the shift lifecycle engine, then serves the kiosk HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use timeclerk_config::{load_config, Secrets};
use timeclerk_ledger::{HttpLedger, Ledger};
use timeclerk_notify::{Notifier, SmsGateway};
use timeclerkd::{router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// timeclerkd - volunteer time-tracking kiosk backend
#[derive(Parser, Debug)]
#[command(name = "timeclerkd")]
#[command(about = "Volunteer time-tracking kiosk backend", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/timeclerk/config.toml")]
    config: PathBuf,

    /// Bind address override (or set TIMECLERK_BIND env var)
    #[arg(short, long, env = "TIMECLERK_BIND")]
    bind: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "timeclerkd starting");

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    let secrets = Secrets::from_env().context("Missing credentials in environment")?;

    info!(
        config_path = %args.config.display(),
        ledger_base = %config.ledger.base_id,
        "Configuration loaded"
    );

    let ledger: Arc<dyn Ledger> = Arc::new(
        HttpLedger::new(&config.ledger, secrets.ledger_token)
            .context("Failed to build Ledger client")?,
    );
    let notifier: Arc<dyn Notifier> = Arc::new(
        SmsGateway::new(&config.notify, secrets.sms_auth_token)
            .context("Failed to build SMS gateway")?,
    );

    let state = Arc::new(AppState::new(ledger, notifier, &config, secrets.sweep_key));
    let app = router(state);

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(addr = %bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("timeclerkd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
