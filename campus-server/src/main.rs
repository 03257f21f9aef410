use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use campus_core::config::Settings;
use clap::Parser;
use tracing::{error, info};

use campus_server::{AppState, app, telemetry};

#[derive(Parser, Debug)]
#[command(name = "campus-server", version, about = "Campus assistant HTTP server")]
struct Args {
    /// TOML config file (defaults to ./campus.toml when present)
    #[arg(short, long, value_name = "PATH", env = "CAMPUS_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Listen address, overriding the configured one
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        settings.bind = bind;
    }

    telemetry::init(&settings.logging)?;

    let addr: SocketAddr = settings
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", settings.bind))?;

    let state = AppState::from_settings(&settings)?;
    info!(
        events = %settings.events_ics_url,
        ics_dir = %settings.ics_dir().display(),
        transcription = settings.openai_api_key.is_some(),
        "configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("campus-server listening on http://{addr}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("campus-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
