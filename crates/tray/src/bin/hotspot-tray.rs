use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use explorer_client::ExplorerClient;
use hotspot_tray::{
    config::Settings,
    monitor::SharedSurface,
    view::TerminalStatusBar,
    Args, TrayApp,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::format::FmtSpan;

/// How long a fatal error message stays visible on the surface before the
/// process exits.
const FATAL_NOTICE: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_span_events(FmtSpan::CLOSE)
            .init();
    }

    let surface: SharedSurface = Arc::new(Mutex::new(TerminalStatusBar));

    let settings_path = match args.settings.clone() {
        Some(path) => path,
        None => Settings::default_path().context("Failed to locate settings file")?,
    };
    let settings = match Settings::load(&settings_path) {
        Ok(settings) => settings,
        Err(err) => return fatal(&surface, "Config error", err.into()).await,
    };
    tracing::info!("Settings loaded from {}: {settings:?}", settings_path.display());

    let client = ExplorerClient::new(args.api_url.clone())
        .context("Failed to build explorer client")?;

    // No platform tray backend wired in: the surface renders to the log and
    // the only interaction is Ctrl-C. A GUI build hands the sender to its
    // menu callbacks instead.
    let (events_tx, events_rx) = async_channel::bounded(32);
    drop(events_tx);

    if let Ok(mut bar) = surface.lock() {
        bar.set_title("Loading summary...");
    }

    let app = TrayApp::new(settings, settings_path, client, surface.clone(), events_rx);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            ctrl_c_cancel.cancel();
        }
    });

    if let Err(err) = app.run(cancel).await {
        return fatal(&surface, "Failed to fetch hotspots", err).await;
    }

    tracing::info!("Good bye");
    Ok(())
}

/// Show a terminal error on the surface for a few seconds, then exit with a
/// failure status.
async fn fatal(surface: &SharedSurface, message: &str, err: anyhow::Error) -> Result<()> {
    if let Ok(mut bar) = surface.lock() {
        bar.set_title(message);
    }
    tracing::error!("{message}: {err:?}");
    tokio::time::sleep(FATAL_NOTICE).await;
    Err(err)
}
