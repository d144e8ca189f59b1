//! Status-bar reward monitor for Helium hotspots.
//!
//! Periodically polls the public explorer API for the hotspots named in the
//! settings file, aggregates their rewards over 24h/7d/30d windows and
//! publishes a ranked snapshot to a status-bar surface. A separate listener
//! reacts to tray-menu interactions (currency toggle, settings edit,
//! explorer links, quit) against the last completed snapshot.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use explorer_client::ExplorerClient;
use tokio_util::sync::CancellationToken;
use url::Url;

pub mod config;
pub mod errors;
pub mod events;
pub mod format;
pub mod monitor;
pub mod ranking;
pub mod rewards;
pub mod task;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use config::Settings;
use events::{UiEvent, UiEventLoop};
use monitor::{RewardsMonitor, SharedSurface};
use task::Supervisor;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Args {
    /// Path to the JSON settings file (defaults to
    /// ~/Documents/hotspot-tray.json)
    #[clap(long, env = "HOTSPOT_TRAY_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Explorer API base URL
    #[clap(long, env = "HOTSPOT_TRAY_API_URL", default_value = explorer_client::DEFAULT_API_URL)]
    pub api_url: Url,

    /// Emit logs as JSON
    #[clap(long, default_value_t = false)]
    pub log_json: bool,
}

/// The assembled application: refresh worker plus UI event listener, each
/// under its own supervisor.
pub struct TrayApp {
    monitor: RewardsMonitor,
    event_loop: UiEventLoop,
}

impl TrayApp {
    pub fn new(
        settings: Settings,
        settings_path: PathBuf,
        client: ExplorerClient,
        surface: SharedSurface,
        events: async_channel::Receiver<UiEvent>,
    ) -> Self {
        let monitor = RewardsMonitor::new(client, Arc::new(settings), surface);
        let event_loop = UiEventLoop::new(monitor.clone(), events, settings_path);
        Self { monitor, event_loop }
    }

    pub fn monitor(&self) -> &RewardsMonitor {
        &self.monitor
    }

    /// Discover the tracked hotspots, then run both workers until the token
    /// is cancelled. Errors out of here are fatal.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let count = self
            .monitor
            .discover_hotspots()
            .await
            .context("Failed to fetch hotspots")?;
        tracing::info!("Tracking {count} hotspots");

        let refresh = Supervisor::new(Arc::new(self.monitor), cancel.clone());
        let ui = Supervisor::new(Arc::new(self.event_loop), cancel.clone());

        tokio::try_join!(refresh.run(), ui.run())?;
        Ok(())
    }
}
