//! UI event handling, independent of the refresh cycle.
//!
//! The tray backend pushes every interaction onto one multiplexed channel,
//! tagged with the row index where relevant. Handlers only flip the display
//! unit and re-render the last completed snapshot, or shell out to the OS;
//! none of them trigger a network fetch.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use tokio_util::sync::CancellationToken;

use crate::{
    format::DisplayUnit,
    monitor::RewardsMonitor,
    task::{RetryRes, RetryTask},
};

/// Explorer page opened from a hotspot's action row.
pub const EXPLORER_HOTSPOT_URL: &str = "https://explorer.helium.com/hotspots";

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &str = "xdg-open";

/// One user interaction from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Show rewards in the native unit.
    DisplayHnt,
    /// Show rewards converted through the oracle price.
    DisplayUsd,
    /// Open the settings file in the platform editor.
    EditSettings,
    /// Open the explorer page for the hotspot ranked at this index.
    OpenExplorer(usize),
    Quit,
}

pub fn explorer_url(address: &str) -> String {
    format!("{EXPLORER_HOTSPOT_URL}/{address}")
}

/// Argument handed to the opener for a local file. `explorer` on Windows
/// wants a `file:///` URL; a bare path would open an Explorer window
/// instead of the file.
pub fn file_open_target(path: &Path) -> String {
    if cfg!(windows) {
        format!("file:///{}", path.display())
    } else {
        path.display().to_string()
    }
}

/// Open a URL or file path with the platform default handler,
/// fire-and-forget.
pub fn open_external(target: &str) {
    match Command::new(OPENER).arg(target).spawn() {
        Ok(_) => tracing::debug!("Opened {target}"),
        Err(err) => tracing::warn!("Failed to open {target}: {err}"),
    }
}

#[derive(Clone)]
pub struct UiEventLoop {
    monitor: RewardsMonitor,
    events: async_channel::Receiver<UiEvent>,
    settings_path: PathBuf,
}

impl UiEventLoop {
    pub fn new(
        monitor: RewardsMonitor,
        events: async_channel::Receiver<UiEvent>,
        settings_path: PathBuf,
    ) -> Self {
        Self { monitor, events, settings_path }
    }

    /// React to one event. `cancel` is the application-wide token so Quit
    /// stops the refresh worker as well.
    pub fn handle(&self, event: UiEvent, cancel: &CancellationToken) {
        tracing::debug!("UI event: {event:?}");
        match event {
            UiEvent::DisplayHnt => {
                self.monitor.set_display_unit(DisplayUnit::Hnt);
                self.monitor.publish_last();
            }
            UiEvent::DisplayUsd => {
                self.monitor.set_display_unit(DisplayUnit::Usd);
                self.monitor.publish_last();
            }
            UiEvent::EditSettings => {
                open_external(&file_open_target(&self.settings_path));
            }
            UiEvent::OpenExplorer(index) => match self.monitor.ranked_address(index) {
                Some(address) => open_external(&explorer_url(&address)),
                None => tracing::warn!("No hotspot ranked at row {index}"),
            },
            UiEvent::Quit => {
                tracing::info!("Quit requested");
                cancel.cancel();
            }
        }
    }
}

impl RetryTask for UiEventLoop {
    fn spawn(&self, cancel: CancellationToken) -> RetryRes {
        let event_loop = self.clone();
        Box::pin(async move {
            tracing::info!("Starting UI event listener");
            loop {
                tokio::select! {
                    event = event_loop.events.recv() => match event {
                        Ok(event) => event_loop.handle(event, &cancel),
                        Err(_) => {
                            // Surface went away; nothing left to listen to.
                            tracing::debug!("UI event channel closed");
                            return Ok(());
                        }
                    },
                    _ = cancel.cancelled() => {
                        tracing::info!("UI event listener shutting down");
                        return Ok(());
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_url_embeds_the_address() {
        assert_eq!(
            explorer_url("112qB3Ya"),
            "https://explorer.helium.com/hotspots/112qB3Ya"
        );
    }

    #[test]
    #[cfg(windows)]
    fn settings_file_opens_as_a_file_url() {
        assert_eq!(
            file_open_target(Path::new(r"C:\Users\me\Documents\hotspot-tray.json")),
            r"file:///C:\Users\me\Documents\hotspot-tray.json"
        );
    }

    #[test]
    #[cfg(not(windows))]
    fn settings_file_opens_as_a_bare_path() {
        assert_eq!(
            file_open_target(Path::new("/home/me/Documents/hotspot-tray.json")),
            "/home/me/Documents/hotspot-tray.json"
        );
    }
}
