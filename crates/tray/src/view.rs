//! Publishes a refresh snapshot onto the status-bar surface.
//!
//! Publishing only formats already-validated data and forwards it, so
//! nothing in this module returns an error.

use crate::format::{format_amount, percent_delta, DisplayUnit};
use crate::monitor::RefreshSnapshot;

/// Status glyph shown next to a hotspot row: online/offline crossed with the
/// sign of the day-over-day reward delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Online,
    OnlineUp,
    OnlineDown,
    Offline,
    OfflineUp,
    OfflineDown,
}

/// Decision table mapping (online, delta sign) to an icon.
pub fn status_icon(online: bool, delta: f64) -> StatusIcon {
    match (online, delta) {
        (true, d) if d > 0.0 => StatusIcon::OnlineUp,
        (true, d) if d < 0.0 => StatusIcon::OnlineDown,
        (true, _) => StatusIcon::Online,
        (false, d) if d > 0.0 => StatusIcon::OfflineUp,
        (false, d) if d < 0.0 => StatusIcon::OfflineDown,
        (false, _) => StatusIcon::Offline,
    }
}

/// Nested rows under each hotspot entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailRow {
    Status,
    Scale,
    Reward24h,
    Reward7d,
    Reward30d,
    Explorer,
}

/// The presentation surface the tray publishes into. Implemented by the
/// platform tray backend; a terminal fallback and a recording test double
/// live in this crate.
pub trait StatusBar: Send {
    fn set_title(&mut self, title: &str);
    fn set_tooltip(&mut self, tooltip: &str);
    /// Create or update the row at `index` in rank order.
    fn upsert_row(&mut self, index: usize, title: &str, icon: StatusIcon);
    fn set_detail(&mut self, index: usize, detail: DetailRow, title: &str, icon: Option<StatusIcon>);
}

const REWARD_WINDOWS: [(DetailRow, usize, &str); 3] = [
    (DetailRow::Reward24h, 1, "24H"),
    (DetailRow::Reward7d, 7, "07D"),
    (DetailRow::Reward30d, 30, "30D"),
];

/// Write one snapshot to the surface: ranked hotspot rows with status icons
/// and window details, then the grand total as the overall title.
pub fn publish(surface: &mut dyn StatusBar, snapshot: &RefreshSnapshot, unit: DisplayUnit) {
    for (index, entry) in snapshot.ranking.iter().enumerate() {
        let Some(hotspot) = snapshot.hotspots.get(&entry.address) else {
            continue;
        };
        let online = hotspot.is_online();
        let day = snapshot.store.window_delta(&entry.address, 1);

        let row_title =
            format!("{} - {}", format_amount(day.current, unit, snapshot.price), entry.name);
        surface.upsert_row(index, &row_title, status_icon(online, day.delta));

        surface.set_detail(
            index,
            DetailRow::Status,
            &format!("Status: {}", hotspot.status.online),
            None,
        );
        surface.set_detail(
            index,
            DetailRow::Scale,
            &format!("Reward scale: {:.2}", hotspot.reward_scale()),
            None,
        );

        for (detail, days, label) in REWARD_WINDOWS {
            let window = snapshot.store.window_delta(&entry.address, days);
            let amount = format_amount(window.current, unit, snapshot.price);
            let percent = percent_delta(window.delta, window.previous);
            let title = if percent.is_empty() {
                format!("{label} - {amount}")
            } else {
                format!("{label} - {amount} {percent}")
            };
            surface.set_detail(index, detail, &title, Some(status_icon(online, window.delta)));
        }

        surface.set_detail(index, DetailRow::Explorer, "Open Helium explorer...", None);
    }

    surface.set_title(&format_amount(snapshot.total, unit, snapshot.price));
    surface.set_tooltip(&format!("{} hotspots tracked", snapshot.ranking.len()));
}

/// Headless surface that renders rows as log lines. Used by the binary when
/// no platform tray backend is wired in.
#[derive(Debug, Default)]
pub struct TerminalStatusBar;

impl StatusBar for TerminalStatusBar {
    fn set_title(&mut self, title: &str) {
        tracing::info!("[title] {title}");
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        tracing::debug!("[tooltip] {tooltip}");
    }

    fn upsert_row(&mut self, index: usize, title: &str, icon: StatusIcon) {
        tracing::info!("[row {index}] {title} ({icon:?})");
    }

    fn set_detail(&mut self, index: usize, detail: DetailRow, title: &str, _icon: Option<StatusIcon>) {
        tracing::debug!("[row {index}/{detail:?}] {title}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_decision_table() {
        assert_eq!(status_icon(true, 0.0), StatusIcon::Online);
        assert_eq!(status_icon(true, 1.0), StatusIcon::OnlineUp);
        assert_eq!(status_icon(true, -1.0), StatusIcon::OnlineDown);
        assert_eq!(status_icon(false, 0.0), StatusIcon::Offline);
        assert_eq!(status_icon(false, 0.5), StatusIcon::OfflineUp);
        assert_eq!(status_icon(false, -0.5), StatusIcon::OfflineDown);
    }
}
