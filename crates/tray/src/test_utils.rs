//! Recording status-bar surface for tests.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use crate::view::{DetailRow, StatusBar, StatusIcon};

#[derive(Debug, Clone, Default)]
pub struct RecordedRow {
    pub title: String,
    pub icon: Option<StatusIcon>,
    pub details: BTreeMap<DetailRow, String>,
    pub detail_icons: BTreeMap<DetailRow, StatusIcon>,
}

#[derive(Debug, Default)]
struct Recorded {
    title: String,
    tooltip: String,
    rows: Vec<RecordedRow>,
}

/// Surface double that records everything published to it. Clones share the
/// same recording, so tests can hand one clone to the monitor and keep
/// another for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusBar {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingStatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> String {
        self.inner.lock().unwrap().title.clone()
    }

    pub fn tooltip(&self) -> String {
        self.inner.lock().unwrap().tooltip.clone()
    }

    pub fn rows(&self) -> Vec<RecordedRow> {
        self.inner.lock().unwrap().rows.clone()
    }

    pub fn row(&self, index: usize) -> RecordedRow {
        self.inner.lock().unwrap().rows[index].clone()
    }
}

impl StatusBar for RecordingStatusBar {
    fn set_title(&mut self, title: &str) {
        self.inner.lock().unwrap().title = title.to_string();
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.inner.lock().unwrap().tooltip = tooltip.to_string();
    }

    fn upsert_row(&mut self, index: usize, title: &str, icon: StatusIcon) {
        let mut recorded = self.inner.lock().unwrap();
        if recorded.rows.len() <= index {
            recorded.rows.resize_with(index + 1, RecordedRow::default);
        }
        recorded.rows[index].title = title.to_string();
        recorded.rows[index].icon = Some(icon);
    }

    fn set_detail(&mut self, index: usize, detail: DetailRow, title: &str, icon: Option<StatusIcon>) {
        let mut recorded = self.inner.lock().unwrap();
        if recorded.rows.len() <= index {
            recorded.rows.resize_with(index + 1, RecordedRow::default);
        }
        recorded.rows[index].details.insert(detail, title.to_string());
        if let Some(icon) = icon {
            recorded.rows[index].detail_icons.insert(detail, icon);
        }
    }
}
