//! Device registry and refresh controller.
//!
//! One supervised worker runs the fetch-aggregate-rank-publish cycle
//! serially: pull the oracle price, refresh hotspot metadata, replace each
//! hotspot's reward series, rank by 24h reward and publish a fresh snapshot.
//! After the first cycle every fetch failure is soft: the previous in-memory
//! value is retained and the cycle continues with degraded data.
//!
//! Known limitation: hotspots that disappear from an account upstream are
//! never pruned from the registry within a run.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, RwLock,
    },
    time::Duration,
};

use explorer_client::{ClientError, ExplorerClient, Hotspot};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Settings,
    errors::CodedError,
    format::DisplayUnit,
    ranking::{rank_by_reward, RankedEntry},
    rewards::RewardStore,
    task::{RetryRes, RetryTask, SupervisorErr},
    view::{self, StatusBar},
};

/// Pause between consecutive explorer calls, scaled by the number of
/// tracked hotspots to stay friendly to the upstream rate limit.
const PER_HOTSPOT_PAUSE: Duration = Duration::from_millis(10);

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("hotspot discovery failed: {0}")]
    Discovery(#[source] ClientError),

    #[error("initial price fetch failed: {0}")]
    InitialPrice(#[source] ClientError),

    #[error("no hotspots found for the configured accounts or addresses")]
    NoHotspots,
}

impl CodedError for MonitorError {
    fn code(&self) -> &str {
        match self {
            MonitorError::Discovery(_) => "[HT-MON-001]",
            MonitorError::InitialPrice(_) => "[HT-MON-002]",
            MonitorError::NoHotspots => "[HT-MON-003]",
        }
    }
}

/// Consistent view of one completed refresh cycle. Built wholesale by the
/// refresh worker, swapped into the shared slot, and read by the UI event
/// handlers for fetch-free re-renders.
#[derive(Debug, Clone)]
pub struct RefreshSnapshot {
    pub hotspots: HashMap<String, Hotspot>,
    pub store: RewardStore,
    pub ranking: Vec<RankedEntry>,
    pub price: u64,
    pub total: f64,
}

pub type SharedSurface = Arc<Mutex<dyn StatusBar>>;

/// Registry state owned by the refresh worker. Only ever touched with the
/// state lock held, and the worker is the only writer.
#[derive(Debug)]
struct MonitorState {
    hotspots: HashMap<String, Hotspot>,
    store: RewardStore,
    price: u64,
    /// Set for exactly one cycle after discovery so the first refresh does
    /// not immediately re-fetch metadata it just loaded.
    skip_metadata_refresh: bool,
    first_cycle: bool,
}

#[derive(Clone)]
pub struct RewardsMonitor {
    client: ExplorerClient,
    settings: Arc<Settings>,
    state: Arc<tokio::sync::Mutex<MonitorState>>,
    snapshot: Arc<RwLock<Option<Arc<RefreshSnapshot>>>>,
    /// Display-mode flag shared with the UI event loop.
    convert_to_usd: Arc<AtomicBool>,
    surface: SharedSurface,
}

impl RewardsMonitor {
    pub fn new(client: ExplorerClient, settings: Arc<Settings>, surface: SharedSurface) -> Self {
        Self {
            client,
            settings,
            state: Arc::new(tokio::sync::Mutex::new(MonitorState {
                hotspots: HashMap::new(),
                store: RewardStore::new(),
                price: 0,
                skip_metadata_refresh: false,
                first_cycle: true,
            })),
            snapshot: Arc::new(RwLock::new(None)),
            convert_to_usd: Arc::new(AtomicBool::new(false)),
            surface,
        }
    }

    /// Initial discovery of tracked hotspots from the configured accounts
    /// and explicit addresses. Failure here is fatal: the tray cannot start
    /// without a device set.
    pub async fn discover_hotspots(&self) -> Result<usize, MonitorError> {
        let mut state = self.state.lock().await;

        for account in &self.settings.account_addresses {
            let hotspots = self
                .client
                .account_hotspots(account)
                .await
                .map_err(MonitorError::Discovery)?;
            tracing::info!("Account {account}: {} hotspots", hotspots.len());
            for hotspot in hotspots {
                state.hotspots.insert(hotspot.address.clone(), hotspot);
            }
        }

        for address in &self.settings.hotspot_addresses {
            let hotspot = self.client.hotspot(address).await.map_err(MonitorError::Discovery)?;
            state.hotspots.insert(hotspot.address.clone(), hotspot);
        }

        if state.hotspots.is_empty() {
            return Err(MonitorError::NoHotspots);
        }

        // The metadata just fetched is current, skip re-fetching it on the
        // first refresh cycle.
        state.skip_metadata_refresh = true;
        Ok(state.hotspots.len())
    }

    pub fn display_unit(&self) -> DisplayUnit {
        if self.convert_to_usd.load(Ordering::Relaxed) {
            DisplayUnit::Usd
        } else {
            DisplayUnit::Hnt
        }
    }

    pub fn set_display_unit(&self, unit: DisplayUnit) {
        self.convert_to_usd.store(unit == DisplayUnit::Usd, Ordering::Relaxed);
    }

    /// Last completed snapshot, if any cycle has finished.
    pub fn last_snapshot(&self) -> Option<Arc<RefreshSnapshot>> {
        self.snapshot.read().ok().and_then(|slot| slot.clone())
    }

    /// Address of the hotspot currently ranked at `index`.
    pub fn ranked_address(&self, index: usize) -> Option<String> {
        self.last_snapshot()?.ranking.get(index).map(|entry| entry.address.clone())
    }

    /// Re-render the last completed snapshot, e.g. after a display-unit
    /// toggle. No network fetch.
    pub fn publish_last(&self) {
        if let Some(snapshot) = self.last_snapshot() {
            self.publish(&snapshot);
        }
    }

    /// One full refresh cycle. Returns an error only for first-cycle price
    /// failures; everything later is soft and leaves prior data in place.
    pub async fn refresh_cycle(&self) -> Result<(), MonitorError> {
        let mut state = self.state.lock().await;
        let addresses = Self::tracked_addresses(&state);
        let pause = PER_HOTSPOT_PAUSE * addresses.len() as u32;

        match self.client.oracle_price().await {
            Ok(price) => state.price = price.price,
            Err(err) if state.first_cycle => return Err(MonitorError::InitialPrice(err)),
            Err(err) => self.soft_error("Failed to get HNT price", &err),
        }

        if !state.skip_metadata_refresh {
            for address in &addresses {
                match self.client.hotspot(address).await {
                    // Whole-value replace, never a partial field update.
                    Ok(hotspot) => {
                        state.hotspots.insert(address.clone(), hotspot);
                    }
                    Err(err) => self.soft_error("Failed to refresh hotspots", &err),
                }
                tokio::time::sleep(pause).await;
            }
        }

        let mut total = 0.0;
        let mut entries = Vec::with_capacity(addresses.len());
        for address in &addresses {
            match self.client.reward_buckets(address).await {
                Ok(buckets) => state.store.put(address, buckets),
                // Keep the previous series; the hotspot still contributes
                // its last known reward below.
                Err(err) => self.soft_error("Failed to get rewards", &err),
            }

            let day = state.store.window_delta(address, 1);
            let name = state
                .hotspots
                .get(address)
                .map(|hs| hs.name.clone())
                .unwrap_or_else(|| address.clone());
            entries.push(RankedEntry { address: address.clone(), name, reward: day.current });
            total += day.current;
            tokio::time::sleep(pause).await;
        }

        let snapshot = Arc::new(RefreshSnapshot {
            hotspots: state.hotspots.clone(),
            store: state.store.clone(),
            ranking: rank_by_reward(entries),
            price: state.price,
            total,
        });

        if let Ok(mut slot) = self.snapshot.write() {
            *slot = Some(snapshot.clone());
        }
        self.publish(&snapshot);

        state.skip_metadata_refresh = false;
        state.first_cycle = false;
        Ok(())
    }

    /// Serial refresh loop: one cycle, then sleep the configured interval.
    /// A slow cycle simply delays the next one.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), MonitorError> {
        loop {
            self.refresh_cycle().await?;

            tokio::select! {
                _ = tokio::time::sleep(self.settings.refresh_interval()) => {}
                _ = cancel.cancelled() => {
                    tracing::info!("Refresh worker shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Deterministic enumeration order: sorted by address, so ranking
    /// tie-breaks are reproducible across runs.
    fn tracked_addresses(state: &MonitorState) -> Vec<String> {
        let mut addresses: Vec<String> = state.hotspots.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    fn publish(&self, snapshot: &RefreshSnapshot) {
        if let Ok(mut surface) = self.surface.lock() {
            view::publish(&mut *surface, snapshot, self.display_unit());
        }
    }

    fn soft_error(&self, message: &str, err: &ClientError) {
        tracing::warn!("{message}: {err}");
        // The error title is visible until the end-of-cycle publish
        // overwrites it with the refreshed total.
        if let Ok(mut surface) = self.surface.lock() {
            surface.set_title(message);
        }
    }
}

impl RetryTask for RewardsMonitor {
    fn spawn(&self, cancel: CancellationToken) -> RetryRes {
        let monitor = self.clone();
        Box::pin(async move {
            tracing::info!("Starting rewards refresh worker");
            // Anything that escapes the cycle's soft handling means the
            // first mandatory fetch failed, which is fatal.
            monitor.run(cancel).await.map_err(|err| SupervisorErr::Fault(err.into()))
        })
    }
}
