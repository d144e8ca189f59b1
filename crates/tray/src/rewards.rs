//! In-memory reward series store and window aggregation.
//!
//! The store keeps one daily bucket sequence per hotspot, index 0 being the
//! current day. Sequences are replaced wholesale on a successful fetch; a
//! failed fetch leaves the previous cycle's sequence untouched, so readers
//! may see stale but never partially overwritten data.

use std::collections::HashMap;

use explorer_client::RewardBucket;
use thiserror::Error;

/// Maximum buckets retained per hotspot.
pub const LOOKBACK_DAYS: usize = 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RewardStoreError {
    #[error("reward range {from}..{to} for {address} exceeds {available} stored buckets")]
    OutOfRange { address: String, from: usize, to: usize, available: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowDelta {
    /// Sum over the most recent N buckets.
    pub current: f64,
    /// Sum over the N buckets before those, truncated to available history.
    pub previous: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RewardStore {
    series: HashMap<String, Vec<RewardBucket>>,
}

impl RewardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire stored sequence for a hotspot.
    pub fn put(&mut self, address: &str, mut buckets: Vec<RewardBucket>) {
        buckets.truncate(LOOKBACK_DAYS);
        self.series.insert(address.to_string(), buckets);
    }

    pub fn get(&self, address: &str, index: usize) -> Result<&RewardBucket, RewardStoreError> {
        let buckets = self.series.get(address).map(Vec::as_slice).unwrap_or(&[]);
        buckets.get(index).ok_or_else(|| RewardStoreError::OutOfRange {
            address: address.to_string(),
            from: index,
            to: index + 1,
            available: buckets.len(),
        })
    }

    /// Sum of `total` over the half-open bucket range `from..to`. Fails if
    /// the range reaches past the stored history.
    pub fn sum(&self, address: &str, from: usize, to: usize) -> Result<f64, RewardStoreError> {
        let buckets = self.series.get(address).map(Vec::as_slice).unwrap_or(&[]);
        if to > buckets.len() || from > to {
            return Err(RewardStoreError::OutOfRange {
                address: address.to_string(),
                from,
                to,
                available: buckets.len(),
            });
        }
        Ok(buckets[from..to].iter().map(|b| b.total).sum())
    }

    /// Like [`sum`](Self::sum) but clamps the range to the stored history.
    ///
    /// This is the deliberate degradation policy for short histories: a
    /// window reaching past the available buckets sums whatever is there,
    /// which can understate the previous period early in a hotspot's life.
    pub fn sum_clamped(&self, address: &str, from: usize, to: usize) -> f64 {
        let buckets = self.series.get(address).map(Vec::as_slice).unwrap_or(&[]);
        let to = to.min(buckets.len());
        let from = from.min(to);
        buckets[from..to].iter().map(|b| b.total).sum()
    }

    /// Current-vs-previous aggregation for an N-day window.
    pub fn window_delta(&self, address: &str, days: usize) -> WindowDelta {
        let current = self.sum_clamped(address, 0, days);
        let previous = self.sum_clamped(address, days, 2 * days);
        WindowDelta { current, previous, delta: current - previous }
    }

    pub fn len(&self, address: &str) -> usize {
        self.series.get(address).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
