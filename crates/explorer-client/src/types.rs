//! Response shapes for the explorer API.
//!
//! Fields the tray never inspects (geocode, listen addresses) are carried as
//! opaque values so upstream schema drift does not break decoding.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Envelope wrapping every explorer API response body.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// A tracked hotspot as reported by the explorer.
#[derive(Debug, Clone, Deserialize)]
pub struct Hotspot {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    /// Transmit reward scale. Null for hotspots that have not yet asserted
    /// a location.
    #[serde(default)]
    pub reward_scale: Option<f64>,
    pub status: HotspotStatus,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    /// Geocode blob, displayed verbatim if at all.
    #[serde(default)]
    pub geocode: serde_json::Value,
}

impl Hotspot {
    pub fn is_online(&self) -> bool {
        self.status.online == "online"
    }

    pub fn reward_scale(&self) -> f64 {
        self.reward_scale.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotspotStatus {
    /// "online" or "offline".
    pub online: String,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub listen_addrs: Option<Vec<String>>,
}

/// One daily bucket of reward earnings for a hotspot.
///
/// Buckets arrive most-recent-first; index 0 is the current day. The summary
/// statistics are decoded and kept but only `total` feeds the aggregation.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardBucket {
    pub total: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub avg: f64,
    #[serde(default)]
    pub stddev: f64,
    pub timestamp: DateTime<Utc>,
}

/// Current oracle price, fixed-point with 8 decimals (1 USD == 1e8).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OraclePrice {
    pub price: u64,
    #[serde(default)]
    pub block: Option<u64>,
}
