//! Client for the public Helium explorer API.
//!
//! Read-only: the tray only ever lists hotspots, pulls daily reward buckets
//! and the current oracle price. Every request carries a fixed User-Agent
//! and a bounded timeout; any transport or decode problem surfaces as a
//! single opaque [`ClientError`] per call.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

mod types;

pub use types::{Hotspot, HotspotStatus, OraclePrice, RewardBucket};

/// Default public explorer API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.helium.io/";

/// Days of reward history requested per hotspot.
pub const REWARD_LOOKBACK_DAYS: u32 = 60;

const USER_AGENT: &str = concat!("hotspot-tray/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("explorer returned {status} for {url}")]
    BadStatus { status: reqwest::StatusCode, url: Url },

    #[error("invalid explorer URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// HTTP client for the explorer API.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    base_url: Url,
}

impl ExplorerClient {
    /// Build a client against an explicit base URL (used by tests to point
    /// at a local mock server).
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Build a client against the public explorer API.
    pub fn new_default() -> Result<Self, ClientError> {
        Self::new(Url::parse(DEFAULT_API_URL)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List all hotspots owned by an account.
    pub async fn account_hotspots(&self, account: &str) -> Result<Vec<Hotspot>, ClientError> {
        let url = self.base_url.join(&format!("v1/accounts/{account}/hotspots"))?;
        self.get_json::<Vec<Hotspot>>(url).await
    }

    /// Fetch a single hotspot by address.
    pub async fn hotspot(&self, address: &str) -> Result<Hotspot, ClientError> {
        let url = self.base_url.join(&format!("v1/hotspots/{address}"))?;
        self.get_json::<Hotspot>(url).await
    }

    /// Fetch the daily reward buckets for a hotspot, most recent first,
    /// bounded to [`REWARD_LOOKBACK_DAYS`].
    pub async fn reward_buckets(&self, address: &str) -> Result<Vec<RewardBucket>, ClientError> {
        let mut url = self.base_url.join(&format!("v1/hotspots/{address}/rewards/sum"))?;
        url.query_pairs_mut()
            .append_pair("min_time", &format!("-{REWARD_LOOKBACK_DAYS} day"))
            .append_pair("bucket", "day");
        self.get_json::<Vec<RewardBucket>>(url).await
    }

    /// Fetch the current oracle price (fixed-point, 8 decimals).
    pub async fn oracle_price(&self) -> Result<OraclePrice, ClientError> {
        let url = self.base_url.join("v1/oracle/prices/current")?;
        self.get_json::<OraclePrice>(url).await
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!("GET {url}");
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::BadStatus { status, url });
        }

        Ok(response.json::<types::Envelope<T>>().await?.data)
    }
}
