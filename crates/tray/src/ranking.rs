//! Orders hotspots by their current-period reward.

/// One row of the per-cycle ranking, rebuilt from scratch every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub address: String,
    pub name: String,
    /// Metric the ranking sorts on: reward earned over the last 24h window.
    pub reward: f64,
}

/// Sort entries by descending reward.
///
/// The sort is stable, so entries with equal rewards keep the order they
/// were accumulated in. The refresh cycle enumerates hotspots sorted by
/// address, which makes tie-breaks deterministic across runs.
pub fn rank_by_reward(mut entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| b.reward.partial_cmp(&a.reward).unwrap_or(std::cmp::Ordering::Equal));
    entries
}
