//! End-to-end refresh cycles against a mock explorer API.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use explorer_client::ExplorerClient;
use hotspot_tray::{
    config::Settings,
    events::{UiEvent, UiEventLoop},
    monitor::{RewardsMonitor, SharedSurface},
    test_utils::RecordingStatusBar,
    view::{DetailRow, StatusIcon},
};
use httpmock::prelude::*;
use tokio_util::sync::CancellationToken;
use url::Url;

fn hotspot_body(address: &str, name: &str, online: bool) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "address": address,
            "name": name,
            "reward_scale": 0.75,
            "status": { "online": if online { "online" } else { "offline" } }
        }
    })
}

fn rewards_body(totals: &[f64]) -> serde_json::Value {
    let data: Vec<serde_json::Value> = totals
        .iter()
        .enumerate()
        .map(|(i, total)| {
            serde_json::json!({
                "total": total,
                "timestamp": format!("2021-04-{:02}T00:00:00Z", 30 - i)
            })
        })
        .collect();
    serde_json::json!({ "data": data })
}

fn price_body(price: u64) -> serde_json::Value {
    serde_json::json!({ "data": { "price": price, "block": 1 } })
}

struct Harness {
    monitor: RewardsMonitor,
    bar: RecordingStatusBar,
}

fn harness(server: &MockServer, addresses: &[&str]) -> Harness {
    let settings = Settings {
        refresh_minutes: 1,
        account_addresses: vec![],
        hotspot_addresses: addresses.iter().map(|s| s.to_string()).collect(),
    };
    let client = ExplorerClient::new(Url::parse(&server.base_url()).unwrap()).unwrap();
    let bar = RecordingStatusBar::new();
    let surface: SharedSurface = Arc::new(Mutex::new(bar.clone()));
    Harness { monitor: RewardsMonitor::new(client, Arc::new(settings), surface), bar }
}

#[tokio::test]
async fn single_hotspot_cycle_publishes_rewards_and_deltas() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1");
        then.status(200).json_body(hotspot_body("hs1", "tall-plum-griffin", true));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1/rewards/sum");
        then.status(200).json_body(rewards_body(&[10.0, 5.0, 5.0]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(200).json_body(price_body(50_000_000));
    });

    let h = harness(&server, &["hs1"]);
    assert_eq!(h.monitor.discover_hotspots().await.unwrap(), 1);
    h.monitor.refresh_cycle().await.unwrap();

    // day 0 = 10, day 1 = 5: current 10, previous 5, delta +5 => +100.00%
    assert_eq!(h.bar.title(), "10.00 HNT");
    let row = h.bar.row(0);
    assert_eq!(row.title, "10.00 HNT - tall-plum-griffin");
    assert_eq!(row.icon, Some(StatusIcon::OnlineUp));
    assert_eq!(row.details[&DetailRow::Status], "Status: online");
    assert_eq!(row.details[&DetailRow::Scale], "Reward scale: 0.75");
    assert_eq!(row.details[&DetailRow::Reward24h], "24H - 10.00 HNT / +100.00%");
    // 3 buckets against a 30 day window degrade to a partial sum: all 20 in
    // "current", nothing previous, so no percentage is rendered.
    assert_eq!(row.details[&DetailRow::Reward30d], "30D - 20.00 HNT");
    assert_eq!(row.details[&DetailRow::Explorer], "Open Helium explorer...");
    assert_eq!(h.bar.tooltip(), "1 hotspots tracked");
}

#[tokio::test]
async fn equal_rewards_rank_in_address_order() {
    let server = MockServer::start();
    for addr in ["hsA", "hsB"] {
        server.mock(|when, then| {
            when.method(GET).path(format!("/v1/hotspots/{addr}"));
            then.status(200).json_body(hotspot_body(addr, &format!("name-{addr}"), true));
        });
        server.mock(|when, then| {
            when.method(GET).path(format!("/v1/hotspots/{addr}/rewards/sum"));
            then.status(200).json_body(rewards_body(&[3.0, 1.0]));
        });
    }
    server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(200).json_body(price_body(1));
    });

    let h = harness(&server, &["hsB", "hsA"]);
    h.monitor.discover_hotspots().await.unwrap();
    h.monitor.refresh_cycle().await.unwrap();

    // Tie on 3.0: enumeration is sorted by address, so hsA stays first.
    let rows = h.bar.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "3.00 HNT - name-hsA");
    assert_eq!(rows[1].title, "3.00 HNT - name-hsB");
    assert_eq!(h.bar.title(), "6.00 HNT");
}

#[tokio::test]
async fn currency_toggle_rerenders_the_last_snapshot() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1");
        then.status(200).json_body(hotspot_body("hs1", "griffin", true));
    });
    let rewards = server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1/rewards/sum");
        then.status(200).json_body(rewards_body(&[10.0]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(200).json_body(price_body(50_000_000)); // 0.5 USD per HNT
    });

    let h = harness(&server, &["hs1"]);
    h.monitor.discover_hotspots().await.unwrap();
    h.monitor.refresh_cycle().await.unwrap();
    assert_eq!(h.bar.title(), "10.00 HNT");
    rewards.assert_hits(1);

    let (_tx, rx) = async_channel::bounded(8);
    let events = UiEventLoop::new(h.monitor.clone(), rx, PathBuf::from("/tmp/settings.json"));
    let cancel = CancellationToken::new();

    events.handle(UiEvent::DisplayUsd, &cancel);
    assert_eq!(h.bar.title(), "5.00 USD");
    // Re-render only, no extra fetch.
    rewards.assert_hits(1);

    events.handle(UiEvent::DisplayHnt, &cancel);
    assert_eq!(h.bar.title(), "10.00 HNT");
    assert_eq!(h.monitor.ranked_address(0).as_deref(), Some("hs1"));
    assert_eq!(h.monitor.ranked_address(5), None);

    events.handle(UiEvent::Quit, &cancel);
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn failed_reward_fetch_keeps_the_previous_series() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1");
        then.status(200).json_body(hotspot_body("hs1", "griffin", true));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(200).json_body(price_body(1));
    });
    let mut rewards_ok = server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1/rewards/sum");
        then.status(200).json_body(rewards_body(&[10.0, 5.0]));
    });

    let h = harness(&server, &["hs1"]);
    h.monitor.discover_hotspots().await.unwrap();
    h.monitor.refresh_cycle().await.unwrap();
    assert_eq!(h.bar.title(), "10.00 HNT");

    // Second cycle: the rewards endpoint starts failing. The previous
    // series stays in place and still contributes to the total.
    rewards_ok.delete();
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1/rewards/sum");
        then.status(500);
    });

    h.monitor.refresh_cycle().await.unwrap();
    assert_eq!(h.bar.title(), "10.00 HNT");
    let row = h.bar.row(0);
    assert_eq!(row.details[&DetailRow::Reward24h], "24H - 10.00 HNT / +100.00%");
}

#[tokio::test]
async fn first_cycle_price_failure_is_fatal_later_ones_soft() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1");
        then.status(200).json_body(hotspot_body("hs1", "griffin", true));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1/rewards/sum");
        then.status(200).json_body(rewards_body(&[2.0]));
    });
    let mut price_down = server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(503);
    });

    let h = harness(&server, &["hs1"]);
    h.monitor.discover_hotspots().await.unwrap();

    // Price unavailable on the very first cycle: cannot start.
    assert!(h.monitor.refresh_cycle().await.is_err());

    // Once a cycle has succeeded, a price outage only degrades the cycle.
    price_down.delete();
    let mut price_up = server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(200).json_body(price_body(75_000_000));
    });
    h.monitor.refresh_cycle().await.unwrap();
    assert_eq!(h.bar.title(), "2.00 HNT");

    price_up.delete();
    server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(503);
    });
    h.monitor.refresh_cycle().await.unwrap();

    // Cycle completed on the stale price; USD display still works.
    h.monitor.set_display_unit(hotspot_tray::format::DisplayUnit::Usd);
    h.monitor.publish_last();
    assert_eq!(h.bar.title(), "1.50 USD");
}

#[tokio::test]
async fn discovery_failure_is_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1");
        then.status(500);
    });

    let h = harness(&server, &["hs1"]);
    assert!(h.monitor.discover_hotspots().await.is_err());
}

#[tokio::test]
async fn metadata_refresh_failure_keeps_previous_metadata() {
    let server = MockServer::start();
    let mut meta_ok = server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1");
        then.status(200).json_body(hotspot_body("hs1", "griffin", true));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1/rewards/sum");
        then.status(200).json_body(rewards_body(&[1.0]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/oracle/prices/current");
        then.status(200).json_body(price_body(1));
    });

    let h = harness(&server, &["hs1"]);
    h.monitor.discover_hotspots().await.unwrap();
    // First cycle skips the metadata refresh entirely.
    h.monitor.refresh_cycle().await.unwrap();
    meta_ok.assert_hits(1); // discovery only

    // Second cycle refreshes metadata and hits a failure: the hotspot keeps
    // its previous name and status.
    meta_ok.delete();
    server.mock(|when, then| {
        when.method(GET).path("/v1/hotspots/hs1");
        then.status(502);
    });
    h.monitor.refresh_cycle().await.unwrap();
    assert_eq!(h.bar.row(0).title, "1.00 HNT - griffin");
}
