//! End-to-end tests for the origin gate.

use nexus_edge::config::EdgeConfig;
use reqwest::Method;
use serde_json::Value;

mod common;

fn config_with_allowlist(origins: &[&str]) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.origins.allowed = origins.iter().map(|o| o.to_string()).collect();
    config
}

#[tokio::test]
async fn test_preflight_short_circuits_with_cors_headers() {
    let (addr, shutdown) = common::start_gateway(config_with_allowlist(&["https://app.test"])).await;

    let res = common::client()
        .request(Method::OPTIONS, format!("http://{}/functions/assist", addr))
        .header("Origin", "https://app.test")
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 204);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://app.test"
    );
    assert_eq!(res.headers()["vary"], "Origin");
    assert!(res.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("OPTIONS"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_rejected_origin_gets_structured_403() {
    let (addr, shutdown) = common::start_gateway(config_with_allowlist(&[
        "https://one.test",
        "https://two.test",
    ]))
    .await;

    let res = common::client()
        .post(format!("http://{}/functions/assist", addr))
        .header("Origin", "https://three.test")
        .json(&serde_json::json!({ "messages": [] }))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 403);
    // The browser still gets CORS headers, pointing at the first
    // allowlist entry.
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://one.test"
    );

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["reason"], "origin_not_allowed");

    shutdown.trigger();
}

#[tokio::test]
async fn test_blocklist_beats_allowlist_end_to_end() {
    // infragrid.v.network is built-in blocked even when allowlisted.
    let (addr, shutdown) = common::start_gateway(config_with_allowlist(&[
        "https://infragrid.v.network",
        "https://safe.test",
    ]))
    .await;

    let res = common::client()
        .post(format!("http://{}/functions/assist", addr))
        .header("Origin", "https://infragrid.v.network")
        .json(&serde_json::json!({ "messages": [] }))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 403);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://safe.test"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_origin_denied_when_allowlist_configured() {
    let (addr, shutdown) = common::start_gateway(config_with_allowlist(&["https://one.test"])).await;

    let res = common::client()
        .post(format!("http://{}/functions/assist", addr))
        .json(&serde_json::json!({ "messages": [] }))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 403);

    shutdown.trigger();
}

#[tokio::test]
async fn test_fail_open_without_allowlist() {
    let (addr, shutdown) = common::start_gateway(EdgeConfig::default()).await;

    let res = common::client()
        .post(format!("http://{}/functions/assist", addr))
        .header("Origin", "https://anywhere.test")
        .json(&serde_json::json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .send()
        .await
        .expect("Gateway unreachable");

    // Admitted by the gate; the assist upstream is simply unconfigured.
    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["reason"], "assist_unconfigured");

    shutdown.trigger();
}

#[tokio::test]
async fn test_admitted_origin_is_echoed_on_handler_responses() {
    let (addr, shutdown) = common::start_gateway(config_with_allowlist(&["https://app.test"])).await;

    let res = common::client()
        .post(format!("http://{}/functions/assist", addr))
        .header("Origin", "https://app.test")
        .json(&serde_json::json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .send()
        .await
        .expect("Gateway unreachable");

    // Handler outcome (503: assist unconfigured) carries the exact echo.
    assert_eq!(res.status(), 503);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "https://app.test"
    );
    assert_eq!(res.headers()["vary"], "Origin");

    shutdown.trigger();
}

#[tokio::test]
async fn test_healthz_bypasses_the_gate() {
    let (addr, shutdown) = common::start_gateway(config_with_allowlist(&["https://one.test"])).await;

    // No Origin header, restrictive allowlist: functions deny, healthz
    // answers anyway.
    let res = common::client()
        .get(format!("http://{}/healthz", addr))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    shutdown.trigger();
}
