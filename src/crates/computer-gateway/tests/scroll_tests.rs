//! Scroll choreography against a scripted daemon.

mod common;

use common::{default_harness, harness, Reply, BASE_URL};
use computer_gateway::{ActionKind, ActionRequest, ErrorKind, GatewayConfig, RetryPolicy};
use serde_json::json;
use std::time::Duration;

fn scroll() -> ActionRequest {
    ActionRequest::new(ActionKind::Scroll)
}

/// Scroll without any focus routine.
fn bare_scroll() -> ActionRequest {
    scroll()
        .with_option("click_to_focus", false)
        .with_option("focus_strategy", "none")
}

fn ms(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_millis).collect()
}

// ============================================================================
// Default choreography
// ============================================================================

#[tokio::test]
async fn test_default_scroll_full_sequence() {
    let (gateway, transport, clock) = default_harness();
    transport.always("POST /input/key PageDown", Reply::json(json!({"status": "scrolled", "screenshot": "aW1n"})));

    let result = gateway.execute(scroll()).await.unwrap();

    assert_eq!(result.output(), Some("scrolled"));
    assert_eq!(result.base64_image(), Some("aW1n"));

    let calls = transport.calls();
    assert_eq!(calls[0].path, "/input/mouse_move");
    assert_eq!(calls[0].payload, Some(json!({"coordinate": [1275, 795]})));
    assert_eq!(calls[1].path, "/input/left_click");
    assert_eq!(calls[1].payload, Some(json!({"coordinate": [1275, 795]})));

    let mut expected_keys = vec!["Escape", "Tab", "Tab", "Tab", "Tab"];
    expected_keys.extend(std::iter::repeat("PageDown").take(10));
    assert_eq!(transport.keys(), expected_keys);

    // 2 focus settles, 5 key settles, 10 steps with a batch pause after the 8th
    let mut expected = ms(&[50; 7]);
    expected.extend(ms(&[100; 8]));
    expected.extend(ms(&[250, 100, 100]));
    assert_eq!(clock.sleeps(), expected);
}

#[tokio::test]
async fn test_key_timeouts() {
    let (gateway, transport, _) = default_harness();

    gateway.execute(scroll().with_option("scroll_amount", 1)).await.unwrap();

    let calls = transport.calls();
    let timeout_of = |key: &str| {
        calls
            .iter()
            .find(|c| c.payload.as_ref().and_then(|p| p.get("text")) == Some(&json!(key)))
            .map(|c| c.timeout)
    };
    assert_eq!(timeout_of("Escape"), Some(Duration::from_secs(10)));
    assert_eq!(timeout_of("Tab"), Some(Duration::from_secs(10)));
    assert_eq!(timeout_of("PageDown"), Some(Duration::from_secs(15)));
    assert_eq!(calls[0].timeout, Duration::from_secs(30));
}

#[tokio::test]
async fn test_scroll_up_by_line() {
    let (gateway, transport, _) = default_harness();

    gateway
        .execute(
            bare_scroll()
                .with_option("scroll_direction", "up")
                .with_option("granularity", "line")
                .with_option("scroll_amount", 3),
        )
        .await
        .unwrap();

    assert_eq!(transport.keys(), vec!["ArrowUp", "ArrowUp", "ArrowUp"]);
}

#[tokio::test]
async fn test_batch_size_comes_from_config() {
    let mut config = GatewayConfig::default();
    config.timing.batch_size = 2;
    let (gateway, _, clock) = harness(config);

    gateway
        .execute(bare_scroll().with_option("scroll_amount", 4))
        .await
        .unwrap();

    assert_eq!(clock.sleeps(), ms(&[100, 250, 100, 250]));
}

// ============================================================================
// Boundary jump
// ============================================================================

#[tokio::test]
async fn test_jump_to_boundary_sends_single_end() {
    let (gateway, transport, _) = default_harness();
    transport.once("POST /input/key End", Reply::ok("at end"));

    let result = gateway
        .execute(bare_scroll().with_option("jump_to_boundary", true))
        .await
        .unwrap();

    assert_eq!(result.output(), Some("at end"));
    assert_eq!(transport.keys(), vec!["End"]);
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_jump_up_sends_home() {
    let (gateway, transport, _) = default_harness();

    gateway
        .execute(
            bare_scroll()
                .with_option("jump_to_boundary", true)
                .with_option("scroll_direction", "up"),
        )
        .await
        .unwrap();

    assert_eq!(transport.keys(), vec!["Home"]);
}

#[tokio::test]
async fn test_failed_boundary_jump_falls_through_to_steps() {
    let config = GatewayConfig::default().with_retry(RetryPolicy::new(0));
    let (gateway, transport, _) = harness(config);
    transport.always("POST /input/key End", Reply::status(500, "no"));

    let result = gateway
        .execute(
            bare_scroll()
                .with_option("jump_to_boundary", true)
                .with_option("scroll_amount", 2),
        )
        .await
        .unwrap();

    assert_eq!(result.output(), Some("ok"));
    assert_eq!(transport.keys(), vec!["End", "PageDown", "PageDown"]);
}

#[tokio::test]
async fn test_boundary_jump_with_undecodable_body_stops() {
    let (gateway, transport, clock) = default_harness();
    transport.always("POST /input/key", Reply::raw("OK"));

    let result = gateway
        .execute(bare_scroll().with_option("jump_to_boundary", true))
        .await
        .unwrap();

    assert!(!result.is_error());
    assert!(result.is_empty());
    assert_eq!(transport.keys(), vec!["End"]);
    assert_eq!(clock.sleep_count(), 0);
}

// ============================================================================
// Step fallback and failure
// ============================================================================

#[tokio::test]
async fn test_step_falls_back_to_next_key() {
    let config = GatewayConfig::default().with_retry(RetryPolicy::new(0));
    let (gateway, transport, _) = harness(config);
    transport.always("POST /input/key PageDown", Reply::status(500, "rejected"));
    transport.always("POST /input/key Space", Reply::ok("spaced"));

    let result = gateway
        .execute(bare_scroll().with_option("scroll_amount", 2))
        .await
        .unwrap();

    assert_eq!(result.output(), Some("spaced"));
    assert_eq!(transport.keys(), vec!["PageDown", "Space", "PageDown", "Space"]);
}

#[tokio::test]
async fn test_undecodable_step_reply_counts_as_accepted() {
    let (gateway, transport, clock) = default_harness();
    transport.always("POST /input/key", Reply::raw("OK"));

    let result = gateway
        .execute(bare_scroll().with_option("scroll_amount", 2))
        .await
        .unwrap();

    assert!(!result.is_error());
    assert_eq!(transport.keys(), vec!["PageDown", "PageDown"]);
    assert_eq!(clock.sleeps(), ms(&[100, 100]));
}

#[tokio::test]
async fn test_all_keys_failing_aborts_first_step() {
    let (gateway, transport, clock) = default_harness();
    for key in ["PageDown", "Space", "ArrowDown"] {
        transport.always(&format!("POST /input/key {}", key), Reply::status(500, key));
    }

    let result = gateway.execute(bare_scroll()).await.unwrap();

    assert_eq!(
        result.error(),
        Some(
            format!(
                "scroll failed: 500 Internal Server Error POST {}/input/key body=ArrowDown",
                BASE_URL
            )
            .as_str()
        )
    );
    // each key gets three attempts; no second step is attempted
    let mut expected = vec!["PageDown"; 3];
    expected.extend(vec!["Space"; 3]);
    expected.extend(vec!["ArrowDown"; 3]);
    assert_eq!(transport.keys(), expected);
    assert_eq!(clock.sleeps(), ms(&[300, 600, 300, 600, 300, 600]));
}

#[tokio::test]
async fn test_scroll_failure_kind() {
    let config = GatewayConfig::default().with_retry(RetryPolicy::new(0));
    let (gateway, transport, _) = harness(config);
    transport.always("POST /input/key PageDown", Reply::Timeout);
    transport.always("POST /input/key Space", Reply::Timeout);
    transport.always("POST /input/key ArrowDown", Reply::Timeout);

    let err = gateway.try_execute(bare_scroll()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ScrollFailure);
    assert_eq!(err.error_code(), "E_SCROLL_FAILURE");
}

// ============================================================================
// Best-effort focus
// ============================================================================

#[tokio::test]
async fn test_focus_failures_are_swallowed() {
    let config = GatewayConfig::default().with_retry(RetryPolicy::new(0));
    let (gateway, transport, _) = harness(config);
    transport.always("POST /input/mouse_move", Reply::status(500, "x"));
    transport.always("POST /input/key Escape", Reply::Timeout);

    let result = gateway
        .execute(scroll().with_option("scroll_amount", 1))
        .await
        .unwrap();

    assert_eq!(result.output(), Some("ok"));
    assert!(!transport.routes().contains(&"POST /input/left_click".to_string()));
    assert_eq!(
        transport.keys(),
        vec!["Escape", "Tab", "Tab", "Tab", "Tab", "PageDown"]
    );
}

#[tokio::test]
async fn test_tab_failure_stops_remaining_tabs() {
    let config = GatewayConfig::default().with_retry(RetryPolicy::new(0));
    let (gateway, transport, _) = harness(config);
    transport
        .once("POST /input/key Tab", Reply::ok("tab"))
        .once("POST /input/key Tab", Reply::status(500, "no"));

    gateway
        .execute(
            scroll()
                .with_option("click_to_focus", false)
                .with_option("focus_strategy", "tab")
                .with_option("focus_tab_count", 8)
                .with_option("scroll_amount", 1),
        )
        .await
        .unwrap();

    assert_eq!(transport.keys(), vec!["Tab", "Tab", "PageDown"]);
}

#[tokio::test]
async fn test_tab_count_is_clamped() {
    let (gateway, transport, _) = default_harness();

    gateway
        .execute(
            scroll()
                .with_option("click_to_focus", false)
                .with_option("focus_strategy", "tab")
                .with_option("focus_tab_count", 50)
                .with_option("scroll_amount", 1),
        )
        .await
        .unwrap();

    let tabs = transport.keys().iter().filter(|k| *k == "Tab").count();
    assert_eq!(tabs, 10);
}

#[tokio::test]
async fn test_focus_on_coordinate() {
    let (gateway, transport, _) = default_harness();

    gateway
        .execute(
            scroll()
                .with_coordinate(300, 400)
                .with_option("focus_target", "coordinate")
                .with_option("focus_strategy", "none")
                .with_option("scroll_amount", 1),
        )
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls[0].path, "/input/mouse_move");
    assert_eq!(calls[0].payload, Some(json!({"coordinate": [300, 400]})));
    assert_eq!(calls[1].path, "/input/left_click");
    assert_eq!(calls[2].path, "/input/key");
}

#[tokio::test]
async fn test_coordinate_focus_without_coordinate_skips_click() {
    let (gateway, transport, _) = default_harness();

    gateway
        .execute(
            scroll()
                .with_option("focus_target", "coordinate")
                .with_option("focus_strategy", "none")
                .with_option("scroll_amount", 1),
        )
        .await
        .unwrap();

    assert_eq!(transport.routes(), vec!["POST /input/key"]);
}

#[tokio::test]
async fn test_move_pointer_premove_is_best_effort() {
    let config = GatewayConfig::default().with_retry(RetryPolicy::new(0));
    let (gateway, transport, clock) = harness(config);
    transport.once("POST /input/mouse_move", Reply::status(500, "busy"));

    gateway
        .execute(
            bare_scroll()
                .with_coordinate(10, 10)
                .with_option("move_pointer", true)
                .with_option("scroll_amount", 1),
        )
        .await
        .unwrap();

    assert_eq!(
        transport.routes(),
        vec!["POST /input/mouse_move", "POST /input/key"]
    );
    // no settle after the failed move
    assert_eq!(clock.sleeps(), ms(&[100]));
}

#[tokio::test]
async fn test_gutter_uses_display_geometry() {
    let config = GatewayConfig::default().with_display(computer_gateway::DisplayConfig::new(1920, 1080));
    let (gateway, transport, _) = harness(config);

    gateway
        .execute(
            scroll()
                .with_option("focus_strategy", "none")
                .with_option("scroll_amount", 1),
        )
        .await
        .unwrap();

    assert_eq!(
        transport.calls()[0].payload,
        Some(json!({"coordinate": [1915, 1075]}))
    );
}
