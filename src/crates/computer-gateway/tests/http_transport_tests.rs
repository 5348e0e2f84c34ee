//! Real-HTTP tests against a mock daemon.

use computer_gateway::{
    ActionKind, ActionRequest, ComputerGateway, Coordinate, DesktopClient, ErrorKind,
    GatewayConfig, RetryPolicy,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry_config(uri: &str) -> GatewayConfig {
    GatewayConfig::new(uri).with_retry(RetryPolicy::new(2).with_base_delay(0.01))
}

#[tokio::test]
async fn test_screenshot_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screenshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"image": "aGVsbG8="})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ComputerGateway::new(GatewayConfig::new(server.uri())).unwrap();
    let result = gateway
        .execute(ActionRequest::new(ActionKind::Screenshot))
        .await
        .unwrap();

    assert_eq!(result.base64_image(), Some("aGVsbG8="));
}

#[tokio::test]
async fn test_click_sends_json_payloads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/input/mouse_move"))
        .and(body_json(json!({"coordinate": [100, 200]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "moved"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/input/left_click"))
        .and(body_json(json!({"coordinate": [100, 200]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "clicked"})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ComputerGateway::new(GatewayConfig::new(server.uri())).unwrap();
    let result = gateway
        .execute(ActionRequest::new(ActionKind::LeftClick).with_coordinate(100, 200))
        .await
        .unwrap();

    assert_eq!(result.output(), Some("clicked"));
}

#[tokio::test]
async fn test_server_error_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/input/key"))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .expect(3)
        .mount(&server)
        .await;

    let gateway = ComputerGateway::new(fast_retry_config(&server.uri())).unwrap();
    let result = gateway
        .execute(ActionRequest::new(ActionKind::Key).with_text("Return"))
        .await
        .unwrap();

    assert_eq!(
        result.error(),
        Some(
            format!(
                "API request failed: 503 Service Unavailable POST {}/input/key body=warming up",
                server.uri()
            )
            .as_str()
        )
    );
}

#[tokio::test]
async fn test_non_json_success_body_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/input/type"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ComputerGateway::new(fast_retry_config(&server.uri())).unwrap();
    let err = gateway
        .try_execute(ActionRequest::new(ActionKind::Type).with_text("hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidBody);
}

#[tokio::test]
async fn test_slow_daemon_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screenshot"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"image": "late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = GatewayConfig::new(server.uri())
        .with_timeout(0.2)
        .with_retry(RetryPolicy::new(0));
    let gateway = ComputerGateway::new(config).unwrap();

    let result = gateway
        .execute(ActionRequest::new(ActionKind::Screenshot))
        .await
        .unwrap();

    assert_eq!(
        result.error(),
        Some(format!("API request failed: timeout GET {}/screenshot", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_unreachable_daemon_is_transport_error() {
    let config = GatewayConfig::new("http://127.0.0.1:9").with_retry(RetryPolicy::new(0));
    let gateway = ComputerGateway::new(config).unwrap();

    let err = gateway
        .try_execute(ActionRequest::new(ActionKind::CursorPosition))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::Transport | ErrorKind::Timeout));
}

// ============================================================================
// DesktopClient
// ============================================================================

#[tokio::test]
async fn test_desktop_client_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mouse_position"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"x": 640, "y": 400})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/key"))
        .and(body_json(json!({"text": "ctrl+c"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Success"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/left_click"))
        .and(body_json(json!({"x": 1, "y": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
        .mount(&server)
        .await;

    let desktop = DesktopClient::from_url(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap();

    assert_eq!(desktop.base_url(), server.uri());
    assert_eq!(desktop.mouse_position().await.unwrap(), Coordinate::new(640, 400));
    assert!(desktop.key("ctrl+c").await.unwrap());
    assert!(!desktop.left_click(1, 2).await.unwrap());
}

#[tokio::test]
async fn test_desktop_client_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/type"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let desktop = DesktopClient::from_url(&server.uri(), Duration::from_secs(5)).unwrap();
    let err = desktop.type_text("hello").await.unwrap_err();

    assert_eq!(err.error_code(), "E_STATUS");
}
