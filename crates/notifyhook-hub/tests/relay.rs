//! End-to-end relay tests against mock provider endpoints.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notifyhook_core::config::RelayConfig;
use notifyhook_core::message::{DispatchOutcome, NotificationRequest};
use notifyhook_hub::Dispatcher;
use notifyhook_hub::api::{ApiState, build_router};

fn config(server: &MockServer) -> RelayConfig {
    config_at(&server.uri())
}

fn config_at(uri: &str) -> RelayConfig {
    RelayConfig::from_toml_str(&format!(
        r#"
        api_key = "e2e-key"

        [transport]
        timeout_secs = 5
        sendmail_path = "true"

        [channels.slack]
        enabled = true
        webhook_url = "{uri}/slack"

        [channels.telegram]
        enabled = true
        bot_token = "42:token"
        chat_id = 1001
        api_base = "{uri}"

        [channels.ntfy]
        enabled = true
        url = "{uri}/"
        topic = "builds"
        token = "tk_1"

        [channels.alerts]
        kind = "teams"
        enabled = true
        webhook_url = "{uri}/teams"
        type = "workflow"

        [channels.discord]
        enabled = false
        webhook_url = "{uri}/discord"
        "#
    ))
    .unwrap()
}

async fn mount_providers(server: &MockServer, telegram_reply: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/slack"))
        .and(body_json(json!({"text": "release 1.2 is out"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bot42:token/sendMessage"))
        .and(body_json(json!({
            "chat_id": "1001",
            "text": "release 1.2 is out",
            "parse_mode": "HTML",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(telegram_reply))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/builds"))
        .and(header("authorization", "Bearer tk_1"))
        .and(body_string("release 1.2 is out"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/discord"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fan_out_over_http() {
    let server = MockServer::start().await;
    mount_providers(&server, json!({"ok": true, "result": {}})).await;

    let dispatcher = Dispatcher::from_config(&config(&server)).unwrap();
    let report = dispatcher
        .dispatch(&NotificationRequest::new("release 1.2 is out"))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.sent(), ["slack", "telegram", "ntfy", "alerts"]);
    assert!(report.errors().is_empty());
}

#[tokio::test]
async fn test_telegram_rejection_is_reported() {
    let server = MockServer::start().await;
    mount_providers(&server, json!({"ok": false, "description": "Bad Request: chat not found"})).await;

    let dispatcher = Dispatcher::from_config(&config(&server)).unwrap();
    let report = dispatcher
        .dispatch(&NotificationRequest::new("release 1.2 is out"))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        report.outcome("telegram"),
        Some(DispatchOutcome::Failed("Bad Request: chat not found".into()))
    );
    assert_eq!(report.sent(), ["slack", "ntfy", "alerts"]);
}

#[tokio::test]
async fn test_provider_down() {
    // Reserve a port, then release it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut config = config_at(&format!("http://127.0.0.1:{}", port));
    config.transport.timeout_secs = 2;

    let dispatcher = Dispatcher::from_config(&config).unwrap();
    let report = dispatcher
        .dispatch(&NotificationRequest::new("hi"))
        .await
        .unwrap();

    assert!(!report.is_success());
    assert!(report.sent().is_empty());
    let failed: Vec<&str> = report.errors().keys().map(String::as_str).collect();
    assert_eq!(failed, ["alerts", "ntfy", "slack", "telegram"]);
    for (name, reason) in report.errors() {
        assert!(
            reason.starts_with("HTTP POST failed to: "),
            "{name}: {reason}"
        );
    }
    assert!(report.errors()["slack"].contains("/slack"));
    assert!(!report.errors()["telegram"].contains("42:token"));
}

#[tokio::test]
async fn test_http_relay_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slack"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server);
    let app = build_router(Arc::new(ApiState::from_config(&config).unwrap()));

    let req = Request::post("/")
        .header("x-api-key", "e2e-key")
        .body(Body::from(r#"{"message":"deploy done","channel":"slack"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"success": true, "sent": ["slack"]}));
}
