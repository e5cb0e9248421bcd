//! Test utilities for integration tests
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};
use mockito::{Mock, ServerGuard};
use reqwest::Client;

use pushrelay::api::AppState;
use pushrelay::api::app;
use pushrelay::core::AppConfig;
use pushrelay::google::{FcmClient, ServiceAccountKey, ServiceAccountTokenProvider};
use pushrelay::notify::SendPolicy;

pub const SERVICE_ACCOUNT: &str = include_str!("../fixtures/service_account.json");

/// Creates a test application router whose upstream (token endpoint,
/// FCM and Instance ID APIs) is the given mock server.
pub fn test_app(server: &ServerGuard, send_policy: SendPolicy) -> Router {
    let app_config = AppConfig {
        host: String::from("127.0.0.1"),
        port: String::from("0"),
        service_account_json: Some(SERVICE_ACCOUNT.to_string()),
        service_account_path: String::from("test_service_account_path"),
        fcm_api_url: server.url(),
        iid_api_url: server.url(),
        send_policy,
        request_timeout: Duration::from_secs(5),
    };

    let mut key = ServiceAccountKey::from_config(&app_config).unwrap();
    key.token_uri = format!("{}/token", server.url());

    let client = Client::new();
    let tokens = ServiceAccountTokenProvider::new(key, client.clone());
    let transport = FcmClient::new(
        client,
        Arc::new(tokens),
        "relay-test",
        &app_config.fcm_api_url,
        &app_config.iid_api_url,
    );

    let app_state = AppState::new(Arc::new(transport), app_config);
    app(Arc::new(app_state))
}

/// Mocks a successful OAuth token exchange
pub async fn mock_token(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "ya29.test", "expires_in": 3599, "token_type": "Bearer"}"#)
        .create_async()
        .await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
