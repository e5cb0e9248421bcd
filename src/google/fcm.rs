//! Firebase Cloud Messaging transport over the HTTP v1 and Instance ID
//! APIs.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::credentials::TokenProvider;
use crate::notify::{MessagingTransport, OutboundMessage, RelayError, Target};

const TOPIC_PREFIX: &str = "/topics/";

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a OutboundMessage,
}

#[derive(Deserialize)]
struct SendResponse {
    // e.g. projects/my-project/messages/0:1500415314455276%31bd1c9631bd1c96
    name: String,
}

#[derive(Serialize)]
struct BatchAddRequest<'a> {
    to: String,
    registration_tokens: [&'a str; 1],
}

#[derive(Deserialize)]
struct BatchAddResponse {
    #[serde(default)]
    results: Vec<BatchAddResult>,
}

#[derive(Deserialize)]
struct BatchAddResult {
    error: Option<String>,
}

/// Pull a human readable message out of an error body from a Google
/// API. Handles both `{"error": {"message": ..}}` and
/// `{"error": "..."}` shapes.
fn provider_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| match v.get("error")? {
        Value::Object(err) => err.get("message")?.as_str().map(String::from),
        Value::String(err) => Some(err.clone()),
        _ => None,
    });

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_string(),
    }
}

/// Topic name as the Instance ID API expects it, `/topics/<name>`
fn topic_path(topic: &str) -> String {
    if topic.starts_with(TOPIC_PREFIX) {
        topic.to_string()
    } else {
        format!("{}{}", TOPIC_PREFIX, topic)
    }
}

/// The FCM v1 API wants bare topic names, so drop a leading `/topics/`
fn with_bare_topic(message: &OutboundMessage) -> OutboundMessage {
    let mut message = message.clone();
    if let Target::Topic(topic) = &mut message.target
        && let Some(bare) = topic.strip_prefix(TOPIC_PREFIX)
    {
        let bare = bare.to_string();
        *topic = bare;
    }
    message
}

pub struct FcmClient {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
    project_id: String,
    fcm_api_url: String,
    iid_api_url: String,
}

impl FcmClient {
    pub fn new(
        client: Client,
        tokens: Arc<dyn TokenProvider>,
        project_id: &str,
        fcm_api_url: &str,
        iid_api_url: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            project_id: project_id.to_string(),
            fcm_api_url: fcm_api_url.trim_end_matches('/').to_string(),
            iid_api_url: iid_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Attach a bearer token and send, returning the body of a
    /// successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, RelayError> {
        let access_token = self.tokens.access_token().await?;
        let res = request
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RelayError::Transport(provider_error_message(status, &text)));
        }
        Ok(text)
    }
}

#[async_trait]
impl MessagingTransport for FcmClient {
    async fn send(&self, message: &OutboundMessage) -> Result<String, RelayError> {
        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.fcm_api_url, self.project_id
        );
        let message = with_bare_topic(message);
        let request = self.client.post(url).json(&SendRequest { message: &message });

        let text = self.execute(request).await.inspect_err(|e| {
            tracing::error!("Send Error: {}", e);
        })?;
        let response: SendResponse = serde_json::from_str(&text)
            .map_err(|e| RelayError::Transport(format!("Unexpected send response: {}", e)))?;
        Ok(response.name)
    }

    async fn subscribe_to_topic(&self, token: &str, topic: &str) -> Result<(), RelayError> {
        let url = format!("{}/iid/v1:batchAdd", self.iid_api_url);
        let body = BatchAddRequest {
            to: topic_path(topic),
            registration_tokens: [token],
        };
        let request = self
            .client
            .post(url)
            .header("access_token_auth", "true")
            .json(&body);

        let text = self.execute(request).await.inspect_err(|e| {
            tracing::error!("FCM Subscribe Error: {}", e);
        })?;
        let response: BatchAddResponse = serde_json::from_str(&text).map_err(|e| {
            RelayError::Transport(format!("Unexpected subscribe response: {}", e))
        })?;

        // One result per registration token, errors are reported inline
        if let Some(error) = response.results.into_iter().find_map(|r| r.error) {
            tracing::error!("FCM Subscribe Error: {}", error);
            return Err(RelayError::Transport(error));
        }
        Ok(())
    }
}
