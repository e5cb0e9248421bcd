//! Turns a notification request into exactly one upstream call.
//!
//! A request either resolves to a single outbound message or is
//! rejected before anything is sent. Sends are attempted once, are
//! bounded by a timeout, and never touch the subscription registry.

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;

use super::error::RelayError;
use super::models::{MessageData, Notification, NotificationRequest, OutboundMessage, Target};
use super::registry::SubscriptionRegistry;
use super::transport::MessagingTransport;

/// Which addresses a send request may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendMode {
    /// Only topic broadcasts. A token in the request is ignored.
    #[default]
    Topic,
    /// A device token or a topic. The token wins when both are given
    /// since it is the more specific target.
    TokenOrTopic,
}

impl FromStr for SendMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topic" => Ok(SendMode::Topic),
            "token-or-topic" => Ok(SendMode::TokenOrTopic),
            other => Err(anyhow!(
                "Invalid send mode '{}', expected 'topic' or 'token-or-topic'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendPolicy {
    pub mode: SendMode,
    pub require_image: bool,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn missing_fields() -> RelayError {
    RelayError::InvalidRequest(String::from("Missing required fields"))
}

/// Validate a request and build the message to send.
pub fn resolve(
    request: &NotificationRequest,
    policy: &SendPolicy,
) -> Result<OutboundMessage, RelayError> {
    let target = match policy.mode {
        SendMode::Topic => non_empty(&request.topic).map(Target::Topic),
        SendMode::TokenOrTopic => non_empty(&request.token)
            .map(Target::Token)
            .or_else(|| non_empty(&request.topic).map(Target::Topic)),
    }
    .ok_or_else(missing_fields)?;

    let title = non_empty(&request.title).ok_or_else(missing_fields)?;
    let body = non_empty(&request.body).ok_or_else(missing_fields)?;
    let msg_id = request.msg_id_string().ok_or_else(missing_fields)?;

    let image = non_empty(&request.image);
    if policy.require_image && image.is_none() {
        return Err(RelayError::InvalidRequest(String::from(
            "Missing required field: image",
        )));
    }

    Ok(OutboundMessage {
        target,
        notification: Notification { title, body, image },
        data: MessageData { msg_id },
    })
}

/// Resolve `request` and send it once. Returns the provider's message id.
pub async fn dispatch(
    transport: &dyn MessagingTransport,
    request: &NotificationRequest,
    policy: &SendPolicy,
    timeout: Duration,
) -> Result<String, RelayError> {
    let message = resolve(request, policy)?;
    tracing::debug!("Dispatching message {:?}", message);

    let message_id = tokio::time::timeout(timeout, transport.send(&message))
        .await
        .map_err(|_| RelayError::Timeout(timeout))??;

    tracing::info!(
        "Sent message {} for msg_id {}",
        message_id,
        message.data.msg_id
    );
    Ok(message_id)
}

/// Subscribe `token` to `topic` upstream, then record it locally. The
/// registry is only updated once the provider has accepted the call.
pub async fn subscribe(
    transport: &dyn MessagingTransport,
    registry: &SubscriptionRegistry,
    token: &str,
    topic: &str,
    timeout: Duration,
) -> Result<(), RelayError> {
    if token.is_empty() || topic.is_empty() {
        return Err(RelayError::InvalidRequest(String::from(
            "Missing token or topic",
        )));
    }

    tokio::time::timeout(timeout, transport.subscribe_to_topic(token, topic))
        .await
        .map_err(|_| RelayError::Timeout(timeout))??;

    registry.record_subscription(token, topic);
    tracing::info!("Subscribed token to topic {}", topic);
    Ok(())
}
