use async_trait::async_trait;

use super::error::RelayError;
use super::models::OutboundMessage;

/// The upstream push-messaging provider.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Deliver one message and return the provider-assigned message id
    async fn send(&self, message: &OutboundMessage) -> Result<String, RelayError>;

    /// Ask the provider to subscribe a device token to a topic
    async fn subscribe_to_topic(&self, token: &str, topic: &str) -> Result<(), RelayError>;
}
