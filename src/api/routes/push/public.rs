//! Public types for the push API
use serde::{Deserialize, Serialize};

pub use crate::notify::NotificationRequest as SendRequest;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SubscribeRequest {
    pub token: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IsSubscribedQuery {
    pub token: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IsSubscribedResponse {
    pub subscribed: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SendResponse {
    pub success: bool,
    #[serde(rename = "messageId")]
    pub message_id: String,
}
