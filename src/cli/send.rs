use anyhow::Result;
use serde_json::Value;

use crate::api::init_tracing;
use crate::core::AppConfig;
use crate::google;
use crate::notify::{NotificationRequest, dispatch};

pub struct SendArgs {
    pub token: Option<String>,
    pub topic: Option<String>,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub msg_id: Option<String>,
}

/// Send one notification using the same validation as the HTTP API
pub async fn run(args: SendArgs) -> Result<()> {
    init_tracing();
    let config = AppConfig::from_env()?;
    let transport = google::fcm_client(&config)?;

    let msg_id = args
        .msg_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let request = NotificationRequest {
        token: args.token,
        topic: args.topic,
        title: Some(args.title),
        body: Some(args.body),
        image: args.image,
        msg_id: Some(Value::String(msg_id.clone())),
    };

    let message_id = dispatch(
        &transport,
        &request,
        &config.send_policy,
        config.request_timeout,
    )
    .await?;
    println!("Sent {} (msg_id {})", message_id, msg_id);
    Ok(())
}
