pub mod credentials;
pub mod fcm;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;

pub use credentials::{ServiceAccountKey, ServiceAccountTokenProvider, TokenProvider};
pub use fcm::FcmClient;

use crate::core::AppConfig;

/// Build an HTTP client bounded by the configured request timeout
pub fn http_client(config: &AppConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Load the service account from the config and build an FCM client that
/// authenticates with it.
pub fn fcm_client(config: &AppConfig) -> Result<FcmClient> {
    let key = ServiceAccountKey::from_config(config)?;
    let project_id = key.project_id.clone();
    let client = http_client(config)?;
    let tokens = ServiceAccountTokenProvider::new(key, client.clone());

    tracing::debug!("Using service account for project {}", project_id);
    Ok(FcmClient::new(
        client,
        Arc::new(tokens),
        &project_id,
        &config.fcm_api_url,
        &config.iid_api_url,
    ))
}
