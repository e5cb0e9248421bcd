use anyhow::Result;

use crate::core::AppConfig;
use crate::google::{self, ServiceAccountKey, ServiceAccountTokenProvider, TokenProvider};

/// Mint an access token from the configured service account and print
/// it. Useful for checking credentials without starting the server.
pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let key = ServiceAccountKey::from_config(&config)?;
    println!("Authenticating as {} ({})", key.client_email, key.project_id);

    let provider = ServiceAccountTokenProvider::new(key, google::http_client(&config)?);
    let token = provider.access_token().await?;
    println!("{}", token);
    Ok(())
}
