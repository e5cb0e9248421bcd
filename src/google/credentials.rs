//! Service account credentials and the OAuth bearer tokens minted from
//! them.
//!
//! The relay signs a short-lived JWT with the service account key and
//! exchanges it at the account's `token_uri` for an access token
//! scoped to Firebase Cloud Messaging. Tokens are cached and reused
//! until shortly before they expire.

use std::fs;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::core::AppConfig;
use crate::notify::RelayError;

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh this long before the provider says the token expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a Google service account key file the relay needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse service account JSON")
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read service account file {}", path))?;
        Self::from_json(&contents)
    }

    /// Load from the inline JSON in the config when present, otherwise
    /// from the configured key file.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match &config.service_account_json {
            Some(json) => Self::from_json(json),
            None => Self::from_file(&config.service_account_path),
        }
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

/// Supplies bearer tokens for calls to the messaging provider
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, RelayError>;
}

pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    client: Client,
    // Held across a refresh so concurrent callers wait for the new token
    // instead of racing to mint their own
    cached: Mutex<Option<AccessToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(key: ServiceAccountKey, client: Client) -> Self {
        Self {
            key,
            client,
            cached: Mutex::new(None),
        }
    }

    fn signed_assertion(&self) -> Result<String, RelayError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| RelayError::Credential(format!("Invalid service account key: {}", e)))?;
        jsonwebtoken::encode(&header, &claims, &encoding_key)
            .map_err(|e| RelayError::Credential(format!("Failed to sign token request: {}", e)))
    }

    async fn fetch_token(&self) -> Result<AccessToken, RelayError> {
        let assertion = self.signed_assertion()?;
        let requested_at = Instant::now();

        let res = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| RelayError::Credential(format!("Token request failed: {}", e)))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| RelayError::Credential(format!("Token request failed: {}", e)))?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<TokenErrorResponse>(&text) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => format!("{} {}", status, text),
            };
            return Err(RelayError::Credential(format!(
                "Failed to fetch access token: {}",
                reason
            )));
        }

        let token: TokenResponse = serde_json::from_str(&text).map_err(|e| {
            RelayError::Credential(format!("Unexpected token response: {}", e))
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        Ok(AccessToken {
            value: token.access_token,
            refresh_at: requested_at + lifetime,
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, RelayError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        tracing::debug!("Fetching access token for {}", self.key.client_email);
        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../../tests/fixtures/service_account.json");

    fn key_for(server: &mockito::ServerGuard) -> ServiceAccountKey {
        let mut key = ServiceAccountKey::from_json(FIXTURE).unwrap();
        key.token_uri = format!("{}/token", server.url());
        key
    }

    #[test]
    fn test_parse_service_account_key() {
        let key = ServiceAccountKey::from_json(FIXTURE).unwrap();
        assert_eq!(key.project_id, "relay-test");
        assert_eq!(key.private_key_id.as_deref(), Some("test-key-id"));
        assert_eq!(key.client_email, "relay@relay-test.iam.gserviceaccount.com");
    }

    #[test]
    fn test_parse_service_account_key_error() {
        let err = ServiceAccountKey::from_json(r#"{"project_id": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("Failed to parse service account JSON"));
    }

    #[test]
    fn test_from_config_prefers_inline_json() {
        let config = AppConfig {
            service_account_json: Some(FIXTURE.to_string()),
            service_account_path: String::from("/does/not/exist.json"),
            ..Default::default()
        };
        let key = ServiceAccountKey::from_config(&config).unwrap();
        assert_eq!(key.project_id, "relay-test");
    }

    #[test]
    fn test_from_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serviceAccountKey.json");
        fs::write(&path, FIXTURE).unwrap();

        let config = AppConfig {
            service_account_path: path.display().to_string(),
            ..Default::default()
        };
        let key = ServiceAccountKey::from_config(&config).unwrap();
        assert_eq!(key.project_id, "relay-test");
    }

    #[test]
    fn test_from_config_missing_file() {
        let config = AppConfig {
            service_account_path: String::from("/does/not/exist.json"),
            ..Default::default()
        };
        let err = ServiceAccountKey::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("/does/not/exist.json"));
    }

    #[tokio::test]
    async fn test_access_token_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::Regex(
                r"grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.test", "expires_in": 3599, "token_type": "Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = ServiceAccountTokenProvider::new(key_for(&server), Client::new());
        assert_eq!(provider.access_token().await.unwrap(), "ya29.test");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.test");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        // Lifetime shorter than the margin so it is stale immediately
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.short", "expires_in": 30, "token_type": "Bearer"}"#)
            .expect(2)
            .create_async()
            .await;

        let provider = ServiceAccountTokenProvider::new(key_for(&server), Client::new());
        provider.access_token().await.unwrap();
        provider.access_token().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_access_token_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_grant", "error_description": "Invalid JWT Signature."}"#)
            .create_async()
            .await;

        let provider = ServiceAccountTokenProvider::new(key_for(&server), Client::new());
        let err = provider.access_token().await.unwrap_err();

        assert_eq!(
            err,
            RelayError::Credential(String::from(
                "Failed to fetch access token: Invalid JWT Signature."
            ))
        );
    }

    #[tokio::test]
    async fn test_invalid_private_key() {
        let mut key = ServiceAccountKey::from_json(FIXTURE).unwrap();
        key.private_key = String::from("not a key");

        let provider = ServiceAccountTokenProvider::new(key, Client::new());
        let err = provider.access_token().await.unwrap_err();

        assert!(matches!(err, RelayError::Credential(_)));
    }
}
