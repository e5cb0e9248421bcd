use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::notify::{SendMode, SendPolicy};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    // Inline service account JSON, takes precedence over the path
    pub service_account_json: Option<String>,
    pub service_account_path: String,
    pub fcm_api_url: String,
    pub iid_api_url: String,
    pub send_policy: SendPolicy,
    pub request_timeout: Duration,
}

/// Parse PUSH_TIMEOUT_SECS. Zero would time out every upstream call.
fn parse_timeout_secs(secs: &str) -> Result<Duration> {
    let parsed = secs
        .parse::<u64>()
        .with_context(|| format!("Invalid PUSH_TIMEOUT_SECS '{}'", secs))?;
    if parsed == 0 {
        bail!("Invalid PUSH_TIMEOUT_SECS '{}', must be at least 1", secs);
    }
    Ok(Duration::from_secs(parsed))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: String::from("3000"),
            service_account_json: None,
            service_account_path: String::from("./serviceAccountKey.json"),
            fcm_api_url: String::from("https://fcm.googleapis.com"),
            iid_api_url: String::from("https://iid.googleapis.com"),
            send_policy: SendPolicy::default(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Read the config from the environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT").unwrap_or(defaults.port);
        let service_account_json = env::var("GOOGLE_SERVICE_ACCOUNT")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let service_account_path =
            env::var("GOOGLE_SERVICE_ACCOUNT_PATH").unwrap_or(defaults.service_account_path);
        let fcm_api_url = env::var("FCM_API_URL").unwrap_or(defaults.fcm_api_url);
        let iid_api_url = env::var("IID_API_URL").unwrap_or(defaults.iid_api_url);

        let mode = match env::var("PUSH_SEND_MODE") {
            Ok(mode) => mode.parse::<SendMode>()?,
            Err(_) => SendMode::default(),
        };
        let require_image = match env::var("PUSH_REQUIRE_IMAGE") {
            Ok(flag) => flag
                .parse::<bool>()
                .with_context(|| format!("Invalid PUSH_REQUIRE_IMAGE '{}'", flag))?,
            Err(_) => false,
        };
        let request_timeout = match env::var("PUSH_TIMEOUT_SECS") {
            Ok(secs) => parse_timeout_secs(&secs)?,
            Err(_) => defaults.request_timeout,
        };

        Ok(Self {
            host,
            port,
            service_account_json,
            service_account_path,
            fcm_api_url,
            iid_api_url,
            send_policy: SendPolicy {
                mode,
                require_image,
            },
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs("10").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_timeout_secs("1").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_timeout_secs_rejects_zero() {
        let err = parse_timeout_secs("0").unwrap_err();
        assert!(err.to_string().contains("must be at least 1"));
    }

    #[test]
    fn test_parse_timeout_secs_rejects_garbage() {
        assert!(parse_timeout_secs("ten").is_err());
        assert!(parse_timeout_secs("-5").is_err());
    }
}
