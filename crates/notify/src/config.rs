use std::env;

use eyre::{Result, WrapErr};

/// Outbound mail settings.
///
/// - `MAIL_API_URL`: HTTP endpoint of the mail relay (optional; unset means log only)
/// - `MAIL_API_KEY`: bearer token for the relay (optional)
/// - `MAIL_DEFAULT_SENDER`: From address (default: "no-reply@medsync.local")
/// - `MAIL_TIMEOUT_SECONDS`: per-request timeout (default: 10)
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub default_sender: String,
    pub timeout_seconds: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            mail_api_url: None,
            mail_api_key: None,
            default_sender: "no-reply@medsync.local".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl NotifyConfig {
    pub fn from_env() -> Result<Self> {
        let mail_api_url = env::var("MAIL_API_URL").ok().filter(|v| !v.trim().is_empty());
        let mail_api_key = env::var("MAIL_API_KEY").ok().filter(|v| !v.trim().is_empty());
        let default_sender = env::var("MAIL_DEFAULT_SENDER")
            .unwrap_or_else(|_| "no-reply@medsync.local".to_string());
        let timeout_seconds = env::var("MAIL_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .wrap_err("Invalid MAIL_TIMEOUT_SECONDS value")?;

        Ok(Self {
            mail_api_url,
            mail_api_key,
            default_sender,
            timeout_seconds,
        })
    }
}
