use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::contact::rate_limit::RateLimitPolicy;

const DEFAULT_FROM_EMAIL: &str = "Contact Form <onboarding@resend.dev>";

/// Application configuration loaded from environment variables.
///
/// Mail credentials are optional at startup: without them the site still
/// serves content, and the contact endpoint reports a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub content_dir: PathBuf,
    pub public_dir: PathBuf,
    pub resend_api_key: Option<String>,
    pub contact_email: Option<String>,
    pub from_email: String,
    pub redis_url: Option<String>,
    pub rate_limit: RateLimitPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = RateLimitPolicy::default();
        let max_requests = match optional_env("RATE_LIMIT_MAX") {
            Some(v) => v.parse::<u32>().context("RATE_LIMIT_MAX must be a positive integer")?,
            None => defaults.max_requests,
        };
        let window = match optional_env("RATE_LIMIT_WINDOW_SECS") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .context("RATE_LIMIT_WINDOW_SECS must be a number of seconds")?,
            ),
            None => defaults.window,
        };

        Ok(Config {
            content_dir: optional_env("CONTENT_DIR")
                .unwrap_or_else(|| "content".to_string())
                .into(),
            public_dir: optional_env("PUBLIC_DIR")
                .unwrap_or_else(|| "public".to_string())
                .into(),
            resend_api_key: optional_env("RESEND_API_KEY"),
            contact_email: optional_env("CONTACT_EMAIL"),
            from_email: optional_env("RESEND_FROM_EMAIL")
                .unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            redis_url: optional_env("REDIS_URL"),
            rate_limit: RateLimitPolicy {
                max_requests,
                window,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration rooted at `content_dir`, with defaults everywhere else.
    #[cfg(test)]
    pub fn for_content_dir(content_dir: impl Into<PathBuf>) -> Self {
        let content_dir = content_dir.into();
        Config {
            public_dir: content_dir.clone(),
            content_dir,
            resend_api_key: None,
            contact_email: None,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            redis_url: None,
            rate_limit: RateLimitPolicy::default(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
