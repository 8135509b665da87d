//! Feed configuration.
//!
//! The services never read the environment themselves; hosts build a
//! [`FeedConfig`] (usually through [`FeedConfig::from_env`]) and hand it in.

use std::env;
use std::fmt;

use chrono::Duration;

pub const DEFAULT_FEED_TITLE: &str = "Magnet Downloads";
pub const DEFAULT_FEED_URL: &str = "http://localhost:8080/feeds/{token}";
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_ACTIVE_SECS: i64 = 24 * 60 * 60;

/// Placeholder replaced with the user's feed token in the URL template.
pub const TOKEN_PLACEHOLDER: &str = "{token}";

#[derive(Clone)]
pub struct FeedConfig {
    /// Secret salt for feed tokens. Changing it changes every new token.
    pub salt: String,
    /// Self-link template, e.g. `https://example.org/feeds/{token}`
    pub feed_url_template: String,
    /// Items per feed
    pub page_size: usize,
    /// A feed polled more recently than this counts as active
    pub active_threshold: Duration,
    pub title: String,
}

impl FeedConfig {
    /// Config with defaults for everything except the salt.
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            feed_url_template: DEFAULT_FEED_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            active_threshold: Duration::seconds(DEFAULT_ACTIVE_SECS),
            title: DEFAULT_FEED_TITLE.to_string(),
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source. `from_env` is this over the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let salt = lookup("MAGNET_FEED_SALT").ok_or(ConfigError::Missing("MAGNET_FEED_SALT"))?;
        let mut config = Self::new(salt.trim());

        if let Some(url) = lookup("MAGNET_FEED_URL") {
            config.feed_url_template = url.trim().to_string();
        }
        if let Some(raw) = lookup("MAGNET_FEED_PAGE_SIZE") {
            config.page_size = parse_var("MAGNET_FEED_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("MAGNET_FEED_ACTIVE_SECS") {
            let secs: i64 = parse_var("MAGNET_FEED_ACTIVE_SECS", &raw)?;
            config.active_threshold = Duration::seconds(secs);
        }
        if let Some(title) = lookup("MAGNET_FEED_TITLE") {
            config.title = title;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.salt.trim().is_empty() {
            return Err(ConfigError::EmptySalt);
        }
        if !self.feed_url_template.contains(TOKEN_PLACEHOLDER) {
            return Err(ConfigError::Invalid {
                var: "MAGNET_FEED_URL",
                reason: format!("must contain {}", TOKEN_PLACEHOLDER),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "MAGNET_FEED_PAGE_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.active_threshold <= Duration::zero() {
            return Err(ConfigError::Invalid {
                var: "MAGNET_FEED_ACTIVE_SECS",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Public URL of a user's feed.
    pub fn feed_url(&self, token: &str) -> String {
        self.feed_url_template.replace(TOKEN_PLACEHOLDER, token)
    }
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("salt", &"<redacted>")
            .field("feed_url_template", &self.feed_url_template)
            .field("page_size", &self.page_size)
            .field("active_threshold", &self.active_threshold)
            .field("title", &self.title)
            .finish()
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Feed token salt must not be empty")]
    EmptySalt,

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
