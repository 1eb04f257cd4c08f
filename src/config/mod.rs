use crate::cli::Args;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/n8n";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{0}' cannot be used as a base for API paths")]
    UnsupportedBaseUrl(String),
    #[error("Request timeout must be greater than zero")]
    InvalidTimeout,
}

/// Everything the transport client needs to reach the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
            user_id: None,
        })
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let mut config = Self::new(&args.base_url)?;
        config.timeout = Duration::from_secs(args.timeout_secs);
        config.api_key = args.api_key.clone().filter(|k| !k.trim().is_empty());
        config.user_id = args.user_id.clone().filter(|u| !u.trim().is_empty());
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Appends percent-encoded path segments to the base path.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::UnsupportedBaseUrl(raw.to_string()));
    }
    Ok(url)
}
