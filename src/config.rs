use std::time::Duration;

use reqwest::Url;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

/// Production zone API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.abion.com";

/// Upper bound for a single HTTP call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("API key is not a valid header value")]
    InvalidApiKey,
    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}

/// Everything the zone API client needs. The credential is passed in by the caller.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String, // e.g. "https://api.abion.com"
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parsed endpoint; it must be an absolute http(s) URL that can carry a path.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };

        let url = Url::parse(&self.base_url).map_err(|err| invalid(&err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base"));
        }
        Ok(url)
    }

    /// `X-API-KEY` value, flagged sensitive so it is redacted from debug output.
    pub fn api_key_header(&self) -> Result<HeaderValue, ConfigError> {
        let mut value = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|_| ConfigError::InvalidApiKey)?;
        value.set_sensitive(true);
        Ok(value)
    }
}
