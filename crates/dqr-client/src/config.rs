//! Client configuration.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Default vendor API root.
pub const DEFAULT_BASE_URL: &str = "https://100099.pythonanywhere.com/api/v2";

/// Host serving the rendered QR code images. The API reports image URLs on
/// a host that does not serve them; only the last path segment is usable.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "http://67.217.61.253/uploadfiles/qrcode-download";

/// Identity the client acts as. Fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Unique user name, used as `created_by`.
    pub username: String,
    /// Unique user id, sent as `company_id`.
    pub user_id: String,
    /// Dowell API key, sent as the `api_key` query parameter.
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, user_id: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            username: username.into(),
            user_id: user_id.into(),
            api_key,
        }
    }

    /// Read `DOWELL_QR_USERNAME`, `DOWELL_QR_USER_ID` and the optional
    /// `DOWELL_QR_API_KEY`.
    pub fn from_env() -> ClientResult<Self> {
        let username = required_env("DOWELL_QR_USERNAME")?;
        let user_id = required_env("DOWELL_QR_USER_ID")?;
        let api_key = std::env::var("DOWELL_QR_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Self {
            username,
            user_id,
            api_key,
        })
    }
}

fn required_env(name: &str) -> ClientResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(ClientError::config(format!("{} cannot be empty", name))),
        Err(_) => Err(ClientError::config(format!("{} must be set", name))),
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Image download root used to rewrite response URLs
    pub download_base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout_secs: Option<u64> = std::env::var("DOWELL_QR_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());
        let connect_timeout_secs: Option<u64> = std::env::var("DOWELL_QR_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        Self {
            base_url: std::env::var("DOWELL_QR_API_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            download_base_url: std::env::var("DOWELL_QR_DOWNLOAD_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.download_base_url),
            timeout: timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
            connect_timeout: connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        }
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_download_base_url(mut self, download_base_url: impl Into<String>) -> Self {
        self.download_base_url = download_base_url.into().trim_end_matches('/').to_string();
        self
    }
}
