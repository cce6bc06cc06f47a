//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `BLOODBANK_*` environment variables or a config file;
//! unset values fall back to local development defaults.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DEFAULT_ACTIVITY_PAGE_SIZE;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

fn default_token_file() -> PathBuf {
    PathBuf::from(".bloodbank").join("token")
}

/// Settings consumed by the `bloodbank` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOODBANK")]
pub struct ClientSettings {
    /// Backend base URL.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 10)]
    pub timeout_secs: u64,
    /// Where the session token is persisted between runs.
    pub token_file: Option<PathBuf>,
    /// Number of dashboard activity events to keep.
    pub activity_page_size: Option<usize>,
}

impl ClientSettings {
    /// Parse the configured base URL, falling back to the local backend.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the configured value is not a URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    /// Return the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Return the token file path, falling back to the default.
    #[must_use]
    pub fn token_file(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(default_token_file)
    }

    /// Return the activity page size, falling back to the default.
    #[must_use]
    pub fn activity_page_size(&self) -> usize {
        self.activity_page_size
            .unwrap_or(DEFAULT_ACTIVITY_PAGE_SIZE)
    }
}
