//! Discover this host's public address.

use crate::error::{ReconError, ReconResult};
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Service that answers with the caller's address as plain text
pub const DEFAULT_URL: &str = "https://api.ipify.org";

/// Public IP lookup over HTTPS
pub struct PublicIp {
    http: reqwest::Client,
    url: String,
}

impl PublicIp {
    /// Create a lookup against [`DEFAULT_URL`] that gives up after `timeout`
    pub fn new(timeout: Duration) -> ReconResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("opsaudit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            url: DEFAULT_URL.to_string(),
        })
    }

    /// Ask a different endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Fetch and parse the address
    pub async fn fetch(&self) -> ReconResult<IpAddr> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let text = body.trim();
        debug!(url = %self.url, answer = text, "public IP");
        text.parse()
            .map_err(|_| ReconError::InvalidIp(text.to_string()))
    }
}
