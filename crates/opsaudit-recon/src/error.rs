use opsaudit_core::OpsError;
use thiserror::Error;

/// Result type alias for lookup operations
pub type ReconResult<T> = std::result::Result<T, ReconError>;

/// Errors from origin and public-IP lookups
#[derive(Error, Debug)]
pub enum ReconError {
    /// WHOIS lookup error
    #[error("WHOIS error: {0}")]
    Whois(String),

    /// DNS resolution error
    #[error("DNS error: {0}")]
    Dns(String),

    /// `host` lookup error
    #[error("host lookup error: {0}")]
    Host(String),

    /// HTTP error while discovering the public address
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid IP address
    #[error("invalid IP address: {0}")]
    InvalidIp(String),

    /// Timeout
    #[error("lookup timed out after {0}s")]
    Timeout(u64),

    /// Failure running an external command
    #[error(transparent)]
    Command(#[from] OpsError),
}

impl From<ReconError> for OpsError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Command(e) => e,
            ReconError::Timeout(seconds) => Self::Timeout {
                program: "lookup".to_string(),
                seconds,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}
