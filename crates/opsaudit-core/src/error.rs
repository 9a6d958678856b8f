use thiserror::Error;

/// Result type alias for opsaudit operations
pub type Result<T> = std::result::Result<T, OpsError>;

/// Errors that can occur while collecting or analysing data
#[derive(Error, Debug)]
pub enum OpsError {
    /// A required external tool is not installed
    #[error("required tool not found: {0}")]
    ToolMissing(String),

    /// Cloud credentials are missing, expired or rejected
    #[error("AWS credentials invalid or missing: {0}")]
    Credentials(String),

    /// The operation needs more privileges than the process has
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// An external command exited unsuccessfully
    #[error("`{program}` failed (exit {code:?}): {stderr}")]
    CommandFailed {
        /// Program that was run
        program: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Trimmed standard error
        stderr: String,
    },

    /// An external command did not finish in time
    #[error("`{program}` timed out after {seconds} seconds")]
    Timeout {
        /// Program that was run
        program: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// Spawning or reading from a process failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Date string is not a well-formed `YYYY-MM-DD` calendar date
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Period end does not follow its start
    #[error("invalid period: end {end} must be after start {start}")]
    InvalidPeriod {
        /// Period start as given
        start: String,
        /// Period end as given
        end: String,
    },

    /// Wrong number or shape of arguments
    #[error("usage error: {0}")]
    Usage(String),

    /// Output from an external tool could not be interpreted
    #[error("could not parse {what}: {detail}")]
    Parse {
        /// What was being parsed
        what: String,
        /// Why it failed
        detail: String,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl OpsError {
    /// Shorthand for a [`OpsError::Parse`] error
    pub fn parse(what: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Parse {
            what: what.into(),
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_message_includes_program() {
        let err = OpsError::CommandFailed {
            program: "aws".into(),
            code: Some(255),
            stderr: "Unable to locate credentials".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("`aws`"));
        assert!(msg.contains("255"));
        assert!(msg.contains("Unable to locate credentials"));
    }
}
