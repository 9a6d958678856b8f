use opsaudit_core::OpsError;
use thiserror::Error;

/// Result type alias for host audit operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that stop a host audit
#[derive(Error, Debug)]
pub enum HostError {
    /// The audit reads root-only files and runs root-only commands
    #[error("this audit must run as root (effective uid {euid})")]
    NotRoot {
        /// Effective UID of the process
        euid: u32,
    },
}

impl From<HostError> for OpsError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::NotRoot { euid } => {
                Self::PermissionDenied(format!("must run as root (effective uid {euid})"))
            }
        }
    }
}
