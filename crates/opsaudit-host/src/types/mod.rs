//! Observations collected from the host and the report built from them.

pub mod accounts;
pub mod logs;
pub mod report;
pub mod services;
pub mod ssh;

pub use accounts::{KeyStatus, Session, UserAccount, UserFindings};
pub use logs::{AttackerOrigin, AuthLogStats, Tally};
pub use report::{AuditReport, Findings, Priority, Recommendation, SystemInfo, ThreatLevel};
pub use services::{
    Container, ContainerStatus, Fail2banStatus, FirewallBackend, FirewallStatus, JailStatus,
};
pub use ssh::SshConfig;

/// Placeholder printed for anything that could not be determined
pub const NOT_AVAILABLE: &str = "N/A";
