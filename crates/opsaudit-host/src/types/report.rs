//! Findings and the scored report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AttackerOrigin, AuthLogStats, ContainerStatus, Fail2banStatus, FirewallStatus, KeyStatus,
    Session, SshConfig, UserFindings, NOT_AVAILABLE,
};

/// Host identification for the report header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Hostname
    pub hostname: String,
    /// Kernel release
    pub kernel: String,
    /// Distribution pretty name
    pub os: String,
    /// Public address
    pub public_ip: String,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            hostname: NOT_AVAILABLE.to_string(),
            kernel: NOT_AVAILABLE.to_string(),
            os: NOT_AVAILABLE.to_string(),
            public_ip: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Everything observed on the host, collected once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Findings {
    /// When collection finished
    pub collected_at: DateTime<Utc>,
    /// Header data
    pub system: SystemInfo,
    /// SSH daemon settings
    pub ssh: SshConfig,
    /// Logged-in sessions
    pub sessions: Vec<Session>,
    /// fail2ban
    pub fail2ban: Fail2banStatus,
    /// Authentication log statistics
    pub auth: AuthLogStats,
    /// Origins of the top attacking addresses (empty when lookups are off)
    pub origins: Vec<AttackerOrigin>,
    /// Firewall
    pub firewall: FirewallStatus,
    /// Accounts and sudo rules
    pub users: UserFindings,
    /// `authorized_keys` per interactive user
    pub keys: Vec<KeyStatus>,
    /// Containers
    pub containers: ContainerStatus,
}

impl Default for Findings {
    fn default() -> Self {
        Self {
            collected_at: Utc::now(),
            system: SystemInfo::default(),
            ssh: SshConfig::default(),
            sessions: Vec::new(),
            fail2ban: Fail2banStatus::default(),
            auth: AuthLogStats::default(),
            origins: Vec::new(),
            firewall: FirewallStatus::default(),
            users: UserFindings::default(),
            keys: Vec::new(),
            containers: ContainerStatus::default(),
        }
    }
}

/// Threat level derived from the failed-login count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    /// 100 or fewer failures
    Low,
    /// More than 100
    Medium,
    /// More than 500
    High,
    /// More than 1000
    Critical,
}

impl ThreatLevel {
    /// Label as printed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Fix now
    Critical,
    /// Fix soon
    High,
    /// Worth doing
    Medium,
    /// Housekeeping
    Low,
}

impl Priority {
    /// Bands in print order
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Label as printed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remediation step with a command that can be pasted into a root shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Band
    pub priority: Priority,
    /// What to do
    pub title: String,
    /// Shell command that does it
    pub command: String,
}

/// Scored audit result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Raw observations
    pub findings: Findings,
    /// Security score out of 10
    pub score: f64,
    /// Threat level
    pub threat: ThreatLevel,
    /// Recommendations, grouped by band in print order
    pub recommendations: Vec<Recommendation>,
}

impl AuditReport {
    /// Recommendations in one band
    pub fn band(&self, priority: Priority) -> impl Iterator<Item = &Recommendation> {
        self.recommendations
            .iter()
            .filter(move |r| r.priority == priority)
    }
}
