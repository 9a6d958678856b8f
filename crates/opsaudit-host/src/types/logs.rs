//! Authentication log statistics.

use serde::{Deserialize, Serialize};

/// A name with an occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Username or address
    pub name: String,
    /// Occurrences
    pub count: u64,
}

/// What the SSH authentication logs say
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthLogStats {
    /// `Failed password` lines
    pub failed: u64,
    /// `Invalid user` lines
    pub invalid_users: u64,
    /// Successful logins
    pub accepted: u64,
    /// Most attacked usernames, most frequent first
    pub top_users: Vec<Tally>,
    /// Most active attacking addresses, most frequent first
    pub top_ips: Vec<Tally>,
    /// Log sources that contributed lines
    pub sources: Vec<String>,
}

/// Where an attacking address appears to come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerOrigin {
    /// Address
    pub ip: String,
    /// Failed attempts from it
    pub count: u64,
    /// Origin description, or "Unknown"
    pub origin: String,
}
