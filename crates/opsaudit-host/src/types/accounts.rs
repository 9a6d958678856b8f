//! Local accounts, sessions and keys.

use serde::{Deserialize, Serialize};

/// A logged-in session as reported by `who`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Login name
    pub user: String,
    /// Terminal line
    pub tty: String,
    /// Login time as printed
    pub since: String,
    /// Remote host, for network logins
    pub from: Option<String>,
}

/// An account from `/etc/passwd`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Login name
    pub name: String,
    /// Numeric user ID
    pub uid: u32,
    /// Home directory
    pub home: String,
    /// Login shell
    pub shell: String,
}

/// Account-related findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFindings {
    /// Accounts with an interactive login shell
    pub interactive: Vec<UserAccount>,
    /// Accounts other than `root` with UID 0
    pub extra_root: Vec<String>,
    /// Sudo rules granting `NOPASSWD`, as `file: rule`
    pub nopasswd: Vec<String>,
}

/// `authorized_keys` state for one interactive user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
    /// Login name
    pub user: String,
    /// Whether `~/.ssh/authorized_keys` exists
    pub has_file: bool,
    /// Number of key entries in it
    pub key_count: usize,
}

impl KeyStatus {
    /// True if the user can log in with at least one key
    #[must_use]
    pub const fn has_keys(&self) -> bool {
        self.key_count > 0
    }
}
