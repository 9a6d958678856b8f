//! SSH daemon settings.

use serde::{Deserialize, Serialize};

/// The subset of `sshd -T` the audit cares about.
///
/// Every field is `None` when `sshd` is missing or its dump failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    /// Listening port (first `port` line)
    pub port: Option<u16>,
    /// `PermitRootLogin` value
    pub permit_root_login: Option<String>,
    /// `PasswordAuthentication` value
    pub password_authentication: Option<String>,
    /// `PubkeyAuthentication` value
    pub pubkey_authentication: Option<String>,
    /// `MaxAuthTries`
    pub max_auth_tries: Option<u32>,
    /// `LoginGraceTime` in seconds
    pub login_grace_time: Option<u32>,
}

impl SshConfig {
    /// Root login counts as disabled only when explicitly `no`
    #[must_use]
    pub fn root_login_disabled(&self) -> bool {
        self.permit_root_login.as_deref() == Some("no")
    }

    /// Password authentication is explicitly `no`
    #[must_use]
    pub fn password_auth_disabled(&self) -> bool {
        self.password_authentication.as_deref() == Some("no")
    }

    /// Public-key authentication is explicitly `yes`
    #[must_use]
    pub fn pubkey_enabled(&self) -> bool {
        self.pubkey_authentication.as_deref() == Some("yes")
    }

    /// The port is known and is not 22
    #[must_use]
    pub fn port_changed(&self) -> bool {
        self.port.is_some_and(|p| p != 22)
    }

    /// Port to open in firewall suggestions
    #[must_use]
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(22)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_values_are_not_hardened() {
        let cfg = SshConfig::default();
        assert!(!cfg.root_login_disabled());
        assert!(!cfg.password_auth_disabled());
        assert!(!cfg.pubkey_enabled());
        assert!(!cfg.port_changed());
        assert_eq!(cfg.port_or_default(), 22);
    }

    #[test]
    fn prohibit_password_is_not_disabled() {
        let cfg = SshConfig {
            permit_root_login: Some("prohibit-password".into()),
            ..SshConfig::default()
        };
        assert!(!cfg.root_login_disabled());
    }
}
