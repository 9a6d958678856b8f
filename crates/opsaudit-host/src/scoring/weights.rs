//! Score weight presets.

/// Upper bound of the security score
pub const MAX_SCORE: f64 = 10.0;

/// Points awarded per satisfied condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// `PermitRootLogin no`
    pub root_login_disabled: f64,
    /// `PasswordAuthentication no`
    pub password_auth_disabled: f64,
    /// `PubkeyAuthentication yes`
    pub pubkey_enabled: f64,
    /// Firewall front-end active
    pub firewall_active: f64,
    /// SSH port known and not 22
    pub port_changed: f64,
    /// Docker up with no unhealthy containers
    pub containers_healthy: f64,
    /// fail2ban service active
    pub fail2ban_active: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScoreWeights {
    /// The standard weights. All conditions together sum to 8.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            root_login_disabled: 1.5,
            password_auth_disabled: 1.5,
            pubkey_enabled: 1.5,
            firewall_active: 1.0,
            port_changed: 0.5,
            containers_healthy: 1.0,
            fail2ban_active: 1.0,
        }
    }
}
