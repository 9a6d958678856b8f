//! Protective services: fail2ban, the firewall and containers.

use serde::{Deserialize, Serialize};

/// One fail2ban jail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JailStatus {
    /// Jail name
    pub name: String,
    /// Addresses banned right now
    pub currently_banned: u64,
    /// Addresses banned since the service started
    pub total_banned: u64,
    /// Banned addresses
    pub banned_ips: Vec<String>,
}

/// fail2ban state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fail2banStatus {
    /// `fail2ban-client` is on `PATH`
    pub installed: bool,
    /// The service unit reports `active`
    pub active: bool,
    /// Per-jail details
    pub jails: Vec<JailStatus>,
}

impl Fail2banStatus {
    /// Currently banned, summed across jails
    #[must_use]
    pub fn currently_banned(&self) -> u64 {
        self.jails.iter().map(|j| j.currently_banned).sum()
    }

    /// Total banned, summed across jails
    #[must_use]
    pub fn total_banned(&self) -> u64 {
        self.jails.iter().map(|j| j.total_banned).sum()
    }

    /// Every banned address, in jail order
    pub fn banned_ips(&self) -> impl Iterator<Item = &str> {
        self.jails
            .iter()
            .flat_map(|j| j.banned_ips.iter().map(String::as_str))
    }
}

/// Which front-end manages the firewall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallBackend {
    /// Uncomplicated Firewall
    Ufw,
    /// firewalld
    Firewalld,
}

impl std::fmt::Display for FirewallBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ufw => write!(f, "ufw"),
            Self::Firewalld => write!(f, "firewalld"),
        }
    }
}

/// Firewall state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallStatus {
    /// Front-end found, if any
    pub backend: Option<FirewallBackend>,
    /// The front-end reports itself active
    pub active: bool,
    /// Policy of the `INPUT` chain
    pub input_policy: Option<String>,
    /// `DROP` rules in the `INPUT` chain
    pub drop_rules: u32,
    /// Packets matched by those rules
    pub dropped_packets: u64,
}

/// One container from `docker ps -a`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container name
    pub name: String,
    /// Status column as printed
    pub status: String,
}

impl Container {
    /// Unhealthy iff the status mentions neither `healthy` nor `Up`.
    ///
    /// `Up 3 hours (unhealthy)` therefore counts as healthy.
    #[must_use]
    pub fn is_unhealthy(&self) -> bool {
        !self.status.contains("healthy") && !self.status.contains("Up")
    }
}

/// Container runtime state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    /// The socket exists and `docker info` succeeded
    pub available: bool,
    /// All containers, running or not
    pub containers: Vec<Container>,
}

impl ContainerStatus {
    /// Containers considered unhealthy
    pub fn unhealthy(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter().filter(|c| c.is_unhealthy())
    }

    /// Runtime is up and nothing is unhealthy
    #[must_use]
    pub fn all_healthy(&self) -> bool {
        self.available && self.unhealthy().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(status: &str) -> Container {
        Container {
            name: "c".into(),
            status: status.into(),
        }
    }

    #[test]
    fn unhealthy_is_neither_up_nor_healthy() {
        assert!(!container("Up 2 hours").is_unhealthy());
        assert!(!container("Up 5 minutes (healthy)").is_unhealthy());
        assert!(!container("Up 1 minute (unhealthy)").is_unhealthy());
        assert!(container("Exited (137) 3 days ago").is_unhealthy());
        assert!(container("Created").is_unhealthy());
    }

    #[test]
    fn unavailable_runtime_is_never_all_healthy() {
        let status = ContainerStatus::default();
        assert!(!status.all_healthy());

        let status = ContainerStatus {
            available: true,
            containers: vec![container("Up 1 hour")],
        };
        assert!(status.all_healthy());
    }

    #[test]
    fn jail_totals_sum() {
        let status = Fail2banStatus {
            installed: true,
            active: true,
            jails: vec![
                JailStatus {
                    name: "sshd".into(),
                    currently_banned: 2,
                    total_banned: 40,
                    banned_ips: vec!["192.0.2.1".into(), "192.0.2.2".into()],
                },
                JailStatus {
                    name: "nginx-http-auth".into(),
                    currently_banned: 1,
                    total_banned: 3,
                    banned_ips: vec!["198.51.100.9".into()],
                },
            ],
        };
        assert_eq!(status.currently_banned(), 3);
        assert_eq!(status.total_banned(), 43);
        assert_eq!(status.banned_ips().count(), 3);
    }
}
