//! Security score and threat level.

pub mod threat;
pub mod weights;

pub use threat::threat_level;
pub use weights::{ScoreWeights, MAX_SCORE};

use crate::types::Findings;

/// Additive score over satisfied conditions, clamped to [`MAX_SCORE`]
#[must_use]
pub fn security_score(findings: &Findings, weights: &ScoreWeights) -> f64 {
    let ssh = &findings.ssh;
    let checks = [
        (ssh.root_login_disabled(), weights.root_login_disabled),
        (ssh.password_auth_disabled(), weights.password_auth_disabled),
        (ssh.pubkey_enabled(), weights.pubkey_enabled),
        (findings.firewall.active, weights.firewall_active),
        (ssh.port_changed(), weights.port_changed),
        (findings.containers.all_healthy(), weights.containers_healthy),
        (findings.fail2ban.active, weights.fail2ban_active),
    ];
    let total: f64 = checks
        .iter()
        .filter(|(passed, _)| *passed)
        .map(|(_, weight)| weight)
        .sum();
    total.min(MAX_SCORE)
}
