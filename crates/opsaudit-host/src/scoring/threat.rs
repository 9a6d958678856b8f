//! Threat level from failed logins.

use crate::types::ThreatLevel;

/// Above this many failures the threat is critical
pub const CRITICAL_ABOVE: u64 = 1000;
/// Above this many failures the threat is high
pub const HIGH_ABOVE: u64 = 500;
/// Above this many failures the threat is medium
pub const MEDIUM_ABOVE: u64 = 100;

/// Step function of the failed-password count
#[must_use]
pub const fn threat_level(failed: u64) -> ThreatLevel {
    if failed > CRITICAL_ABOVE {
        ThreatLevel::Critical
    } else if failed > HIGH_ABOVE {
        ThreatLevel::High
    } else if failed > MEDIUM_ABOVE {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}
