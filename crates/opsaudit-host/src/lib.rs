//! # opsaudit-host
//!
//! Security posture audit of a Linux server.
//!
//! ## Data Flow
//!
//! ```text
//! Phase 1: Collection (best effort, sequential)
//!   sshd -T, who, fail2ban, auth logs, firewall, /etc/passwd,
//!   sudoers, authorized_keys, docker, system header
//!   -> Findings
//!
//! Phase 2: Attacker origin (optional, network)
//!   top attacking IPs -> whois -> reverse DNS -> host -> "Unknown"
//!
//! Phase 3: Scoring
//!   security_score() + threat_level() + recommendations()
//!   -> AuditReport
//! ```

pub mod advice;
pub mod discovery;
pub mod error;
pub mod paths;
pub mod scoring;
pub mod types;

pub use error::{HostError, Result};
pub use paths::HostPaths;
pub use types::*;

use chrono::Utc;
use opsaudit_client::CommandRunner;
use opsaudit_recon::dns::DnsResolver;
use opsaudit_recon::host::HostLookup;
use opsaudit_recon::whois::WhoisClient;
use opsaudit_recon::IpEnricher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Knobs for a single audit run
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Look up where attacking addresses come from
    pub geo_lookup: bool,
    /// Fetch the public address for the header
    pub public_ip_lookup: bool,
    /// Timeout for each network lookup
    pub lookup_timeout: Duration,
    /// How many users and addresses to rank
    pub top: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            geo_lookup: true,
            public_ip_lookup: true,
            lookup_timeout: Duration::from_secs(5),
            top: 10,
        }
    }
}

/// Fail unless the effective UID is 0.
///
/// # Errors
///
/// Returns `HostError::NotRoot` for any other user.
pub fn ensure_root() -> Result<()> {
    let euid = nix::unistd::geteuid();
    if euid.is_root() {
        Ok(())
    } else {
        Err(HostError::NotRoot {
            euid: euid.as_raw(),
        })
    }
}

/// Run every collector once.
///
/// Nothing here fails: each signal falls back to its empty value.
pub async fn collect_findings(
    runner: Arc<dyn CommandRunner>,
    paths: &HostPaths,
    options: &AuditOptions,
) -> Findings {
    let r = runner.as_ref();
    let lookup_timeout = options.public_ip_lookup.then_some(options.lookup_timeout);

    let system = discovery::collect_system(r, paths, lookup_timeout).await;
    let ssh = discovery::collect_sshd(r).await;
    let sessions = discovery::collect_sessions(r).await;
    let fail2ban = discovery::collect_fail2ban(r).await;
    let auth = discovery::collect_auth_log(r, paths, options.top).await;
    let firewall = discovery::collect_firewall(r).await;
    let users = discovery::collect_users(paths).await;
    let keys = discovery::collect_keys(paths, &users.interactive).await;
    let containers = discovery::collect_containers(r, paths).await;

    let origins = if options.geo_lookup && !auth.top_ips.is_empty() {
        attacker_origins(runner.clone(), &auth, options.lookup_timeout).await
    } else {
        Vec::new()
    };

    info!(
        failed = auth.failed,
        firewall = firewall.active,
        fail2ban = fail2ban.active,
        "host findings collected"
    );

    Findings {
        collected_at: Utc::now(),
        system,
        ssh,
        sessions,
        fail2ban,
        auth,
        origins,
        firewall,
        users,
        keys,
        containers,
    }
}

async fn attacker_origins(
    runner: Arc<dyn CommandRunner>,
    auth: &AuthLogStats,
    timeout: Duration,
) -> Vec<AttackerOrigin> {
    let mut enricher = IpEnricher::new().with_source(WhoisClient::new(runner.clone(), timeout));
    match DnsResolver::new(timeout) {
        Ok(dns) => enricher = enricher.with_source(dns),
        Err(e) => warn!(error = %e, "reverse DNS unavailable"),
    }
    enricher = enricher.with_source(HostLookup::new(runner, timeout));
    debug!(sources = enricher.source_count(), "looking up attacker origins");

    let mut out = Vec::with_capacity(auth.top_ips.len());
    for tally in &auth.top_ips {
        out.push(AttackerOrigin {
            ip: tally.name.clone(),
            count: tally.count,
            origin: enricher.origin(&tally.name).await,
        });
    }
    out
}

/// Score, classify and advise
#[must_use]
pub fn build_report(findings: Findings) -> AuditReport {
    let score = scoring::security_score(&findings, &scoring::ScoreWeights::standard());
    let threat = scoring::threat_level(findings.auth.failed);
    let recommendations = advice::recommendations(&findings, threat);
    AuditReport {
        findings,
        score,
        threat,
        recommendations,
    }
}

/// Check privileges, collect, and build the report.
///
/// # Errors
///
/// Returns `HostError::NotRoot` when not running as root.
pub async fn run_audit(
    runner: Arc<dyn CommandRunner>,
    paths: &HostPaths,
    options: &AuditOptions,
) -> Result<AuditReport> {
    ensure_root()?;
    let findings = collect_findings(runner, paths, options).await;
    Ok(build_report(findings))
}
