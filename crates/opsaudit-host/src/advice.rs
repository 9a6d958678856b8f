//! Remediation steps rendered from findings.
//!
//! Every rule looks at one observation and, if it fires, emits a title and
//! a command that can be pasted into a root shell. Rules are independent of
//! the score: a hardened setting that was never scored still gets advice.

use crate::types::{Findings, Priority, Recommendation, ThreatLevel};
use std::net::IpAddr;

const SSHD_CONFIG: &str = "/etc/ssh/sshd_config";
const SUGGESTED_PORT: u16 = 2222;
const MAX_AUTH_TRIES: u32 = 3;
const MAX_GRACE_SECS: u32 = 60;

/// All recommendations for `findings`, ordered by band
#[must_use]
pub fn recommendations(findings: &Findings, threat: ThreatLevel) -> Vec<Recommendation> {
    let mut out = Vec::new();
    critical(findings, threat, &mut out);
    high(findings, threat, &mut out);
    medium(findings, &mut out);
    low(findings, &mut out);
    out
}

fn push(out: &mut Vec<Recommendation>, priority: Priority, title: impl Into<String>, command: impl Into<String>) {
    out.push(Recommendation {
        priority,
        title: title.into(),
        command: command.into(),
    });
}

fn sshd_set(key: &str, value: impl std::fmt::Display) -> String {
    format!("sed -i 's/^#\\?{key}.*/{key} {value}/' {SSHD_CONFIG} && systemctl restart sshd")
}

const FAIL2BAN_INSTALL: &str = "apt install -y fail2ban && systemctl enable --now fail2ban";

fn brute_force(threat: ThreatLevel) -> bool {
    threat >= ThreatLevel::High
}

fn critical(f: &Findings, threat: ThreatLevel, out: &mut Vec<Recommendation>) {
    if !f.ssh.root_login_disabled() {
        push(out, Priority::Critical, "Disable SSH root login", sshd_set("PermitRootLogin", "no"));
    }
    if !f.ssh.password_auth_disabled() {
        push(
            out,
            Priority::Critical,
            "Disable SSH password authentication",
            sshd_set("PasswordAuthentication", "no"),
        );
    }
    if brute_force(threat) && !f.fail2ban.active {
        push(
            out,
            Priority::Critical,
            format!("Brute force in progress ({} failed logins): start fail2ban", f.auth.failed),
            FAIL2BAN_INSTALL,
        );
    }
}

fn high(f: &Findings, threat: ThreatLevel, out: &mut Vec<Recommendation>) {
    if !f.firewall.active {
        push(
            out,
            Priority::High,
            "Enable the firewall",
            format!(
                "ufw default deny incoming && ufw allow {}/tcp && ufw --force enable",
                f.ssh.port_or_default()
            ),
        );
    }
    if !f.fail2ban.active && !brute_force(threat) {
        let command = if f.fail2ban.installed {
            "systemctl enable --now fail2ban"
        } else {
            FAIL2BAN_INSTALL
        };
        push(out, Priority::High, "Run fail2ban against SSH brute force", command);
    }
    if !f.users.nopasswd.is_empty() {
        push(
            out,
            Priority::High,
            format!("Review {} passwordless sudo rule(s)", f.users.nopasswd.len()),
            "grep -rn NOPASSWD /etc/sudoers /etc/sudoers.d/ && visudo",
        );
    }
    if !f.users.extra_root.is_empty() {
        push(
            out,
            Priority::High,
            format!("Remove extra UID 0 account(s): {}", f.users.extra_root.join(", ")),
            format!("userdel {}", f.users.extra_root[0]),
        );
    }
    if let Some(first) = f.containers.unhealthy().next() {
        let count = f.containers.unhealthy().count();
        push(
            out,
            Priority::High,
            format!("Investigate {count} stopped or failing container(s)"),
            format!("docker logs --tail 50 {} && docker ps -a --filter status=exited", first.name),
        );
    }
}

fn medium(f: &Findings, out: &mut Vec<Recommendation>) {
    if f.ssh.port == Some(22) {
        push(
            out,
            Priority::Medium,
            "Move SSH off port 22",
            format!(
                "ufw allow {SUGGESTED_PORT}/tcp && {}",
                sshd_set("Port", SUGGESTED_PORT)
            ),
        );
    }
    if f.ssh.max_auth_tries.is_some_and(|n| n > MAX_AUTH_TRIES) {
        push(
            out,
            Priority::Medium,
            format!("Lower MaxAuthTries to {MAX_AUTH_TRIES}"),
            sshd_set("MaxAuthTries", MAX_AUTH_TRIES),
        );
    }
    if !f.ssh.pubkey_enabled() {
        push(
            out,
            Priority::Medium,
            "Enable public-key authentication",
            sshd_set("PubkeyAuthentication", "yes"),
        );
    }
    let keyless: Vec<&str> = f
        .keys
        .iter()
        .filter(|k| !k.has_keys())
        .map(|k| k.user.as_str())
        .collect();
    if let Some(first) = keyless.first() {
        push(
            out,
            Priority::Medium,
            format!("Install SSH keys for: {}", keyless.join(", ")),
            format!("ssh-copy-id {first}@{}", f.system.hostname),
        );
    }
    if f.ssh.login_grace_time.is_some_and(|s| s > MAX_GRACE_SECS) {
        push(
            out,
            Priority::Medium,
            "Shorten LoginGraceTime",
            sshd_set("LoginGraceTime", 30),
        );
    }
    let worst = f
        .auth
        .top_ips
        .iter()
        .find_map(|t| t.name.parse::<IpAddr>().ok().map(|ip| (ip, t.count)));
    if let Some((ip, count)) = worst {
        push(
            out,
            Priority::Medium,
            format!("Block the most active attacker {ip} ({count} attempts)"),
            format!("ufw deny from {ip}"),
        );
    }
}

fn low(f: &Findings, out: &mut Vec<Recommendation>) {
    push(out, Priority::Low, "Keep packages patched", "apt update && apt upgrade -y");
    push(
        out,
        Priority::Low,
        "Run this audit daily",
        "echo '0 6 * * * root opsaudit audit --no-color > /var/log/opsaudit.log 2>&1' > /etc/cron.d/opsaudit",
    );
    if f.fail2ban.total_banned() > 0 {
        push(
            out,
            Priority::Low,
            format!("Review {} banned address(es)", f.fail2ban.total_banned()),
            "fail2ban-client status sshd",
        );
    }
}
