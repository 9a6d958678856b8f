//! `opsaudit audit` - Security posture of this Linux host.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use opsaudit_client::SystemRunner;
use opsaudit_host::scoring::MAX_SCORE;
use opsaudit_host::{
    AuditOptions, AuditReport, HostPaths, Priority, Tally, ThreatLevel, NOT_AVAILABLE,
};
use std::sync::Arc;
use tabled::{Table, Tabled, settings::Style};

use super::Context;
use crate::cli::args::AuditArgs;
use crate::output::{self, OutputFormat, ReportWriter};

#[derive(Tabled)]
struct TallyRow {
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct OriginRow {
    #[tabled(rename = "Address")]
    ip: String,
    #[tabled(rename = "Attempts")]
    count: u64,
    #[tabled(rename = "Origin")]
    origin: String,
}

pub async fn execute(ctx: Context, args: AuditArgs) -> Result<()> {
    let options = AuditOptions {
        geo_lookup: !args.no_geo && ctx.config.geo_lookup,
        public_ip_lookup: true,
        lookup_timeout: ctx.lookup_timeout(),
        top: args.top.unwrap_or(ctx.config.top),
    };
    let report =
        opsaudit_host::run_audit(Arc::new(SystemRunner::new()), &HostPaths::default(), &options)
            .await?;

    match ctx.output_format {
        OutputFormat::Pretty => {
            let mut out = ReportWriter::console();
            for line in render(&report) {
                out.line(line)?;
            }
            out.finish()?;
        }
        format => output::print_structured(format, &report)?,
    }
    Ok(())
}

fn opt<T: ToString>(value: Option<&T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), ToString::to_string)
}

fn yes_no(ok: bool, good: &str, bad: &str) -> ColoredString {
    if ok {
        good.green()
    } else {
        bad.red().bold()
    }
}

fn tallies(rows: &[Tally]) -> String {
    let rows: Vec<TallyRow> = rows
        .iter()
        .map(|t| TallyRow {
            count: t.count,
            name: t.name.clone(),
        })
        .collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

fn threat_colour(threat: ThreatLevel) -> ColoredString {
    match threat {
        ThreatLevel::Low => threat.as_str().green().bold(),
        ThreatLevel::Medium => threat.as_str().yellow().bold(),
        ThreatLevel::High => threat.as_str().red().bold(),
        ThreatLevel::Critical => threat.as_str().white().on_red().bold(),
    }
}

fn priority_colour(priority: Priority) -> ColoredString {
    match priority {
        Priority::Critical => priority.as_str().white().on_red().bold(),
        Priority::High => priority.as_str().red().bold(),
        Priority::Medium => priority.as_str().yellow().bold(),
        Priority::Low => priority.as_str().blue().bold(),
    }
}

fn kv(out: &mut Vec<String>, key: &str, value: String) {
    out.push(format!("  {:<26} {value}", format!("{key}:").bold()));
}

/// Pretty report, one entry per output line
#[allow(clippy::too_many_lines)]
fn render(report: &AuditReport) -> Vec<String> {
    let f = &report.findings;
    let mut out = Vec::new();

    out.push(format!("{}", "Linux Security Audit".bold()));
    kv(&mut out, "Host", f.system.hostname.cyan().to_string());
    kv(&mut out, "OS", f.system.os.clone());
    kv(&mut out, "Kernel", f.system.kernel.clone());
    kv(&mut out, "Public IP", f.system.public_ip.clone());
    kv(
        &mut out,
        "Collected",
        f.collected_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    out.push(String::new());
    out.push(output::heading("SSH daemon"));
    kv(&mut out, "Port", opt(f.ssh.port.as_ref()));
    kv(&mut out, "PermitRootLogin", opt(f.ssh.permit_root_login.as_ref()));
    kv(&mut out, "PasswordAuthentication", opt(f.ssh.password_authentication.as_ref()));
    kv(&mut out, "PubkeyAuthentication", opt(f.ssh.pubkey_authentication.as_ref()));
    kv(&mut out, "MaxAuthTries", opt(f.ssh.max_auth_tries.as_ref()));
    kv(
        &mut out,
        "LoginGraceTime",
        f.ssh
            .login_grace_time
            .map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{s}s")),
    );

    out.push(String::new());
    out.push(output::heading("Logged-in sessions"));
    if f.sessions.is_empty() {
        out.push(output::pass("No active sessions"));
    }
    for s in &f.sessions {
        let from = s.from.as_deref().map(|h| format!(" from {h}")).unwrap_or_default();
        out.push(format!("  {} on {} since {}{from}", s.user.bold(), s.tty, s.since));
    }

    out.push(String::new());
    out.push(output::heading("Intrusion prevention (fail2ban)"));
    if !f.fail2ban.installed {
        out.push(output::fail("fail2ban is not installed"));
    } else {
        kv(&mut out, "Service", yes_no(f.fail2ban.active, "active", "inactive").to_string());
        for jail in &f.fail2ban.jails {
            kv(
                &mut out,
                &format!("Jail {}", jail.name),
                format!(
                    "{} banned now, {} total",
                    jail.currently_banned, jail.total_banned
                ),
            );
        }
        let banned: Vec<&str> = f.fail2ban.banned_ips().collect();
        if !banned.is_empty() {
            kv(&mut out, "Banned addresses", banned.join(", "));
        }
    }

    out.push(String::new());
    out.push(output::heading("Authentication log (30 days)"));
    kv(&mut out, "Failed passwords", f.auth.failed.to_string().bold().to_string());
    kv(&mut out, "Invalid users", f.auth.invalid_users.to_string());
    kv(&mut out, "Accepted logins", f.auth.accepted.to_string());
    if f.auth.sources.is_empty() {
        out.push(output::warn("No authentication log could be read"));
    } else {
        kv(&mut out, "Sources", f.auth.sources.join(", "));
    }
    if !f.auth.top_users.is_empty() {
        out.push(format!("  {}", "Most attacked usernames".bold()));
        out.push(tallies(&f.auth.top_users));
    }
    if !f.origins.is_empty() {
        out.push(format!("  {}", "Top attacking addresses".bold()));
        let rows: Vec<OriginRow> = f
            .origins
            .iter()
            .map(|o| OriginRow {
                ip: o.ip.clone(),
                count: o.count,
                origin: o.origin.clone(),
            })
            .collect();
        out.push(Table::new(&rows).with(Style::rounded()).to_string());
    } else if !f.auth.top_ips.is_empty() {
        out.push(format!("  {}", "Top attacking addresses".bold()));
        out.push(tallies(&f.auth.top_ips));
    }

    out.push(String::new());
    out.push(output::heading("Firewall"));
    match f.firewall.backend {
        Some(backend) => kv(
            &mut out,
            &backend.to_string(),
            yes_no(f.firewall.active, "active", "inactive").to_string(),
        ),
        None => out.push(output::fail("No ufw or firewalld found")),
    }
    kv(&mut out, "INPUT policy", opt(f.firewall.input_policy.as_ref()));
    kv(
        &mut out,
        "DROP rules",
        format!(
            "{} ({} packets dropped)",
            f.firewall.drop_rules, f.firewall.dropped_packets
        ),
    );

    out.push(String::new());
    out.push(output::heading("Users and sudo"));
    let names: Vec<&str> = f.users.interactive.iter().map(|u| u.name.as_str()).collect();
    kv(
        &mut out,
        "Login shells",
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        },
    );
    for name in &f.users.extra_root {
        out.push(output::fail(format!("{name} has UID 0")));
    }
    if f.users.nopasswd.is_empty() {
        out.push(output::pass("No NOPASSWD sudo rules"));
    }
    for rule in &f.users.nopasswd {
        out.push(output::warn(format!("NOPASSWD {rule}")));
    }

    out.push(String::new());
    out.push(output::heading("SSH keys"));
    for key in &f.keys {
        let line = format!("{}: {} authorized key(s)", key.user, key.key_count);
        out.push(if key.has_keys() {
            output::pass(line)
        } else if key.has_file {
            output::warn(line)
        } else {
            output::warn(format!("{}: no authorized_keys file", key.user))
        });
    }
    if f.keys.is_empty() {
        out.push("  no interactive users".to_string());
    }

    out.push(String::new());
    out.push(output::heading("Containers"));
    if !f.containers.available {
        out.push("  Docker not available".to_string());
    } else if f.containers.containers.is_empty() {
        out.push(output::pass("No containers"));
    }
    for c in &f.containers.containers {
        let line = format!("{}: {}", c.name, c.status);
        out.push(if c.is_unhealthy() {
            output::fail(line)
        } else {
            output::pass(line)
        });
    }

    out.push(String::new());
    out.push(output::heading("Verdict"));
    let score = format!("{:.1}/{MAX_SCORE:.0}", report.score);
    let score = if report.score >= 8.0 {
        score.green().bold()
    } else if report.score >= 5.0 {
        score.yellow().bold()
    } else {
        score.red().bold()
    };
    kv(&mut out, "Security score", score.to_string());
    kv(&mut out, "Threat level", threat_colour(report.threat).to_string());

    for priority in Priority::ALL {
        let recs: Vec<_> = report.band(priority).collect();
        if recs.is_empty() {
            continue;
        }
        out.push(String::new());
        out.push(format!("{} {}", priority_colour(priority), "recommendations".bold()));
        for rec in recs {
            out.push(format!("  • {}", rec.title));
            out.push(format!("    {}", rec.command.dimmed()));
        }
    }
    out
}
