//! SSH authentication log statistics.
//!
//! Lines come from the journal and from the flat log files, concatenated.
//! On hosts where both are populated the same event is counted twice.

use super::{read_lossy, stdout_of};
use crate::paths::HostPaths;
use crate::types::{AuthLogStats, Tally};
use opsaudit_client::CommandRunner;
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::debug;

/// How far back the journal is read
pub const JOURNAL_SINCE: &str = "30 days ago";

/// Gather log text from every source and summarise it
pub async fn collect_auth_log(
    runner: &dyn CommandRunner,
    paths: &HostPaths,
    top: usize,
) -> AuthLogStats {
    let mut text = String::new();
    let mut sources = Vec::new();

    if let Some(journal) = stdout_of(
        runner,
        "journalctl",
        &["-u", "ssh", "-u", "sshd", "--since", JOURNAL_SINCE, "--no-pager"],
    )
    .await
    {
        text.push_str(&journal);
        sources.push("journalctl".to_string());
    }

    for path in paths.auth_logs() {
        if let Some(contents) = read_lossy(&path).await {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&contents);
            sources.push(path.display().to_string());
        }
    }

    let mut stats = parse_auth_log(&text, top);
    debug!(?sources, failed = stats.failed, "auth log summarised");
    stats.sources = sources;
    stats
}

/// Count events and rank users and addresses from `Failed password` lines.
///
/// sshd logs the username verbatim, so the address is read from the fixed
/// `from <ip> port <n> ssh2` tail rather than the first `from` on the line.
/// Tokens that do not parse as an IP address are not counted.
pub fn parse_auth_log(text: &str, top: usize) -> AuthLogStats {
    let mut stats = AuthLogStats::default();
    let mut users: HashMap<String, u64> = HashMap::new();
    let mut ips: HashMap<String, u64> = HashMap::new();

    for line in text.lines() {
        if line.contains("Invalid user") {
            stats.invalid_users += 1;
        }
        if line.contains("Accepted ") {
            stats.accepted += 1;
        }
        if !line.contains("Failed password") {
            continue;
        }
        stats.failed += 1;

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let from = tokens
            .iter()
            .rposition(|t| *t == "from")
            .unwrap_or(tokens.len());
        if let Some(user) = user_before(&tokens[..from]) {
            *users.entry(user).or_default() += 1;
        }
        if let Some(ip) = tokens.get(from + 1).and_then(|t| t.parse::<IpAddr>().ok()) {
            *ips.entry(ip.to_string()).or_default() += 1;
        } else {
            debug!(line, "no address in failed login line");
        }
    }

    stats.top_users = rank(users, top);
    stats.top_ips = rank(ips, top);
    stats
}

/// Everything between `for [invalid user]` and the address, so names
/// containing spaces stay whole
fn user_before(tokens: &[&str]) -> Option<String> {
    let i = tokens.iter().position(|t| *t == "for")?;
    let start = match (tokens.get(i + 1), tokens.get(i + 2)) {
        (Some(&"invalid"), Some(&"user")) if tokens.len() > i + 3 => i + 3,
        _ => i + 1,
    };
    let name = tokens.get(start..)?.join(" ");
    (!name.is_empty()).then_some(name)
}

/// Highest counts first, ties by name
fn rank(counts: HashMap<String, u64>, top: usize) -> Vec<Tally> {
    let mut tallies: Vec<Tally> = counts
        .into_iter()
        .map(|(name, count)| Tally { name, count })
        .collect();
    tallies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tallies.truncate(top);
    tallies
}
