//! Logged-in sessions via `who`.

use super::stdout_of;
use crate::types::Session;
use opsaudit_client::CommandRunner;

/// Current sessions; empty if `who` is unavailable
pub async fn collect_sessions(runner: &dyn CommandRunner) -> Vec<Session> {
    stdout_of(runner, "who", &[])
        .await
        .map(|out| parse_who(&out))
        .unwrap_or_default()
}

/// Parse `who` output: `user tty date time [(host)]`
pub fn parse_who(output: &str) -> Vec<Session> {
    output
        .lines()
        .filter_map(|line| {
            let (line, from) = match line.rsplit_once('(') {
                Some((rest, host)) => (rest, Some(host.trim_end_matches(')').trim().to_string())),
                None => (line, None),
            };
            let mut fields = line.split_whitespace();
            let user = fields.next()?.to_string();
            let tty = fields.next()?.to_string();
            let since = fields.collect::<Vec<_>>().join(" ");
            Some(Session {
                user,
                tty,
                since,
                from: from.filter(|h| !h.is_empty()),
            })
        })
        .collect()
}
