//! fail2ban state via `systemctl` and `fail2ban-client`.

use super::stdout_of;
use crate::types::{Fail2banStatus, JailStatus};
use opsaudit_client::CommandRunner;
use tracing::debug;

const CLIENT: &str = "fail2ban-client";

/// Collect installation, service state and per-jail bans
pub async fn collect_fail2ban(runner: &dyn CommandRunner) -> Fail2banStatus {
    let mut status = Fail2banStatus {
        installed: runner.is_installed(CLIENT),
        ..Fail2banStatus::default()
    };

    // is-active exits 3 for inactive units but still prints the state
    status.active = match runner.run("systemctl", &["is-active", "fail2ban"]).await {
        Ok(out) => out.stdout.trim() == "active",
        Err(e) => {
            debug!(error = %e, "systemctl unavailable");
            false
        }
    };

    if !status.installed {
        return status;
    }

    let Some(overview) = stdout_of(runner, CLIENT, &["status"]).await else {
        return status;
    };
    for name in parse_jail_list(&overview) {
        let jail = match stdout_of(runner, CLIENT, &["status", name.as_str()]).await {
            Some(out) => parse_jail_status(&name, &out),
            None => JailStatus {
                name,
                ..JailStatus::default()
            },
        };
        status.jails.push(jail);
    }
    status
}

/// Split a `fail2ban-client` tree line into key and value
fn tree_field(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start_matches(|c: char| matches!(c, '|' | '`' | '-' | ' ' | '\t'));
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

/// Jail names from `fail2ban-client status`
pub fn parse_jail_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(tree_field)
        .find(|(key, _)| key.eq_ignore_ascii_case("Jail list"))
        .map(|(_, value)| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Ban counters from `fail2ban-client status <jail>`
pub fn parse_jail_status(name: &str, output: &str) -> JailStatus {
    let mut jail = JailStatus {
        name: name.to_string(),
        ..JailStatus::default()
    };
    for (key, value) in output.lines().filter_map(tree_field) {
        match key {
            "Currently banned" => jail.currently_banned = value.parse().unwrap_or(0),
            "Total banned" => jail.total_banned = value.parse().unwrap_or(0),
            "Banned IP list" => {
                jail.banned_ips = value.split_whitespace().map(str::to_string).collect();
            }
            _ => {}
        }
    }
    jail
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsaudit_client::{CommandOutput, ScriptedRunner};

    const OVERVIEW: &str = "\
Status
|- Number of jail:\t2
`- Jail list:\tsshd, recidive
";

    const SSHD: &str = "\
Status for the jail: sshd
|- Filter
|  |- Currently failed:\t3
|  |- Total failed:\t120
|  `- File list:\t/var/log/auth.log
`- Actions
   |- Currently banned:\t2
   |- Total banned:\t15
   `- Banned IP list:\t203.0.113.5 198.51.100.7
";

    #[test]
    fn parses_overview_and_jail() {
        assert_eq!(parse_jail_list(OVERVIEW), vec!["sshd", "recidive"]);

        let jail = parse_jail_status("sshd", SSHD);
        assert_eq!(jail.currently_banned, 2);
        assert_eq!(jail.total_banned, 15);
        assert_eq!(jail.banned_ips, vec!["203.0.113.5", "198.51.100.7"]);
    }

    #[tokio::test]
    async fn sums_across_jails() {
        let runner = ScriptedRunner::new()
            .stdout("systemctl is-active fail2ban", "active\n")
            .stdout("fail2ban-client status", OVERVIEW)
            .stdout("fail2ban-client status sshd", SSHD)
            .stdout(
                "fail2ban-client status recidive",
                "`- Actions\n   |- Currently banned:\t1\n   |- Total banned:\t4\n   `- Banned IP list:\t192.0.2.8\n",
            );

        let status = collect_fail2ban(&runner).await;
        assert!(status.installed);
        assert!(status.active);
        assert_eq!(status.jails.len(), 2);
        assert_eq!(status.currently_banned(), 3);
        assert_eq!(status.total_banned(), 19);
    }

    #[tokio::test]
    async fn absent_tool_is_tolerated() {
        let runner = ScriptedRunner::new().respond(
            "systemctl is-active fail2ban",
            CommandOutput {
                code: Some(4),
                stdout: "inactive\n".into(),
                stderr: String::new(),
            },
        );

        let status = collect_fail2ban(&runner).await;
        assert!(!status.installed);
        assert!(!status.active);
        assert!(status.jails.is_empty());
    }
}
