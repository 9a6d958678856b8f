//! Firewall state via ufw or firewalld, plus the iptables INPUT chain.

use super::stdout_of;
use crate::types::{FirewallBackend, FirewallStatus};
use opsaudit_client::CommandRunner;

/// Determine the firewall front-end state and summarise `INPUT`
pub async fn collect_firewall(runner: &dyn CommandRunner) -> FirewallStatus {
    let mut status = FirewallStatus::default();

    if runner.is_installed("ufw") {
        status.backend = Some(FirewallBackend::Ufw);
        status.active = stdout_of(runner, "ufw", &["status"])
            .await
            .is_some_and(|out| ufw_active(&out));
    } else if runner.is_installed("firewall-cmd") {
        status.backend = Some(FirewallBackend::Firewalld);
        // --state exits non-zero when not running
        status.active = runner
            .run("firewall-cmd", &["--state"])
            .await
            .is_ok_and(|out| out.stdout.trim() == "running");
    }

    if let Some(chain) = stdout_of(runner, "iptables", &["-L", "INPUT", "-n", "-v", "-x"]).await {
        let (policy, rules, packets) = parse_input_chain(&chain);
        status.input_policy = policy;
        status.drop_rules = rules;
        status.dropped_packets = packets;
    }
    status
}

/// `Status: active` on the first line
fn ufw_active(output: &str) -> bool {
    output
        .lines()
        .next()
        .and_then(|l| l.split_once(':'))
        .is_some_and(|(_, v)| v.trim() == "active")
}

/// Chain policy, number of `DROP` rules and their summed packet counters
pub fn parse_input_chain(output: &str) -> (Option<String>, u32, u64) {
    let mut lines = output.lines();
    let policy = lines.next().and_then(|header| {
        let (_, rest) = header.split_once("(policy ")?;
        rest.split_whitespace().next().map(str::to_string)
    });

    let mut rules = 0;
    let mut packets = 0;
    for line in lines {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.get(2) == Some(&"DROP") {
            rules += 1;
            packets += cols[0].parse::<u64>().unwrap_or(0);
        }
    }
    (policy, rules, packets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsaudit_client::{CommandOutput, ScriptedRunner};

    const CHAIN: &str = "\
Chain INPUT (policy DROP 120 packets, 7200 bytes)
    pkts      bytes target     prot opt in     out     source               destination
    4410   264600 ACCEPT     all  --  lo     *       0.0.0.0/0            0.0.0.0/0
     542    32520 DROP       all  --  *      *       203.0.113.5          0.0.0.0/0
      17     1020 DROP       tcp  --  *      *       198.51.100.0/24      0.0.0.0/0            tcp dpt:22
";

    #[test]
    fn parses_chain() {
        let (policy, rules, packets) = parse_input_chain(CHAIN);
        assert_eq!(policy.as_deref(), Some("DROP"));
        assert_eq!(rules, 2);
        assert_eq!(packets, 559);
    }

    #[tokio::test]
    async fn ufw_is_preferred() {
        let runner = ScriptedRunner::new()
            .stdout("ufw status", "Status: active\n\nTo Action From\n")
            .stdout("iptables -L INPUT -n -v -x", CHAIN)
            .installed("firewall-cmd");

        let status = collect_firewall(&runner).await;
        assert_eq!(status.backend, Some(FirewallBackend::Ufw));
        assert!(status.active);
        assert_eq!(status.drop_rules, 2);
    }

    #[tokio::test]
    async fn falls_back_to_firewalld() {
        let runner = ScriptedRunner::new().respond(
            "firewall-cmd --state",
            CommandOutput {
                code: Some(252),
                stdout: "not running\n".into(),
                stderr: String::new(),
            },
        );

        let status = collect_firewall(&runner).await;
        assert_eq!(status.backend, Some(FirewallBackend::Firewalld));
        assert!(!status.active);
        assert_eq!(status.input_policy, None);
    }

    #[tokio::test]
    async fn inactive_ufw() {
        let runner = ScriptedRunner::new().stdout("ufw status", "Status: inactive\n");
        let status = collect_firewall(&runner).await;
        assert!(!status.active);
    }
}
