//! SSH daemon effective configuration via `sshd -T`.

use super::stdout_of;
use crate::types::SshConfig;
use opsaudit_client::CommandRunner;

/// Dump and parse the effective sshd configuration
pub async fn collect_sshd(runner: &dyn CommandRunner) -> SshConfig {
    stdout_of(runner, "sshd", &["-T"])
        .await
        .map(|out| parse_sshd_dump(&out))
        .unwrap_or_default()
}

/// Parse `sshd -T` output (lowercase `key value` lines).
///
/// The first occurrence of a key wins; `sshd` prints one `port` line per
/// listening port.
pub fn parse_sshd_dump(dump: &str) -> SshConfig {
    let mut cfg = SshConfig::default();
    for line in dump.lines() {
        let Some((key, value)) = line.trim().split_once(char::is_whitespace) else {
            continue;
        };
        let value = value.trim();
        match key.to_ascii_lowercase().as_str() {
            "port" => {
                if cfg.port.is_none() {
                    cfg.port = value.parse().ok();
                }
            }
            "permitrootlogin" => {
                cfg.permit_root_login.get_or_insert_with(|| value.to_string());
            }
            "passwordauthentication" => {
                cfg.password_authentication
                    .get_or_insert_with(|| value.to_string());
            }
            "pubkeyauthentication" => {
                cfg.pubkey_authentication
                    .get_or_insert_with(|| value.to_string());
            }
            "maxauthtries" => {
                if cfg.max_auth_tries.is_none() {
                    cfg.max_auth_tries = value.parse().ok();
                }
            }
            "logingracetime" => {
                if cfg.login_grace_time.is_none() {
                    cfg.login_grace_time = parse_seconds(value);
                }
            }
            _ => {}
        }
    }
    cfg
}

/// sshd time values: plain seconds or a number with an `s`/`m`/`h` suffix
fn parse_seconds(value: &str) -> Option<u32> {
    let (digits, multiplier) = match value.chars().last()? {
        's' | 'S' => (&value[..value.len() - 1], 1),
        'm' | 'M' => (&value[..value.len() - 1], 60),
        'h' | 'H' => (&value[..value.len() - 1], 3600),
        _ => (value, 1),
    };
    digits.parse::<u32>().ok()?.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsaudit_client::ScriptedRunner;

    const DUMP: &str = "\
port 2222
port 2223
addressfamily any
permitrootlogin without-password
passwordauthentication no
pubkeyauthentication yes
maxauthtries 6
logingracetime 120
";

    #[test]
    fn parses_fields() {
        let cfg = parse_sshd_dump(DUMP);
        assert_eq!(cfg.port, Some(2222));
        assert_eq!(cfg.permit_root_login.as_deref(), Some("without-password"));
        assert!(cfg.password_auth_disabled());
        assert!(cfg.pubkey_enabled());
        assert_eq!(cfg.max_auth_tries, Some(6));
        assert_eq!(cfg.login_grace_time, Some(120));
    }

    #[test]
    fn time_suffixes() {
        assert_eq!(parse_seconds("90"), Some(90));
        assert_eq!(parse_seconds("2m"), Some(120));
        assert_eq!(parse_seconds("1h"), Some(3600));
        assert_eq!(parse_seconds("soon"), None);
    }

    #[tokio::test]
    async fn failed_dump_gives_unknowns() {
        let runner = ScriptedRunner::new().fail("sshd -T", 255, "sshd: no hostkeys available -- exiting.");
        assert_eq!(collect_sshd(&runner).await, SshConfig::default());

        let missing = ScriptedRunner::new();
        assert_eq!(collect_sshd(&missing).await, SshConfig::default());
    }
}
