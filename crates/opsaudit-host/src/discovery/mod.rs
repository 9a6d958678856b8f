//! Host discovery: one collector per signal.
//!
//! Collectors never fail. A missing tool, a failed command or an unreadable
//! file yields the empty value for that signal and a `debug` log line.

pub mod authlog;
pub mod containers;
pub mod fail2ban;
pub mod firewall;
pub mod keys;
pub mod sessions;
pub mod sshd;
pub mod system;
pub mod users;

pub use authlog::{collect_auth_log, parse_auth_log};
pub use containers::collect_containers;
pub use fail2ban::collect_fail2ban;
pub use firewall::collect_firewall;
pub use keys::collect_keys;
pub use sessions::collect_sessions;
pub use sshd::collect_sshd;
pub use system::collect_system;
pub use users::collect_users;

use opsaudit_client::CommandRunner;
use std::path::Path;
use tracing::debug;

/// Stdout of a successful run, or `None`
pub(crate) async fn stdout_of(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Option<String> {
    match runner.run(program, args).await {
        Ok(out) if out.success() => Some(out.stdout),
        Ok(out) => {
            debug!(program, ?args, code = ?out.code, stderr = out.stderr.trim(), "command failed");
            None
        }
        Err(e) => {
            debug!(program, ?args, error = %e, "command unavailable");
            None
        }
    }
}

/// File contents, lossily decoded, or `None` if it cannot be read
pub(crate) async fn read_lossy(path: &Path) -> Option<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot read file");
            None
        }
    }
}
