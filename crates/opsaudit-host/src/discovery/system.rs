//! Header data: hostname, kernel, distribution, public address.

use super::{read_lossy, stdout_of};
use crate::paths::HostPaths;
use crate::types::{SystemInfo, NOT_AVAILABLE};
use opsaudit_client::CommandRunner;
use opsaudit_recon::myip::PublicIp;
use std::time::Duration;
use tracing::debug;

/// Collect header fields; `lookup_timeout` of `None` skips the public IP
pub async fn collect_system(
    runner: &dyn CommandRunner,
    paths: &HostPaths,
    lookup_timeout: Option<Duration>,
) -> SystemInfo {
    let hostname = hostname::get().map_or_else(
        |_| NOT_AVAILABLE.to_string(),
        |h| h.to_string_lossy().into_owned(),
    );
    let kernel = stdout_of(runner, "uname", &["-r"])
        .await
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let os = read_lossy(&paths.os_release())
        .await
        .and_then(|text| pretty_name(&text))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let public_ip = match lookup_timeout {
        Some(timeout) => public_ip(timeout).await,
        None => NOT_AVAILABLE.to_string(),
    };

    SystemInfo {
        hostname,
        kernel,
        os,
        public_ip,
    }
}

async fn public_ip(timeout: Duration) -> String {
    let lookup = match PublicIp::new(timeout) {
        Ok(lookup) => lookup,
        Err(e) => {
            debug!(error = %e, "cannot build HTTP client");
            return NOT_AVAILABLE.to_string();
        }
    };
    match lookup.fetch().await {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            debug!(error = %e, "public IP lookup failed");
            NOT_AVAILABLE.to_string()
        }
    }
}

/// `PRETTY_NAME` from os-release, unquoted
pub fn pretty_name(os_release: &str) -> Option<String> {
    os_release.lines().find_map(|line| {
        let value = line.strip_prefix("PRETTY_NAME=")?;
        let value = value.trim().trim_matches('"').trim_matches('\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}
