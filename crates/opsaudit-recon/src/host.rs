//! Lookups through the `host` utility.

use crate::dns::trim_root;
use crate::enrichment::OriginSource;
use crate::error::{ReconError, ReconResult};
use async_trait::async_trait;
use opsaudit_client::{CommandRunner, OpsError};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs `host <ip>` and reads the pointer records it prints
pub struct HostLookup {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl HostLookup {
    /// Create a lookup that gives up after `timeout`
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// First hostname `host` reports for `ip`, if any
    pub async fn lookup(&self, ip: IpAddr) -> ReconResult<Option<String>> {
        let addr = ip.to_string();
        let output = self
            .runner
            .run_with_timeout("host", &[addr.as_str()], self.timeout)
            .await
            .map_err(|e| match e {
                OpsError::Timeout { seconds, .. } => ReconError::Timeout(seconds),
                other => ReconError::Command(other),
            })?;

        if !output.success() {
            // NXDOMAIN is exit 1 with the reason on stdout
            let reason = output.stdout.trim();
            return Err(ReconError::Host(if reason.is_empty() {
                output.stderr.trim().to_string()
            } else {
                reason.to_string()
            }));
        }
        Ok(parse_pointer(&output.stdout))
    }
}

#[async_trait]
impl OriginSource for HostLookup {
    fn name(&self) -> &'static str {
        "host"
    }

    async fn origin(&self, ip: IpAddr) -> ReconResult<Option<String>> {
        self.lookup(ip).await
    }
}

fn parse_pointer(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (_, name) = line.split_once("domain name pointer")?;
        let name = trim_root(name.trim());
        (!name.is_empty()).then(|| name.to_string())
    })
}
