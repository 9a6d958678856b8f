//! Reverse DNS through hickory.

use crate::enrichment::OriginSource;
use crate::error::{ReconError, ReconResult};
use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// PTR resolver using the system resolver configuration
pub struct DnsResolver {
    resolver: TokioResolver,
    timeout: Duration,
}

impl DnsResolver {
    /// Create a resolver from the system configuration.
    ///
    /// # Errors
    ///
    /// Returns `ReconError::Dns` if the system resolver cannot be created.
    pub fn new(timeout: Duration) -> ReconResult<Self> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| ReconError::Dns(format!("failed to create resolver: {e}")))?
            .build();
        Ok(Self { resolver, timeout })
    }

    /// Hostnames pointing back at `ip`, without the trailing root dot
    pub async fn reverse(&self, ip: IpAddr) -> ReconResult<Vec<String>> {
        let lookup = tokio::time::timeout(self.timeout, self.resolver.reverse_lookup(ip))
            .await
            .map_err(|_| ReconError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ReconError::Dns(e.to_string()))?;

        Ok(lookup
            .iter()
            .map(|name| trim_root(&name.to_string()).to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }
}

#[async_trait]
impl OriginSource for DnsResolver {
    fn name(&self) -> &'static str {
        "reverse-dns"
    }

    async fn origin(&self, ip: IpAddr) -> ReconResult<Option<String>> {
        let names = self.reverse(ip).await?;
        debug!(%ip, ?names, "PTR records");
        Ok(names.into_iter().next())
    }
}

/// Strip the trailing `.` of a fully-qualified name
pub(crate) fn trim_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_root_label() {
        assert_eq!(trim_root("scanner.example.net."), "scanner.example.net");
        assert_eq!(trim_root("scanner.example.net"), "scanner.example.net");
        assert_eq!(trim_root("."), "");
    }
}
