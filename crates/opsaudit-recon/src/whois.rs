//! WHOIS lookups through the system `whois` client.

use crate::enrichment::OriginSource;
use crate::error::{ReconError, ReconResult};
use async_trait::async_trait;
use opsaudit_client::{CommandRunner, OpsError};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Registry data for an address block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisInfo {
    /// Two-letter country code
    pub country: Option<String>,
    /// Owning organisation
    pub organization: Option<String>,
    /// Network name
    pub network: Option<String>,
}

impl WhoisInfo {
    /// One-line origin, e.g. `CN, China Telecom`
    #[must_use]
    pub fn origin(&self) -> Option<String> {
        match (&self.country, self.organization.as_ref().or(self.network.as_ref())) {
            (Some(country), Some(org)) => Some(format!("{country}, {org}")),
            (Some(country), None) => Some(country.clone()),
            (None, Some(org)) => Some(org.clone()),
            (None, None) => None,
        }
    }
}

/// WHOIS client
pub struct WhoisClient {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl WhoisClient {
    /// Create a client that gives up after `timeout`
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Lookup WHOIS information for an IP address
    pub async fn lookup_ip(&self, ip: IpAddr) -> ReconResult<WhoisInfo> {
        let addr = ip.to_string();
        let output = self
            .runner
            .run_with_timeout("whois", &[addr.as_str()], self.timeout)
            .await
            .map_err(|e| match e {
                OpsError::Timeout { seconds, .. } => ReconError::Timeout(seconds),
                other => ReconError::Command(other),
            })?;

        // whois exits non-zero for partial referrals but still prints data
        if output.stdout.trim().is_empty() {
            return Err(ReconError::Whois(format!(
                "no registry data for {addr}: {}",
                output.stderr.trim()
            )));
        }
        Ok(parse_whois_response(&output.stdout))
    }
}

#[async_trait]
impl OriginSource for WhoisClient {
    fn name(&self) -> &'static str {
        "whois"
    }

    async fn origin(&self, ip: IpAddr) -> ReconResult<Option<String>> {
        let info = self.lookup_ip(ip).await?;
        debug!(%ip, ?info, "whois result");
        Ok(info.origin())
    }
}

/// Parse a raw WHOIS response.
///
/// Registries disagree on key names, so the first value for any of the
/// known spellings wins. `descr` is used only if no organisation key is
/// present.
fn parse_whois_response(raw: &str) -> WhoisInfo {
    let mut info = WhoisInfo::default();
    let mut descr = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.starts_with('%') || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.trim().to_lowercase().as_str() {
            "country" => {
                info.country.get_or_insert_with(|| value.to_uppercase());
            }
            "orgname" | "org-name" | "organization" | "owner" => {
                info.organization.get_or_insert_with(|| value.to_string());
            }
            "netname" => {
                info.network.get_or_insert_with(|| value.to_string());
            }
            "descr" => {
                descr.get_or_insert_with(|| value.to_string());
            }
            _ => {}
        }
    }

    if info.organization.is_none() {
        info.organization = descr;
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsaudit_client::ScriptedRunner;

    const ARIN: &str = "\
# ARIN WHOIS data and services are subject to the Terms of Use
NetRange:       198.51.100.0 - 198.51.100.255
NetName:        EXAMPLE-NET
OrgName:        Example Hosting LLC
Country:        us
";

    const RIPE: &str = "\
% This is the RIPE Database query service.
inetnum:        192.0.2.0 - 192.0.2.255
netname:        DOC-NET
descr:          Documentation block
descr:          second line
country:        NL
org-name:       Example BV
";

    #[test]
    fn parses_arin_style() {
        let info = parse_whois_response(ARIN);
        assert_eq!(info.country.as_deref(), Some("US"));
        assert_eq!(info.organization.as_deref(), Some("Example Hosting LLC"));
        assert_eq!(info.origin().as_deref(), Some("US, Example Hosting LLC"));
    }

    #[test]
    fn org_name_beats_descr() {
        let info = parse_whois_response(RIPE);
        assert_eq!(info.organization.as_deref(), Some("Example BV"));
        assert_eq!(info.network.as_deref(), Some("DOC-NET"));
    }

    #[test]
    fn descr_is_the_fallback_organisation() {
        let info = parse_whois_response("netname: X\ndescr: Some ISP\n");
        assert_eq!(info.organization.as_deref(), Some("Some ISP"));
        assert_eq!(info.origin().as_deref(), Some("Some ISP"));
    }

    #[test]
    fn empty_response_has_no_origin() {
        assert_eq!(parse_whois_response("% nothing here\n").origin(), None);
    }

    #[tokio::test]
    async fn lookup_runs_whois_with_the_address() {
        let runner = ScriptedRunner::new().stdout("whois 198.51.100.7", ARIN);
        let client = WhoisClient::new(Arc::new(runner), Duration::from_secs(5));

        let origin = client.origin("198.51.100.7".parse().unwrap()).await.unwrap();
        assert_eq!(origin.as_deref(), Some("US, Example Hosting LLC"));
    }

    #[tokio::test]
    async fn empty_output_is_an_error() {
        let runner = ScriptedRunner::new().fail("whois 192.0.2.1", 1, "connect: Network is unreachable");
        let client = WhoisClient::new(Arc::new(runner), Duration::from_secs(5));

        let err = client.lookup_ip("192.0.2.1".parse().unwrap()).await.unwrap_err();
        assert!(matches!(err, ReconError::Whois(_)));
    }
}
