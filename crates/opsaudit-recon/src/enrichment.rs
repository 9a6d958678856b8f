//! Attacker origin by combining lookups in priority order.

use crate::error::ReconResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::{debug, trace};

/// Label used when no source knows anything about an address
pub const UNKNOWN_ORIGIN: &str = "Unknown";

/// One way of describing where an address comes from
#[async_trait]
pub trait OriginSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the source answered but had nothing useful
    async fn origin(&self, ip: IpAddr) -> ReconResult<Option<String>>;
}

/// Tries each configured source in turn and remembers the answer.
///
/// Lookups are sequential; the first source that returns a non-empty
/// origin wins. Every address is looked up at most once per enricher.
#[derive(Default)]
pub struct IpEnricher {
    sources: Vec<Box<dyn OriginSource>>,
    cache: HashMap<String, String>,
}

impl IpEnricher {
    /// Create an enricher with no sources (everything is unknown)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source after the ones already configured
    #[must_use]
    pub fn with_source(mut self, source: impl OriginSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of configured sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Origin of `ip`, or [`UNKNOWN_ORIGIN`].
    ///
    /// Strings that do not parse as an address are reported as unknown
    /// without consulting any source.
    pub async fn origin(&mut self, ip: &str) -> String {
        if let Some(hit) = self.cache.get(ip) {
            trace!(ip, origin = %hit, "origin cache hit");
            return hit.clone();
        }

        let origin = match ip.parse::<IpAddr>() {
            Ok(addr) => self.lookup(addr).await,
            Err(_) => {
                debug!(ip, "not an IP address, skipping origin lookup");
                None
            }
        }
        .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string());

        self.cache.insert(ip.to_string(), origin.clone());
        origin
    }

    async fn lookup(&self, ip: IpAddr) -> Option<String> {
        for source in &self.sources {
            match source.origin(ip).await {
                Ok(Some(origin)) if !origin.trim().is_empty() => {
                    debug!(%ip, source = source.name(), %origin, "origin found");
                    return Some(origin.trim().to_string());
                }
                Ok(_) => trace!(%ip, source = source.name(), "no origin"),
                Err(e) => debug!(%ip, source = source.name(), error = %e, "origin lookup failed"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        name: &'static str,
        answer: Option<&'static str>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn new(name: &'static str, answer: Option<&'static str>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    answer,
                    fail: false,
                    calls: calls.clone(),
                },
                calls,
            )
        }

        fn failing(name: &'static str) -> (Self, Arc<AtomicUsize>) {
            let (mut source, calls) = Self::new(name, None);
            source.fail = true;
            (source, calls)
        }
    }

    #[async_trait]
    impl OriginSource for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn origin(&self, _ip: IpAddr) -> ReconResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ReconError::Timeout(5));
            }
            Ok(self.answer.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn first_answer_wins() {
        let (whois, _) = Fixed::failing("whois");
        let (dns, dns_calls) = Fixed::new("reverse-dns", Some("scanner.example.net"));
        let (host, host_calls) = Fixed::new("host", Some("other.example.net"));
        let mut enricher = IpEnricher::new()
            .with_source(whois)
            .with_source(dns)
            .with_source(host);

        assert_eq!(enricher.origin("198.51.100.7").await, "scanner.example.net");
        assert_eq!(dns_calls.load(Ordering::SeqCst), 1);
        assert_eq!(host_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_answers_fall_through() {
        let (whois, _) = Fixed::new("whois", Some("  "));
        let (host, _) = Fixed::new("host", Some("vps.example.org"));
        let mut enricher = IpEnricher::new().with_source(whois).with_source(host);

        assert_eq!(enricher.origin("192.0.2.4").await, "vps.example.org");
    }

    #[tokio::test]
    async fn results_are_cached_per_address() {
        let (whois, calls) = Fixed::new("whois", None);
        let mut enricher = IpEnricher::new().with_source(whois);

        assert_eq!(enricher.origin("192.0.2.1").await, UNKNOWN_ORIGIN);
        assert_eq!(enricher.origin("192.0.2.1").await, UNKNOWN_ORIGIN);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        enricher.origin("192.0.2.2").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn garbage_is_unknown_without_lookups() {
        let (whois, calls) = Fixed::new("whois", Some("US, Example"));
        let mut enricher = IpEnricher::new().with_source(whois);

        assert_eq!(enricher.origin("port").await, UNKNOWN_ORIGIN);
        assert_eq!(enricher.origin("203.0.113.5").await, "US, Example");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
