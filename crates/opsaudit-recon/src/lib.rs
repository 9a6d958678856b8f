//! Where does an address come from?
//!
//! Origin lookups for the IPs that show up in authentication logs, plus
//! discovery of the host's own public address. Every lookup is bounded by a
//! timeout and degrades to "unknown" rather than failing the caller.

#![doc(html_root_url = "https://docs.rs/opsaudit-recon/0.3.0")]

mod error;

pub mod dns;
pub mod enrichment;
pub mod host;
pub mod myip;
pub mod whois;

pub use enrichment::{IpEnricher, OriginSource, UNKNOWN_ORIGIN};
pub use error::{ReconError, ReconResult};
