//! Core types and errors shared by the opsaudit crates.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - **Periods**: validated, end-exclusive date ranges ([`DateRange`], [`Periods`])
//! - **Costs**: per-service breakdowns and the period comparison ([`CostComparison`])
//! - **Resources**: billable resource scan results ([`ScanSummary`])
//! - **Errors**: [`OpsError`] and the [`Result`] alias
//!
//! # Example
//!
//! ```rust,ignore
//! use opsaudit_core::{CostBreakdown, CostComparison, DateRange, PeriodCosts};
//!
//! let current = DateRange::parse("2024-03-01", "2024-03-11")?;
//! let comparison = CostComparison::new(
//!     PeriodCosts::new(current, CostBreakdown::from_iter([("EC2".into(), 60.0)])),
//!     PeriodCosts::new(current.preceding(), CostBreakdown::default()),
//! );
//! println!("projected: {:.2}", comparison.projected());
//! ```

mod error;
pub mod types;

pub use error::{OpsError, Result};
pub use types::*;
