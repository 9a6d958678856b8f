//! Typed wrappers over external command-line tools.
//!
//! Everything opsaudit learns about the outside world comes from running a
//! program and reading its output. This crate provides:
//!
//! - [`CommandRunner`], the seam every collector goes through, with
//!   [`SystemRunner`] for real processes and [`ScriptedRunner`] for canned
//!   replies
//! - [`AwsClient`], which drives the `aws` CLI and deserialises its JSON
//!   output into the types from `opsaudit-core`

#![doc(html_root_url = "https://docs.rs/opsaudit-client/0.3.0")]

mod client;
mod config;
pub mod api;
pub mod runner;

pub use client::{AwsClient, AwsClientBuilder};
pub use config::*;
pub use opsaudit_core::{OpsError, Result};
pub use runner::{CommandOutput, CommandRunner, ScriptedRunner, SystemRunner};
