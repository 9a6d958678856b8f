//! # opsaudit-cli
//!
//! One binary, three independent tools:
//!
//! - **scan**: list AWS resources that keep billing while they exist
//! - **cost**: compare Cost Explorer spend between two periods
//! - **audit**: score a Linux server's SSH, firewall, user and container setup
//!
//! Every tool prints a colourised report, or JSON/YAML with `-o`.

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
