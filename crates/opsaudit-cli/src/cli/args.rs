//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Operator checks for AWS spend and Linux server hardening
///
/// `scan` lists billable AWS resources, `cost` compares two billing
/// periods, and `audit` grades the security posture of this host.
#[derive(Parser, Debug)]
#[command(name = "opsaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// AWS region
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// AWS named profile
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List AWS resources that keep billing while they exist
    Scan(ScanArgs),

    /// Compare AWS spend between two periods
    Cost(CostArgs),

    /// Audit the security posture of this Linux host (requires root)
    Audit(AuditArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Scan command
// ============================================================================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory for the plain-text report
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Do not write a report file
    #[arg(long, conflicts_with = "report_dir")]
    pub no_report: bool,
}

// ============================================================================
// Cost command
// ============================================================================

#[derive(Args, Debug)]
#[command(after_help = "\
Forms:
  opsaudit cost                                        prompt for the periods
  opsaudit cost CUR_START CUR_END                      previous period derived
  opsaudit cost PREV_START PREV_END CUR_START CUR_END  both periods explicit

Dates are YYYY-MM-DD. End dates are exclusive.")]
pub struct CostArgs {
    /// Period boundaries (zero, two or four dates)
    #[arg(value_name = "DATE")]
    pub dates: Vec<String>,

    /// Rows in the per-period service tables
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

// ============================================================================
// Audit command
// ============================================================================

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Skip the whois / DNS lookups for attacking addresses
    #[arg(long)]
    pub no_geo: bool,

    /// Rows in the attacked-user and attacker tables
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (e.g., aws_region, report_dir, top)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}
