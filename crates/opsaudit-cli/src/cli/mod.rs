//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use opsaudit_client::{AwsSettings, DEFAULT_PROFILE, DEFAULT_REGION};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.no_color);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config = Config::load()?;

    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    // Flag or env (clap), then config, then default
    let settings = AwsSettings::new(
        cli.region
            .or_else(|| config.aws_region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        cli.profile
            .or_else(|| config.aws_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
    );

    let ctx = commands::Context {
        settings,
        output_format,
        config,
    };

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(ctx, args).await,
        Commands::Cost(args) => commands::cost::execute(ctx, args).await,
        Commands::Audit(args) => commands::audit::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args),
    }
}

/// `RUST_LOG` wins; otherwise `-v` is debug, `-vv` trace, default warn.
fn init_logging(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .init();
}
