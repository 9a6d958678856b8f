//! `opsaudit config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::{self, OutputFormat, ReportWriter};

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.output_format != OutputFormat::Pretty {
        return output::print_structured(ctx.output_format, config);
    }

    let unset = || "(not set)".dimmed().to_string();
    let mut out = ReportWriter::console();
    out.line("Current Configuration:".bold())?;
    out.blank()?;
    out.line(format!(
        "  {} {}",
        "aws_region:".bold(),
        config.aws_region.clone().unwrap_or_else(unset)
    ))?;
    out.line(format!(
        "  {} {}",
        "aws_profile:".bold(),
        config.aws_profile.clone().unwrap_or_else(unset)
    ))?;
    out.line(format!(
        "  {} {}",
        "output_format:".bold(),
        config.output_format.unwrap_or_default()
    ))?;
    out.line(format!(
        "  {} {}",
        "report_dir:".bold(),
        config
            .report_dir
            .as_ref()
            .map_or_else(unset, |d| d.display().to_string())
    ))?;
    out.line(format!("  {} {}", "geo_lookup:".bold(), config.geo_lookup))?;
    out.line(format!("  {} {}", "lookup_timeout_secs:".bold(), config.lookup_timeout_secs))?;
    out.line(format!("  {} {}", "top:".bold(), config.top))?;
    out.blank()?;
    out.line(format!(
        "  {} {} / {}",
        "effective AWS target:".dimmed(),
        ctx.settings.region.cyan(),
        ctx.settings.profile.cyan()
    ))?;

    out.finish()?;
    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
    Ok(())
}

fn show_path() -> Result<()> {
    let path = Config::path()?;
    println!("{}", path.display());
    Ok(())
}
