//! Output formatting for different formats.

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Coloured sections and tables
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "table" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Unknown output format: {s}\n\
                 Valid formats: pretty, json, yaml"
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Print `value` as JSON or YAML. Pretty output is left to the caller.
pub fn print_structured<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    let mut out = ReportWriter::console();
    match format {
        OutputFormat::Json => out.line(serde_json::to_string_pretty(value)?)?,
        OutputFormat::Yaml => out.line(serde_yaml::to_string(value)?.trim_end())?,
        OutputFormat::Pretty => {}
    }
    Ok(())
}

/// Writes every line to the console and, optionally, to a plain-text copy.
///
/// The copy has ANSI escape sequences removed so it reads cleanly in a
/// pager or an email. A closed console (`opsaudit scan | head`) ends
/// console output quietly; the copy is still written in full.
pub struct ReportWriter {
    console: Box<dyn Write>,
    console_open: bool,
    file: Option<(PathBuf, BufWriter<File>)>,
}

impl ReportWriter {
    /// Standard output only
    pub fn console() -> Self {
        Self::with_console(io::stdout())
    }

    /// Any writer standing in for standard output
    pub fn with_console(console: impl Write + 'static) -> Self {
        Self {
            console: Box::new(console),
            console_open: true,
            file: None,
        }
    }

    /// Standard output plus a new file at `path`
    pub fn tee(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self {
            file: Some((path.to_path_buf(), BufWriter::new(file))),
            ..Self::console()
        })
    }

    /// Emit one line
    pub fn line(&mut self, text: impl Display) -> Result<()> {
        let text = text.to_string();
        if self.console_open {
            let written = writeln!(self.console, "{text}");
            self.console_result(written)?;
        }
        if let Some((_, out)) = self.file.as_mut() {
            out.write_all(&strip_ansi_escapes::strip(text.as_bytes()))?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Emit an empty line
    pub fn blank(&mut self) -> Result<()> {
        self.line("")
    }

    /// Flush both sides and return the path of the copy
    pub fn finish(mut self) -> Result<Option<PathBuf>> {
        if self.console_open {
            let flushed = self.console.flush();
            self.console_result(flushed)?;
        }
        match self.file {
            Some((path, mut out)) => {
                out.flush()?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    fn console_result(&mut self, result: io::Result<()>) -> Result<()> {
        match result {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("console closed, dropping further output");
                self.console_open = false;
                Ok(())
            }
            other => Ok(other?),
        }
    }
}

/// Section heading
pub fn heading(text: &str) -> String {
    format!("{}", text.bold().underline())
}

/// Green check line
pub fn pass(text: impl Display) -> String {
    format!("  {} {text}", "✓".green().bold())
}

/// Yellow warning line
pub fn warn(text: impl Display) -> String {
    format!("  {} {text}", "!".yellow().bold())
}

/// Red failure line
pub fn fail(text: impl Display) -> String {
    format!("  {} {text}", "✗".red().bold())
}

/// `$1,234.56`
pub fn money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac}")
}

/// `+$12.00` / `-$3.50`
pub fn signed_money(amount: f64) -> String {
    if amount >= 0.0 {
        format!("+{}", money(amount))
    } else {
        money(amount)
    }
}

/// `+12.5%`, or `n/a` when there is nothing to compare against
pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |p| format!("{p:+.1}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(12.345), "$12.35");
        assert_eq!(money(1234.5), "$1,234.50");
        assert_eq!(money(1_234_567.891), "$1,234,567.89");
        assert_eq!(money(-210.0), "-$210.00");
        assert_eq!(signed_money(210.0), "+$210.00");
        assert_eq!(signed_money(-0.5), "-$0.50");
    }

    #[test]
    fn percent_formats() {
        assert_eq!(percent(Some(233.333)), "+233.3%");
        assert_eq!(percent(Some(-10.0)), "-10.0%");
        assert_eq!(percent(None), "n/a");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Pretty);
        assert!("csv".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn report_copy_is_plain_text() {
        colored::control::set_override(true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        let mut writer = ReportWriter::tee(&path).unwrap();
        writer.line(warn("Found 2 things")).unwrap();
        writer.blank().unwrap();
        writer.line(pass("All clear")).unwrap();
        assert_eq!(writer.finish().unwrap().as_deref(), Some(path.as_path()));

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "  ! Found 2 things\n\n  ✓ All clear\n");
        assert!(!text.contains('\u{1b}'));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    struct Full;

    impl Write for Full {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_console_is_a_clean_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        let mut writer = ReportWriter::with_console(ClosedPipe);
        writer.file = Some((path.clone(), BufWriter::new(File::create(&path).unwrap())));
        writer.line("first").unwrap();
        writer.line("second").unwrap();
        assert!(!writer.console_open);
        writer.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn other_console_errors_propagate() {
        let mut writer = ReportWriter::with_console(Full);
        assert!(writer.line("text").is_err());
    }
}
