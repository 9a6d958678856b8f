//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Overrides the config file location (used by tests)
pub const CONFIG_ENV: &str = "OPSAUDIT_CONFIG";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Default AWS region.
    pub aws_region: Option<String>,

    /// Default AWS named profile.
    pub aws_profile: Option<String>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Where scan reports are written (current directory if unset).
    pub report_dir: Option<PathBuf>,

    /// Look up the origin of attacking addresses.
    #[serde(default = "default_true")]
    pub geo_lookup: bool,

    /// Timeout for each network lookup, in seconds.
    #[serde(default = "default_timeout")]
    pub lookup_timeout_secs: u64,

    /// Rows in top-N tables.
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_true() -> bool {
    true
}

const fn default_timeout() -> u64 {
    5
}

const fn default_top() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws_region: None,
            aws_profile: None,
            output_format: None,
            report_dir: None,
            geo_lookup: default_true(),
            lookup_timeout_secs: default_timeout(),
            top: default_top(),
        }
    }
}

/// Keys accepted by `opsaudit config set`
pub const KEYS: &[(&str, &str)] = &[
    ("aws_region", "Default AWS region"),
    ("aws_profile", "Default AWS named profile"),
    ("output_format", "Default output format (pretty/json/yaml)"),
    ("report_dir", "Directory for scan reports"),
    ("geo_lookup", "Look up attacker origins (true/false)"),
    ("lookup_timeout_secs", "Network lookup timeout in seconds"),
    ("top", "Rows in top-N tables"),
];

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("io", "opsaudit", "opsaudit")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`; a missing file is the default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Set one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "aws_region" | "region" => self.aws_region = Some(value.to_string()),
            "aws_profile" | "profile" => self.aws_profile = Some(value.to_string()),
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "report_dir" => self.report_dir = Some(PathBuf::from(value)),
            "geo_lookup" => {
                self.geo_lookup = value
                    .parse()
                    .with_context(|| format!("geo_lookup must be true or false, got '{value}'"))?;
            }
            "lookup_timeout_secs" => {
                self.lookup_timeout_secs = value
                    .parse()
                    .with_context(|| format!("lookup_timeout_secs must be a number, got '{value}'"))?;
            }
            "top" => {
                let top: usize = value
                    .parse()
                    .with_context(|| format!("top must be a number, got '{value}'"))?;
                anyhow::ensure!(top > 0, "top must be at least 1");
                self.top = top;
            }
            _ => {
                let available = KEYS
                    .iter()
                    .map(|(k, d)| format!("  {k:<20} - {d}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                anyhow::bail!("Unknown config key: {key}\n\nAvailable keys:\n{available}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.geo_lookup);
        assert_eq!(config.top, 10);
    }

    #[test]
    fn set_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.set("region", "eu-west-1").unwrap();
        config.set("output_format", "yaml").unwrap();
        config.set("geo_lookup", "false").unwrap();
        config.set("top", "5").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.aws_region.as_deref(), Some("eu-west-1"));
        assert_eq!(loaded.output_format, Some(OutputFormat::Yaml));
        assert!(!loaded.geo_lookup);
        assert_eq!(loaded.top, 5);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("top", "0").is_err());
        assert!(config.set("geo_lookup", "maybe").is_err());
        assert!(config.set("output_format", "csv").is_err());
        let err = config.set("api_key", "x").unwrap_err().to_string();
        assert!(err.contains("Unknown config key"));
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "aws_profile = \"billing\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.aws_profile.as_deref(), Some("billing"));
        assert_eq!(config.lookup_timeout_secs, 5);
        assert!(config.geo_lookup);
    }
}
