//! Configuration file support for stowage.
//!
//! Loads `stowage.toml` from an explicit path, the working directory, or
//! the user's config directory, in that order.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stowage_logging::LoggerConfig;

/// Server configuration loaded from `stowage.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StowageConfig {
    /// Directory holding one subdirectory per bucket
    pub data_dir: Option<PathBuf>,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The `[logging]` table
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Suppress informational output
    #[serde(default)]
    pub quiet: bool,
    /// Emit error records as JSON lines (implies quiet)
    #[serde(default)]
    pub json: bool,
    /// Filter for internal diagnostics on stderr
    pub level: Option<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "stowage.toml";

const DEFAULT_DIAGNOSTICS_LEVEL: &str = "warn";

impl StowageConfig {
    /// Load configuration from a specific file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: StowageConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Look for `stowage.toml` in `working_dir`, then in the user config
    /// directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file exists and parses successfully
    /// - `Ok(None)` if no file exists
    /// - `Err(...)` if a file exists but fails to parse (hard error)
    pub fn discover(working_dir: &Path) -> Result<Option<Self>> {
        let candidates = std::iter::once(working_dir.join(CONFIG_FILE_NAME)).chain(
            dirs::config_dir().map(|dir| dir.join("stowage").join(CONFIG_FILE_NAME)),
        );

        for path in candidates {
            if path.exists() {
                return Self::load_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Logger switches from the file, with command-line flags layered on top.
    /// Flags can only turn modes on.
    pub fn logger_config(&self, quiet: bool, json: bool) -> LoggerConfig {
        let mut config = LoggerConfig::default();
        if self.logging.quiet || quiet {
            config.enable_quiet();
        }
        if self.logging.json || json {
            config.enable_json();
        }
        config
    }

    /// Diagnostics filter. Priority: flag > file > default
    pub fn diagnostics_level<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.or(self.logging.level.as_deref())
            .unwrap_or(DEFAULT_DIAGNOSTICS_LEVEL)
    }
}
