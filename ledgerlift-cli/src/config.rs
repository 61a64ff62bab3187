use anyhow::{Context, Result, bail};
use ledgerlift_core::{ParseOptions, RowPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::state::{ensure_ledgerlift_home, ledgerlift_home};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ingest: IngestSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSection {
    /// Currency code attached to parsed statements
    pub default_currency: String,
    /// Skip rows without a parseable date instead of stamping today's date
    pub strict: bool,
    /// Files above this size are refused before parsing
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_max_file_bytes() -> u64 {
    20 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest: IngestSection {
                default_currency: "INR".to_string(),
                strict: false,
                max_file_bytes: default_max_file_bytes(),
            },
        }
    }
}

impl Config {
    /// Engine options from the file, with command-line overrides applied.
    pub fn parse_options(&self, currency: Option<String>, strict: bool) -> ParseOptions {
        let policy = if strict || self.ingest.strict {
            RowPolicy::Strict
        } else {
            RowPolicy::Lenient
        };
        ParseOptions::new(currency.unwrap_or_else(|| self.ingest.default_currency.clone()))
            .with_row_policy(policy)
    }

    /// Parse `config.toml` text and reject values the parser cannot work with.
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(text).context("parse config.toml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let currency = &self.ingest.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("ingest.default_currency must be a three-letter code, got {currency:?}");
        }
        if self.ingest.max_file_bytes == 0 {
            bail!("ingest.max_file_bytes must be greater than zero");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ledgerlift_home()?.join(CONFIG_FILE))
}

/// The config on disk, or the defaults when there is none yet.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    match fs::read_to_string(&path) {
        Ok(text) => Config::from_toml(&text).with_context(|| format!("in {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
    }
}

/// Write the default config unless one exists. Returns the path and whether
/// it was created.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let path = ensure_ledgerlift_home()?.join(CONFIG_FILE);
    if path.exists() {
        return Ok((path, false));
    }
    let text = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    Ok((path, true))
}
