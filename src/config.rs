//! Startup configuration.
//!
//! Read from `bank-insights.json` in the working directory, or from the file
//! named by `BANK_INSIGHTS_CONFIG`.  Every field has a default, so an absent
//! default file is not an error.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::data::loader::{Encoding, LoadOptions};
use crate::viz::DEFAULT_HISTOGRAM_BINS;

pub const CONFIG_ENV: &str = "BANK_INSIGHTS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "bank-insights.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Campaign dataset to load at startup.
    pub data_path: PathBuf,
    /// Field delimiter; must be a single ASCII character.
    pub delimiter: String,
    pub encoding: Encoding,
    /// Rows shown in the data preview table.
    pub preview_rows: usize,
    pub histogram_bins: usize,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("bank-additional-full.csv"),
            delimiter: ";".to_string(),
            encoding: Encoding::Latin1,
            preview_rows: 15,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            window_width: 1280.0,
            window_height: 860.0,
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the environment and working directory.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    log::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(text)?;
        config.load_options()?;
        if config.histogram_bins == 0 {
            log::warn!("histogram_bins must be positive, using {DEFAULT_HISTOGRAM_BINS}");
            config.histogram_bins = DEFAULT_HISTOGRAM_BINS;
        }
        Ok(config)
    }

    /// Loader options derived from `delimiter` and `encoding`.
    pub fn load_options(&self) -> Result<LoadOptions> {
        let delimiter = match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => *b,
            _ => bail!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ),
        };
        Ok(LoadOptions {
            delimiter,
            encoding: self.encoding,
        })
    }
}
