use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::parse_number;

pub const DEFAULT_DB_PATH: &str = "./liftbook.db";
pub const DEFAULT_BAR_WEIGHT: f64 = 20.0;
pub const DEFAULT_WARMUP_SETS: usize = 3;

/// Flat key/value settings stored as TOML. Unknown keys are kept as is.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub map: BTreeMap<String, String>,
}

pub fn default_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("liftbook").join("config"))
        .context("Could not determine config directory")
}

impl Config {
    /// A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read config `{}`", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config `{}`", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Could not create `{}`", dir.display()))?;
        }
        let text = toml::to_string(self).context("Could not serialize config")?;
        fs::write(path, text).with_context(|| format!("Could not write config `{}`", path.display()))
    }

    pub fn db_path(&self) -> String {
        self.map
            .get("db_path")
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
    }

    pub fn bar_weight(&self) -> f64 {
        self.map
            .get("bar_weight")
            .map(|v| parse_number(v))
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_BAR_WEIGHT)
    }

    pub fn warmup_sets(&self) -> usize {
        self.map
            .get("warmup_sets")
            .and_then(|v| v.trim().parse().ok())
            .filter(|n| (1..=3).contains(n))
            .unwrap_or(DEFAULT_WARMUP_SETS)
    }
}
