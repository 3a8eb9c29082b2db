//! CLI configuration
//!
//! Profiles live in `~/.erp/config.toml` and `~/.erp/config.<profile>.toml`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

pub const KEYS: [&str; 4] = ["api_url", "token", "tenant_id", "format"];

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub tenant_id: Option<String>,
    pub format: Option<OutputFormat>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?).with_context(|| format!("writing {}", path.display()))
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let home = dirs::home_dir().context("cannot find home directory")?;
        Ok(Self::path_in(&home, profile))
    }

    fn path_in(home: &Path, profile: Option<&str>) -> PathBuf {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        home.join(".erp").join(filename)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "api_url" => self.api_url = Some(value),
            "token" => self.token = Some(value),
            "tenant_id" => self.tenant_id = Some(value),
            "format" => {
                let format = <OutputFormat as clap::ValueEnum>::from_str(&value, true)
                    .map_err(|e| anyhow::anyhow!(e))?;
                self.format = Some(format);
            }
            _ => bail!("unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// Display value of a key; tokens are masked
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match key {
            "api_url" => self.api_url.clone(),
            "token" => self.token.as_deref().map(mask),
            "tenant_id" => self.tenant_id.clone(),
            "format" => self.format.map(|f| f.to_string()),
            _ => bail!("unknown config key: {} (expected one of {})", key, KEYS.join(", ")),
        })
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(6).collect();
    format!("{}****", visible)
}
