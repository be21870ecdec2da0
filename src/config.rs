use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::ai;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_url: String,
    #[serde(default)]
    pub store_key: String,
    #[serde(default)]
    pub ai_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            store_key: String::new(),
            ai_key: None,
            ai_model: default_ai_model(),
        }
    }
}

impl Config {
    // Config file first, then environment. CLI flags are applied on top by
    // the caller.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(value) = env::var("PJA_STORE_URL") {
            if !value.is_empty() {
                self.store_url = value;
            }
        }
        if let Ok(value) = env::var("PJA_STORE_KEY") {
            if !value.is_empty() {
                self.store_key = value;
            }
        }
        if let Ok(value) = env::var("GEMINI_API_KEY") {
            if !value.is_empty() {
                self.ai_key = Some(value);
            }
        }
        if let Ok(value) = env::var("PJA_AI_MODEL") {
            if !value.is_empty() {
                self.ai_model = value;
            }
        }
    }

    pub fn apply_overrides(&mut self, store_url: Option<String>, store_key: Option<String>) {
        if let Some(url) = store_url {
            self.store_url = url;
        }
        if let Some(key) = store_key {
            self.store_key = key;
        }
    }

    pub fn require_store(&self) -> Result<()> {
        if self.store_url.is_empty() || self.store_key.is_empty() {
            return Err(anyhow!(
                "Store not configured. Run 'pja init' and edit {:?}, or set PJA_STORE_URL and PJA_STORE_KEY.",
                config_path()
            ));
        }
        Ok(())
    }
}

// Writes a starter config file if none exists yet, and reports its path.
pub fn write_starter_config() -> Result<PathBuf> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        let starter = serde_json::to_string_pretty(&Config::default())?;
        fs::write(&path, starter)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
    }
    Ok(path)
}

pub fn config_path() -> PathBuf {
    // Use XDG config directory or fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pja") {
        proj_dirs.config_dir().join("config.json")
    } else {
        PathBuf::from("pja-config.json")
    }
}

pub fn log_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pja") {
        proj_dirs.data_dir().join("pja.log")
    } else {
        PathBuf::from("pja.log")
    }
}

fn default_ai_model() -> String {
    ai::DEFAULT_MODEL.to_string()
}
