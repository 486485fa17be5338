use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::{Result, anyhow};

/// On-disk settings. Every field is optional: command-line flags take
/// precedence, and built-in defaults fill whatever is left.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub memory_path: Option<PathBuf>,
    pub context_window: Option<usize>,
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
    pub max_tokens: Option<u32>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(app_dir()?.join("config.json"))
    }
}

/// Where the saved-memory file lives unless overridden
pub fn default_memory_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("memory.json"))
}

/// Per-user directory holding config, saved memory, and logs
pub fn app_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;

    Ok(config_dir.join("charla"))
}
