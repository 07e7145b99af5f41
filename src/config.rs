use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_level_up_hold_ms")]
    pub level_up_hold_ms: u64,
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_idle_timeout_secs() -> u64 {
    30
}
fn default_level_up_hold_ms() -> u64 {
    3000
}
fn default_save_debounce_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            idle_timeout_secs: default_idle_timeout_secs(),
            level_up_hold_ms: default_level_up_hold_ms(),
            save_debounce_ms: default_save_debounce_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codepet")
            .join("config.toml")
    }

    /// Clamp timings to workable floors. A zero timeout from a hand-edited
    /// file would otherwise flap the pet idle on every tick.
    pub fn validate(&mut self) {
        self.idle_timeout_secs = self.idle_timeout_secs.clamp(5, 3600);
        self.level_up_hold_ms = self.level_up_hold_ms.clamp(500, 60_000);
        self.save_debounce_ms = self.save_debounce_ms.clamp(100, 60_000);
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn level_up_hold(&self) -> Duration {
        Duration::from_millis(self.level_up_hold_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}
