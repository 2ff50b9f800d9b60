use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Owner id: attempts and snapshots are keyed by it, so switching the
    /// profile hides another profile's in-progress session.
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_profile() -> String {
    "default".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizr")
            .join("config.toml")
    }

    /// An empty profile would collapse every user onto the same key.
    pub fn normalize(&mut self) {
        if self.profile.trim().is_empty() {
            self.profile = default_profile();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.profile, "default");
        assert_eq!(config.theme, "catppuccin-mocha");
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config: Config = toml::from_str("theme = \"gruvbox-dark\"").unwrap();
        assert_eq!(config.theme, "gruvbox-dark");
        assert_eq!(config.profile, "default");
    }

    #[test]
    fn round_trip() {
        let config = Config {
            profile: "marie".to_string(),
            theme: "gruvbox-dark".to_string(),
        };
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.profile, "marie");
        assert_eq!(deserialized.theme, "gruvbox-dark");
    }

    #[test]
    fn save_writes_a_loadable_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("quizr").join("config.toml");
        let config = Config {
            profile: "marie".to_string(),
            theme: "gruvbox-dark".to_string(),
        };
        config.save_to(&path).unwrap();

        let reloaded: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.profile, "marie");
        assert_eq!(reloaded.theme, "gruvbox-dark");
    }

    #[test]
    fn normalize_rejects_blank_profile() {
        let mut config = Config {
            profile: "   ".to_string(),
            theme: default_theme(),
        };
        config.normalize();
        assert_eq!(config.profile, "default");
    }
}
