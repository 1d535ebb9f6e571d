use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::Correction;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub model: ModelConfig,
    pub output: OutputConfig,
    #[serde(default = "default_corrections")]
    pub corrections: Vec<Correction>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub use_colors: bool,
    pub page_title: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::get_config_path_static()?)?;
        settings.api.api_key = settings.resolved_api_key();
        Ok(settings)
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    /// The environment always wins over the config file so hosted
    /// deployments never need a key on disk. Applied once by `load`;
    /// settings injected elsewhere are taken as-is.
    fn resolved_api_key(&self) -> Option<String> {
        env::var("XAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api.api_key.clone())
    }

    pub fn get_config_path(&self) -> Result<PathBuf> {
        Self::get_config_path_static()
    }

    fn get_config_path_static() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;

        Ok(home_dir.join(".specmatch").join("config.toml"))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://api.x.ai/v1".to_string(),
                api_key: None,
                timeout_secs: 60,
            },
            model: ModelConfig {
                name: "grok-3-mini-beta".to_string(),
                temperature: 0.7,
                max_tokens: 3000,
            },
            output: OutputConfig {
                use_colors: true,
                page_title: "Equipment Comparison Agent".to_string(),
            },
            corrections: default_corrections(),
        }
    }
}

/// The one correction shipped by default: the provider keeps reporting the
/// Lexmark MX942 with the control panel of a much smaller machine.
fn default_corrections() -> Vec<Correction> {
    vec![Correction {
        pattern: "2.8-inch LCD".to_string(),
        replacement: "10.1-inch color touch screen".to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.api.base_url, "https://api.x.ai/v1");
        assert_eq!(settings.model.name, "grok-3-mini-beta");
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[api]
base_url = "http://localhost:8080/v1"
timeout_secs = 5

[model]
name = "test-model"
temperature = 0.0
max_tokens = 100

[output]
use_colors = false
page_title = "Test"

[[corrections]]
pattern = "foo"
replacement = "bar"
"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:8080/v1");
        assert_eq!(settings.api.api_key, None);
        assert_eq!(settings.model.max_tokens, 100);
        assert_eq!(settings.corrections[0].pattern, "foo");
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let settings = Settings::default();
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let reloaded: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(reloaded.api.base_url, settings.api.base_url);
        assert_eq!(reloaded.corrections, settings.corrections);
    }
}
