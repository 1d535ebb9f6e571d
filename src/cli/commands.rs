use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;

use crate::ai::{ChatClient, ChatPrompt, PromptBuilder, Rendered, ResponseNormalizer};
use crate::cli::output::{self, RenderOutcome};
use crate::cli::{Commands, OutputFormatter, RenderOptions, Spinner};
use crate::config::{DefaultConfig, Settings};

pub struct CommandHandler {
    settings: Settings,
    client: ChatClient,
    prompts: PromptBuilder,
    normalizer: ResponseNormalizer,
    formatter: OutputFormatter,
}

impl CommandHandler {
    pub fn new() -> Result<Self> {
        Self::with_settings(Settings::load()?)
    }

    pub fn with_settings(settings: Settings) -> Result<Self> {
        let client = ChatClient::new(&settings)?;
        let prompts = PromptBuilder::new();
        let normalizer = ResponseNormalizer::new(settings.corrections.clone());
        let formatter = OutputFormatter::new(settings.output.use_colors);

        Ok(Self {
            settings,
            client,
            prompts,
            normalizer,
            formatter,
        })
    }

    pub async fn handle_command(
        &mut self,
        command: Commands,
        options: RenderOptions,
    ) -> Result<String> {
        match command {
            Commands::Compare { model1, model2 } => {
                self.handle_compare(&model1, &model2, &options).await
            }
            Commands::Search { description } => {
                self.handle_search(&description.join(" "), &options).await
            }
            Commands::Init => self.handle_init(),
            Commands::Config => self.handle_config(),
            Commands::Version => Ok(version_info()),
        }
    }

    async fn handle_compare(
        &self,
        model1: &str,
        model2: &str,
        options: &RenderOptions,
    ) -> Result<String> {
        // Rejected before any API cost is incurred.
        if model1.trim().is_empty() || model2.trim().is_empty() {
            return Ok(self
                .formatter
                .format_error("Both model names are required, e.g. \"Lexmark MX421\""));
        }

        debug!("Comparing {model1} vs {model2}");
        let prompt = self.prompts.comparison(model1, model2);
        self.run(prompt, options).await
    }

    async fn handle_search(&self, description: &str, options: &RenderOptions) -> Result<String> {
        if description.trim().is_empty() {
            return Ok(self
                .formatter
                .format_error("A description of the desired equipment is required"));
        }

        debug!("Searching for: {description}");
        let prompt = self.prompts.search(description);
        self.run(prompt, options).await
    }

    async fn run(&self, prompt: ChatPrompt, options: &RenderOptions) -> Result<String> {
        let spinner = Spinner::new("Querying the model...");
        let outcome = self.query(&prompt).await;
        spinner.stop();

        self.present(outcome, options)
    }

    /// Folds every failure kind into the tagged outcome. Nothing past this
    /// point can take the process down; each error is scoped to its request.
    async fn query(&self, prompt: &ChatPrompt) -> RenderOutcome {
        match self.client.complete(prompt).await {
            Ok(raw) => match self.normalizer.normalize(&raw) {
                Ok(Rendered::Html { html, markdown }) => RenderOutcome::Table { html, markdown },
                Ok(Rendered::Raw { markdown }) => RenderOutcome::RawText { markdown },
                Err(err) => RenderOutcome::Error {
                    message: format!("{err}. Try rephrasing the request."),
                },
            },
            Err(err) => RenderOutcome::Error {
                message: err.to_string(),
            },
        }
    }

    fn present(&self, outcome: RenderOutcome, options: &RenderOptions) -> Result<String> {
        if let Some(path) = &options.output {
            let page = output::render_page(&self.settings.output.page_title, &outcome);
            fs::write(path, page)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote result page to {}", path.display());
            return Ok(self
                .formatter
                .format_success(&format!("Wrote {}", path.display())));
        }

        Ok(self.formatter.format_outcome(&outcome, options.raw))
    }

    fn handle_init(&self) -> Result<String> {
        let config_path = self.settings.get_config_path()?;

        if config_path.exists() {
            return Ok(self
                .formatter
                .format_warning(&format!("Config already exists at {}", config_path.display())));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, DefaultConfig::create_default_config_file())?;

        Ok(self
            .formatter
            .format_success(&format!("Wrote default config to {}", config_path.display())))
    }

    fn handle_config(&self) -> Result<String> {
        let key_state = if self.settings.api.api_key.is_some() {
            "configured"
        } else {
            "missing (set XAI_API_KEY)"
        };

        Ok(format!(
            "Specmatch Configuration:\n\
            - Config file: {:?}\n\
            - API base URL: {}\n\
            - API key: {}\n\
            - Model: {}\n\
            - Temperature: {}\n\
            - Max tokens: {}\n\
            - Request timeout: {}s\n\
            - Corrections: {}\n",
            self.settings.get_config_path(),
            self.settings.api.base_url,
            key_state,
            self.settings.model.name,
            self.settings.model.temperature,
            self.settings.model.max_tokens,
            self.settings.api.timeout_secs,
            self.settings.corrections.len()
        ))
    }

    pub fn format_error(&self, message: &str) -> String {
        self.formatter.format_error(message)
    }
}

/// The one source of the version banner; main prints it without building a
/// handler, the `version` subcommand routes here too.
pub fn version_info() -> String {
    format!(
        "specmatch {}\nPlatform: {}-{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> CommandHandler {
        // Injected defaults keep the tests off the developer's config file.
        CommandHandler::with_settings(Settings::default()).unwrap()
    }

    fn options() -> RenderOptions {
        RenderOptions {
            output: None,
            raw: false,
            verbose: false,
        }
    }

    #[test]
    fn empty_model_names_are_rejected_before_any_request() {
        let output =
            tokio_test::block_on(handler().handle_compare("  ", "HP M428", &options())).unwrap();
        assert!(output.contains("Both model names are required"));
    }

    #[test]
    fn empty_search_description_is_rejected() {
        let output = tokio_test::block_on(handler().handle_search("", &options())).unwrap();
        assert!(output.contains("description of the desired equipment"));
    }

    #[test]
    fn version_banner_names_binary_and_platform() {
        let banner = version_info();
        assert!(banner.starts_with("specmatch "));
        assert!(banner.contains(std::env::consts::OS));
    }
}
