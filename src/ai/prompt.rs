use chrono::{Local, NaiveDate};

/// System/user message pair for one chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

const COLUMNS: &str = "print speed (ppm), resolution (dpi), connectivity, \
functions, paper capacity (sheets), screen size (inches) and approximate price";

pub struct PromptBuilder;

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the comparison-mode prompt for two equipment models.
    ///
    /// The model names are interpolated verbatim. Escaping is the HTML
    /// layer's job, not the prompt's.
    pub fn comparison(&self, model1: &str, model2: &str) -> ChatPrompt {
        Self::comparison_at(model1, model2, Local::now().date_naive())
    }

    /// Builds the search-mode prompt for a free-text equipment description.
    pub fn search(&self, input_text: &str) -> ChatPrompt {
        Self::search_at(input_text, Local::now().date_naive())
    }

    fn comparison_at(model1: &str, model2: &str, today: NaiveDate) -> ChatPrompt {
        ChatPrompt {
            system: "You are a highly capable assistant specialized in comparing \
                     technical specifications of printers and multifunction devices. \
                     Use exactly the model names supplied by the user."
                .to_string(),
            user: format!(
                "Compare the models {model1} and {model2}. Include {COLUMNS}. \
                 Use specifications current as of {today}. \
                 Return only a complete Markdown table, with no text before or after it."
            ),
        }
    }

    fn search_at(input_text: &str, today: NaiveDate) -> ChatPrompt {
        ChatPrompt {
            system: "You are a highly capable assistant specialized in recommending \
                     printers and multifunction devices that match a buyer's \
                     requirements. Base your suggestions only on the description \
                     supplied by the user."
                .to_string(),
            user: format!(
                "Suggest equipment matching this description: {input_text}. \
                 List one model per row and include {COLUMNS}. \
                 Use specifications current as of {today}. \
                 Return only a complete Markdown table, with no text before or after it."
            ),
        }
    }
}
