pub mod ai;
pub mod cli;
pub mod config;

pub use ai::{ChatClient, PromptBuilder, ResponseNormalizer};
pub use cli::{Cli, CommandHandler, Commands};
pub use config::Settings;
