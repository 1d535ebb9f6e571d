pub mod client;
pub mod prompt;
pub mod response;

pub use client::{ChatClient, ClientError};
pub use prompt::{ChatPrompt, PromptBuilder};
pub use response::{Correction, NormalizeError, Rendered, ResponseNormalizer};
