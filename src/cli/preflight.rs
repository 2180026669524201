//! Pre-flight checks before operations that need external services.

use crate::error::{Result, TubechatError};

/// Environment variable holding the OpenAI API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chatting needs the API key for embeddings and completions.
    Chat,
    /// Transcript download and keyword search need nothing.
    Transcript,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Chat => {
            require_api_key()?;
        }
        Operation::Transcript => {}
    }
    Ok(())
}

/// Return the configured OpenAI API key.
pub fn require_api_key() -> Result<String> {
    api_key_from(std::env::var(API_KEY_VAR).ok())
}

fn api_key_from(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key),
        Some(_) => Err(TubechatError::MissingCredential(format!(
            "{} is empty. Add it to your environment or a .env file and restart.",
            API_KEY_VAR
        ))),
        None => Err(TubechatError::MissingCredential(format!(
            "{} not found. Add it to your environment or a .env file and restart.",
            API_KEY_VAR
        ))),
    }
}
