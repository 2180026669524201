//! Error types for tubechat.

use thiserror::Error;

/// Library-level error type for tubechat operations.
#[derive(Error, Debug)]
pub enum TubechatError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrlKind(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Failed to add video to knowledge base: {0}")]
    Ingestion(String),

    #[error("Chat failed: {0}")]
    Chat(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("No video loaded. Open a video URL first.")]
    NoVideoLoaded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Knowledge store error: {0}")]
    Store(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for tubechat operations.
pub type Result<T> = std::result::Result<T, TubechatError>;
