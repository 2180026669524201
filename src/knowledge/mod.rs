//! Knowledge base used to answer questions about a video.
//!
//! The session only talks to the [`KnowledgeBase`] trait: text goes in once per video,
//! questions come back as free-text answers. [`EmbeddedKnowledgeBase`] is the bundled
//! implementation, built from a text chunker, OpenAI embeddings, a SQLite chunk store and
//! an OpenAI chat model.

mod chunking;
mod embedding;
mod engine;
mod llm;
mod store;

pub use chunking::{TextChunk, TextChunker};
pub use embedding::{Embedder, OpenAIEmbedder};
pub use engine::{ChatTurn, EmbeddedKnowledgeBase};
pub use llm::{LanguageModel, OpenAIChatModel};
pub use store::{cosine_similarity, ChunkStore, ScoredChunk, SqliteChunkStore, StoredChunk};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of content handed to the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(DataType::Text),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }
}

/// Where an ingested text came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub title: String,
    pub url: String,
}

/// Question answering over ingested text.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Ingest a text. Returns the number of chunks stored.
    async fn add(&self, text: &str, data_type: DataType, metadata: &SourceMetadata) -> Result<usize>;

    /// Answer a question against everything ingested so far.
    async fn chat(&mut self, query: &str) -> Result<String>;

    /// Forget the conversation so far, keeping ingested content.
    fn clear_history(&mut self) {}
}
