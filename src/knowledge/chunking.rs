//! Size-bounded text chunking for ingestion.
//!
//! Transcript text carries no structure worth preserving, so chunks are cut at whitespace
//! once they reach `chunk_size` characters.

use crate::config::ChunkingSettings;
use serde::{Deserialize, Serialize};

/// A chunk of ingested text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub content: String,
    /// Position of this chunk in the source text.
    pub order: i32,
}

/// Splits text into chunks of at most `chunk_size` characters.
///
/// A single word longer than `chunk_size` becomes its own chunk.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn with_config(settings: &ChunkingSettings) -> Self {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0;

        for word in text.split_whitespace() {
            let word_len = word.chars().count();

            if !current.is_empty() && current_len + 1 + word_len > self.chunk_size {
                chunks.push(current.join(" "));

                let (carried, carried_len) = self.overlap_tail(&current);
                if carried.is_empty() || carried_len + 1 + word_len > self.chunk_size {
                    current.clear();
                    current_len = 0;
                } else {
                    current = carried;
                    current_len = carried_len;
                }
            }

            current_len = if current.is_empty() {
                word_len
            } else {
                current_len + 1 + word_len
            };
            current.push(word);
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, content)| TextChunk {
                content,
                order: i as i32,
            })
            .collect()
    }

    /// Trailing words of `words` fitting in the overlap budget.
    fn overlap_tail<'a>(&self, words: &[&'a str]) -> (Vec<&'a str>, usize) {
        let mut tail = Vec::new();
        let mut len = 0;

        for word in words.iter().rev() {
            let word_len = word.chars().count();
            let next = if tail.is_empty() { word_len } else { len + 1 + word_len };
            if next > self.chunk_overlap {
                break;
            }
            tail.push(*word);
            len = next;
        }

        tail.reverse();
        (tail, len)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::with_config(&ChunkingSettings::default())
    }
}
