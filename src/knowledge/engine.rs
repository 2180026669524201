//! Retrieval-augmented question answering over ingested transcripts.

use super::{
    ChunkStore, DataType, Embedder, KnowledgeBase, LanguageModel, OpenAIChatModel,
    OpenAIEmbedder, ScoredChunk, SourceMetadata, SqliteChunkStore, StoredChunk, TextChunker,
};
use crate::config::{Prompts, Settings};
use crate::error::{Result, TubechatError};
use crate::openai::create_client_with_timeout;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// One answered question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

/// Knowledge base embedding chunks into a [`ChunkStore`] and answering with a
/// [`LanguageModel`].
pub struct EmbeddedKnowledgeBase {
    chunker: TextChunker,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn ChunkStore>,
    llm: Arc<dyn LanguageModel>,
    prompts: Prompts,
    max_context_chunks: usize,
    history_turns: usize,
    history: Vec<ChatTurn>,
}

impl EmbeddedKnowledgeBase {
    /// Build the OpenAI-backed knowledge base with its store at `store_path`.
    pub fn from_settings(settings: &Settings, api_key: &str, store_path: &Path) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client =
            create_client_with_timeout(api_key, Duration::from_secs(settings.llm.timeout_secs))?;

        let embedder = Arc::new(OpenAIEmbedder::new(client.clone(), &settings.embedding));
        let llm = Arc::new(OpenAIChatModel::new(client, &settings.llm));
        let store = Arc::new(SqliteChunkStore::new(store_path)?);

        Ok(Self::with_components(
            TextChunker::with_config(&settings.chunking),
            embedder,
            store,
            llm,
            prompts,
        )
        .with_max_context_chunks(settings.llm.max_context_chunks)
        .with_history_turns(settings.llm.history_turns))
    }

    /// Create a knowledge base from custom components.
    pub fn with_components(
        chunker: TextChunker,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn ChunkStore>,
        llm: Arc<dyn LanguageModel>,
        prompts: Prompts,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
            llm,
            prompts,
            max_context_chunks: 3,
            history_turns: 5,
            history: Vec::new(),
        }
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_max_context_chunks(mut self, max_context_chunks: usize) -> Self {
        self.max_context_chunks = max_context_chunks;
        self
    }

    /// Set how many previous turns are replayed to the model.
    pub fn with_history_turns(mut self, history_turns: usize) -> Self {
        self.history_turns = history_turns;
        self
    }

    /// Conversation so far, oldest first.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    fn build_prompt(&self, question: &str, context: &[ScoredChunk]) -> String {
        let context_text = if context.is_empty() {
            "(no transcript excerpts available)".to_string()
        } else {
            context
                .iter()
                .map(|c| c.chunk.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let history_text = if self.history.is_empty() {
            "(none)".to_string()
        } else {
            self.history
                .iter()
                .map(|turn| format!("Q: {}\nA: {}", turn.question, turn.answer))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context_text);
        vars.insert("history".to_string(), history_text);
        vars.insert("question".to_string(), question.to_string());

        self.prompts.render_with_custom(&self.prompts.chat.user, &vars)
    }
}

#[async_trait]
impl KnowledgeBase for EmbeddedKnowledgeBase {
    #[instrument(skip(self, text), fields(url = %metadata.url, len = text.len()))]
    async fn add(&self, text: &str, data_type: DataType, metadata: &SourceMetadata) -> Result<usize> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(TubechatError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let stored: Vec<StoredChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                StoredChunk::new(
                    metadata.url.clone(),
                    metadata.title.clone(),
                    data_type,
                    chunk.content,
                    chunk.order,
                    embedding,
                )
            })
            .collect();

        let count = self.store.replace_source(&metadata.url, &stored).await?;
        info!("Added {} chunks from '{}'", count, metadata.title);
        Ok(count)
    }

    #[instrument(skip(self), fields(query = %query))]
    async fn chat(&mut self, query: &str) -> Result<String> {
        let query_embedding = self.embedder.embed(query).await?;
        let context = self
            .store
            .search(&query_embedding, self.max_context_chunks)
            .await?;
        debug!("Retrieved {} context chunks", context.len());

        let user_prompt = self.build_prompt(query, &context);
        let answer = self.llm.complete(&self.prompts.chat.system, &user_prompt).await?;

        self.history.push(ChatTurn {
            question: query.to_string(),
            answer: answer.clone(),
        });
        if self.history.len() > self.history_turns {
            let excess = self.history.len() - self.history_turns;
            self.history.drain(..excess);
        }

        Ok(answer)
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::embedding::tests::LetterEmbedder;
    use std::sync::Mutex;

    /// Echoes the user prompt back and remembers every call.
    #[derive(Default)]
    struct RecordingModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(user.to_string());
            Ok(format!("answer {}", prompts.len()))
        }
    }

    fn knowledge_base(llm: Arc<RecordingModel>) -> (EmbeddedKnowledgeBase, Arc<SqliteChunkStore>) {
        let store = Arc::new(SqliteChunkStore::in_memory().unwrap());
        let kb = EmbeddedKnowledgeBase::with_components(
            TextChunker::new(30, 0),
            Arc::new(LetterEmbedder),
            store.clone(),
            llm,
            Prompts::default(),
        )
        .with_max_context_chunks(1)
        .with_history_turns(2);
        (kb, store)
    }

    fn metadata() -> SourceMetadata {
        SourceMetadata {
            title: "Unknown".to_string(),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_chunks_and_replaces() {
        let (kb, store) = knowledge_base(Arc::new(RecordingModel::default()));

        let text = "zebras zigzag across the zoo while bees buzz around the hive all day";
        let added = kb.add(text, DataType::Text, &metadata()).await.unwrap();
        assert!(added > 1);
        assert_eq!(store.chunk_count().await.unwrap(), added);

        let again = kb.add(text, DataType::Text, &metadata()).await.unwrap();
        assert_eq!(store.chunk_count().await.unwrap(), again);
    }

    #[tokio::test]
    async fn test_add_empty_text() {
        let (kb, store) = knowledge_base(Arc::new(RecordingModel::default()));
        assert_eq!(kb.add("  ", DataType::Text, &metadata()).await.unwrap(), 0);
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_chat_uses_best_context_and_history() {
        let llm = Arc::new(RecordingModel::default());
        let (mut kb, _store) = knowledge_base(llm.clone());

        kb.add(
            "zebras zigzag in a zoo. apples and pears are fruit",
            DataType::Text,
            &metadata(),
        )
        .await
        .unwrap();

        let first = kb.chat("zzz zebra zoo").await.unwrap();
        assert_eq!(first, "answer 1");
        {
            let prompts = llm.prompts.lock().unwrap();
            assert!(prompts[0].contains("zebras zigzag"));
            assert!(!prompts[0].contains("pears"));
            assert!(prompts[0].contains("Question: zzz zebra zoo"));
        }

        kb.chat("second").await.unwrap();
        kb.chat("third").await.unwrap();
        assert_eq!(kb.history().len(), 2);
        assert_eq!(kb.history()[0].question, "second");

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[2].contains("Q: second\nA: answer 2"));
    }

    #[tokio::test]
    async fn test_placeholders_in_transcript_reach_model_verbatim() {
        let llm = Arc::new(RecordingModel::default());
        let (mut kb, _store) = knowledge_base(llm.clone());

        kb.add("he said {{question}} twice", DataType::Text, &metadata())
            .await
            .unwrap();
        kb.chat("what did he say about {{history}}").await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("he said {{question}} twice"));
        assert!(prompts[0].contains("Question: what did he say about {{history}}"));
        assert!(prompts[0].contains("(none)"));
    }

    #[tokio::test]
    async fn test_clear_history() {
        let (mut kb, _store) = knowledge_base(Arc::new(RecordingModel::default()));
        kb.chat("anything").await.unwrap();
        assert_eq!(kb.history().len(), 1);
        kb.clear_history();
        assert!(kb.history().is_empty());
    }
}
