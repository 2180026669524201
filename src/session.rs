//! Per-user session context.
//!
//! A [`Session`] owns everything one user interaction needs: the knowledge base, its
//! temporary storage, and the currently loaded video with its transcript segments.
//! Dropping or closing the session removes the temporary storage.

use crate::cli::preflight;
use crate::config::Settings;
use crate::error::{Result, TubechatError};
use crate::knowledge::{DataType, EmbeddedKnowledgeBase, KnowledgeBase, SourceMetadata};
use crate::matcher::{best_match, MatchResult, TimestampLink};
use crate::resolver::{resolve, VideoId};
use crate::transcript::{
    fetch_segments, TranscriptBundle, TranscriptSource, YoutubeTranscriptSource,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{info, instrument, warn};

/// What happened to the transcript of a freshly opened video.
#[derive(Debug)]
pub enum IngestStatus {
    /// Transcript added to the knowledge base.
    Added { chunks: usize },
    /// Nothing to add: the video has no transcript.
    Skipped,
    /// The knowledge base rejected the transcript.
    Failed(TubechatError),
}

/// Report of [`Session::open_video`].
#[derive(Debug)]
pub struct VideoLoad {
    pub video_id: VideoId,
    pub title: String,
    pub segment_count: usize,
    /// Non-fatal transcript warning for the user.
    pub warning: Option<String>,
    pub ingest: IngestStatus,
}

/// Answer to a question about the loaded video.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Best keyword match, present only when some segment matched.
    pub timestamp: Option<TimestampLink>,
}

/// The video currently in focus.
#[derive(Debug, Clone)]
struct LoadedVideo {
    id: VideoId,
    bundle: TranscriptBundle,
}

/// Session context: created at session start, torn down at session end.
pub struct Session {
    storage: TempDir,
    source: Arc<dyn TranscriptSource>,
    knowledge: Box<dyn KnowledgeBase>,
    current: Option<LoadedVideo>,
}

impl Session {
    /// Start a session backed by YouTube captions and the OpenAI knowledge base.
    ///
    /// Fails with [`TubechatError::MissingCredential`] when no API key is configured.
    #[instrument(skip_all)]
    pub fn start(settings: &Settings) -> Result<Self> {
        let api_key = preflight::require_api_key()?;

        let base = settings.temp_dir();
        std::fs::create_dir_all(&base)?;
        let storage = tempfile::Builder::new()
            .prefix("session-")
            .tempdir_in(&base)?;

        let knowledge = EmbeddedKnowledgeBase::from_settings(
            settings,
            &api_key,
            &storage.path().join("knowledge.db"),
        )?;
        let source = YoutubeTranscriptSource::with_config(&settings.youtube);

        info!("Session storage at {:?}", storage.path());
        Ok(Self::with_components(
            storage,
            Arc::new(source),
            Box::new(knowledge),
        ))
    }

    /// Create a session from custom components.
    pub fn with_components(
        storage: TempDir,
        source: Arc<dyn TranscriptSource>,
        knowledge: Box<dyn KnowledgeBase>,
    ) -> Self {
        Self {
            storage,
            source,
            knowledge,
            current: None,
        }
    }

    /// Directory holding this session's temporary data.
    pub fn storage_path(&self) -> &Path {
        self.storage.path()
    }

    /// Identifier of the loaded video, if any.
    pub fn video_id(&self) -> Option<&VideoId> {
        self.current.as_ref().map(|v| &v.id)
    }

    /// Transcript of the loaded video, if any.
    pub fn transcript(&self) -> Option<&TranscriptBundle> {
        self.current.as_ref().map(|v| &v.bundle)
    }

    /// Load a video: fetch its transcript and add it to the knowledge base.
    ///
    /// Only an unrecognized URL is an error. A missing transcript or a failed ingestion is
    /// reported in the returned [`VideoLoad`], and the video becomes current either way.
    #[instrument(skip(self))]
    pub async fn open_video(&mut self, url: &str) -> Result<VideoLoad> {
        let video_id = resolve(url)?;
        let outcome = fetch_segments(self.source.as_ref(), &video_id).await;
        let warning = outcome.warning();
        let bundle = outcome.into_bundle();

        let ingest = if bundle.has_transcript() {
            let metadata = SourceMetadata {
                title: bundle.title.clone(),
                url: url.to_string(),
            };
            match self
                .knowledge
                .add(&bundle.flat_text, DataType::Text, &metadata)
                .await
            {
                Ok(chunks) => IngestStatus::Added { chunks },
                Err(e) => {
                    warn!(error = %e, "Failed to add transcript to knowledge base");
                    IngestStatus::Failed(TubechatError::Ingestion(e.to_string()))
                }
            }
        } else {
            IngestStatus::Skipped
        };

        let load = VideoLoad {
            video_id: video_id.clone(),
            title: bundle.title.clone(),
            segment_count: bundle.segments.len(),
            warning,
            ingest,
        };

        self.current = Some(LoadedVideo {
            id: video_id,
            bundle,
        });

        Ok(load)
    }

    /// Answer a question and point at the most relevant moment of the video.
    #[instrument(skip(self))]
    pub async fn ask(&mut self, query: &str) -> Result<Answer> {
        let video_id = match &self.current {
            Some(video) => video.id.clone(),
            None => return Err(TubechatError::NoVideoLoaded),
        };

        let text = self
            .knowledge
            .chat(query)
            .await
            .map_err(|e| TubechatError::Chat(e.to_string()))?;

        let timestamp = self.locate(query).timestamp_link(&video_id);

        Ok(Answer { text, timestamp })
    }

    /// Keyword match of `query` against the loaded transcript.
    pub fn locate(&self, query: &str) -> MatchResult {
        match &self.current {
            Some(video) => best_match(query, &video.bundle.segments),
            None => MatchResult::none(),
        }
    }

    /// Forget the conversation, keeping the loaded video and ingested content.
    pub fn clear_history(&mut self) {
        self.knowledge.clear_history();
    }

    /// End the session and delete its temporary storage.
    pub fn close(self) -> Result<()> {
        let path = self.storage.path().to_path_buf();
        self.storage.close()?;
        info!("Removed session storage {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::transcript::tests::{sample_segments, StaticSource};
    use crate::transcript::NO_TRANSCRIPT;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct FakeKnowledge {
        pub(crate) added: Arc<Mutex<Vec<(String, SourceMetadata)>>>,
        pub(crate) fail_add: bool,
        pub(crate) fail_chat: bool,
    }

    #[async_trait]
    impl KnowledgeBase for FakeKnowledge {
        async fn add(&self, text: &str, data_type: DataType, metadata: &SourceMetadata) -> Result<usize> {
            assert_eq!(data_type, DataType::Text);
            if self.fail_add {
                return Err(TubechatError::OpenAI("rate limited".to_string()));
            }
            self.added
                .lock()
                .unwrap()
                .push((text.to_string(), metadata.clone()));
            Ok(1)
        }

        async fn chat(&mut self, query: &str) -> Result<String> {
            if self.fail_chat {
                return Err(TubechatError::OpenAI("timeout".to_string()));
            }
            Ok(format!("answer to {}", query))
        }
    }

    pub(crate) fn session(source: StaticSource, knowledge: FakeKnowledge) -> Session {
        Session::with_components(
            tempfile::tempdir().unwrap(),
            Arc::new(source),
            Box::new(knowledge),
        )
    }

    pub(crate) const URL: &str = "https://www.youtube.com/watch?v=abc123&list=xyz";

    #[tokio::test]
    async fn test_open_video_ingests_transcript() {
        let knowledge = FakeKnowledge::default();
        let added = knowledge.added.clone();
        let mut session = session(StaticSource(Ok(sample_segments())), knowledge);

        let load = session.open_video(URL).await.unwrap();
        assert_eq!(load.video_id.as_str(), "abc123");
        assert_eq!(load.title, "Unknown");
        assert_eq!(load.segment_count, 2);
        assert!(load.warning.is_none());
        assert!(matches!(load.ingest, IngestStatus::Added { chunks: 1 }));

        let added = added.lock().unwrap();
        assert_eq!(added[0].0, "hello world hello there friend");
        assert_eq!(added[0].1.url, URL);
        assert_eq!(added[0].1.title, "Unknown");
    }

    #[tokio::test]
    async fn test_open_video_without_transcript_skips_ingestion() {
        let knowledge = FakeKnowledge::default();
        let added = knowledge.added.clone();
        let mut session = session(StaticSource(Err("no captions".to_string())), knowledge);

        let load = session.open_video(URL).await.unwrap();
        assert!(load.warning.unwrap().contains("no captions"));
        assert!(matches!(load.ingest, IngestStatus::Skipped));
        assert!(added.lock().unwrap().is_empty());
        assert_eq!(session.transcript().unwrap().flat_text, NO_TRANSCRIPT);
        assert_eq!(session.video_id().unwrap().as_str(), "abc123");
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let mut session = session(StaticSource(Ok(sample_segments())), FakeKnowledge::default());
        let err = session.open_video("https://youtu.be/abc123").await.unwrap_err();
        assert!(matches!(err, TubechatError::InvalidUrlKind(_)));
        assert!(session.video_id().is_none());
    }

    #[tokio::test]
    async fn test_ingestion_failure_keeps_session_usable() {
        let knowledge = FakeKnowledge {
            fail_add: true,
            ..Default::default()
        };
        let mut session = session(StaticSource(Ok(sample_segments())), knowledge);

        let load = session.open_video(URL).await.unwrap();
        assert!(matches!(load.ingest, IngestStatus::Failed(TubechatError::Ingestion(_))));

        let answer = session.ask("who is the friend").await.unwrap();
        assert_eq!(answer.text, "answer to who is the friend");
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_timestamp() {
        let mut session = session(StaticSource(Ok(sample_segments())), FakeKnowledge::default());
        session.open_video(URL).await.unwrap();

        let answer = session.ask("friend").await.unwrap();
        let link = answer.timestamp.unwrap();
        assert_eq!(link.seconds, 5);
        assert_eq!(link.url, "https://www.youtube.com/watch?v=abc123&t=5s");

        let answer = session.ask("nothing relevant").await.unwrap();
        assert!(answer.timestamp.is_none());
    }

    #[tokio::test]
    async fn test_ask_without_video() {
        let mut session = session(StaticSource(Ok(sample_segments())), FakeKnowledge::default());
        assert!(matches!(session.ask("hi").await, Err(TubechatError::NoVideoLoaded)));
        assert_eq!(session.locate("hello"), MatchResult::none());
    }

    #[tokio::test]
    async fn test_chat_failure_is_reported() {
        let knowledge = FakeKnowledge {
            fail_chat: true,
            ..Default::default()
        };
        let mut session = session(StaticSource(Ok(sample_segments())), knowledge);
        session.open_video(URL).await.unwrap();

        let err = session.ask("friend").await.unwrap_err();
        assert!(matches!(err, TubechatError::Chat(_)));

        // The session survives and can still locate timestamps.
        assert_eq!(session.locate("friend").score, 1);
    }

    #[tokio::test]
    async fn test_close_removes_storage() {
        let session = session(StaticSource(Ok(Vec::new())), FakeKnowledge::default());
        let path = session.storage_path().to_path_buf();
        assert!(path.exists());
        session.close().unwrap();
        assert!(!path.exists());
    }
}
