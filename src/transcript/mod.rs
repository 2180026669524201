//! Transcript retrieval for tubechat.
//!
//! Fetches the time-coded captions of a video and exposes them both as flattened text
//! (for ingestion) and as ordered segments (for timestamp search). Fetch failures never
//! escape this module: they degrade into a bundle carrying the [`NO_TRANSCRIPT`] sentinel.

mod format;
mod youtube;

pub use format::{format_bundle, BundleExport, OutputFormat};
pub use youtube::YoutubeTranscriptSource;

use crate::error::Result;
use crate::resolver::VideoId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Placeholder text used when a video has no usable transcript.
pub const NO_TRANSCRIPT: &str = "No transcript available for this video.";

/// Title reported for every video; metadata lookup is not performed.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// One timestamped chunk of spoken text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Everything retrieved for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptBundle {
    pub title: String,
    /// Space-joined segment texts, or [`NO_TRANSCRIPT`] when there are no segments.
    pub flat_text: String,
    /// Segments in playback order.
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptBundle {
    /// Build a bundle from segments, keeping their order.
    pub fn from_segments(segments: Vec<TranscriptSegment>) -> Self {
        let flat_text = if segments.is_empty() {
            NO_TRANSCRIPT.to_string()
        } else {
            segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };

        Self {
            title: UNKNOWN_TITLE.to_string(),
            flat_text,
            segments,
        }
    }

    /// The bundle returned when captions could not be fetched.
    pub fn unavailable() -> Self {
        Self::from_segments(Vec::new())
    }

    /// Whether there is real transcript text to ingest.
    pub fn has_transcript(&self) -> bool {
        self.flat_text != NO_TRANSCRIPT
    }

    /// Total covered duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end()).unwrap_or(0.0)
    }
}

/// Result of a transcript fetch. Both variants carry a usable bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    Fetched(TranscriptBundle),
    /// The source failed; `bundle` is the degraded placeholder and `reason` the warning
    /// to show the user.
    Unavailable {
        bundle: TranscriptBundle,
        reason: String,
    },
}

impl TranscriptOutcome {
    pub fn bundle(&self) -> &TranscriptBundle {
        match self {
            TranscriptOutcome::Fetched(bundle) => bundle,
            TranscriptOutcome::Unavailable { bundle, .. } => bundle,
        }
    }

    pub fn into_bundle(self) -> TranscriptBundle {
        match self {
            TranscriptOutcome::Fetched(bundle) => bundle,
            TranscriptOutcome::Unavailable { bundle, .. } => bundle,
        }
    }

    /// Warning for the user when the fetch failed.
    pub fn warning(&self) -> Option<String> {
        match self {
            TranscriptOutcome::Fetched(_) => None,
            TranscriptOutcome::Unavailable { reason, .. } => {
                Some(format!("Error fetching transcript: {}", reason))
            }
        }
    }
}

/// A provider of time-coded captions.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the caption entries of a video, in source order.
    async fn fetch(&self, id: &VideoId) -> Result<Vec<TranscriptSegment>>;
}

/// Fetch the transcript of a video, degrading any failure into a placeholder bundle.
#[instrument(skip(source), fields(video_id = %id))]
pub async fn fetch_segments(source: &dyn TranscriptSource, id: &VideoId) -> TranscriptOutcome {
    match source.fetch(id).await {
        Ok(segments) => {
            info!("Fetched {} transcript segments", segments.len());
            TranscriptOutcome::Fetched(TranscriptBundle::from_segments(segments))
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch transcript");
            TranscriptOutcome::Unavailable {
                bundle: TranscriptBundle::unavailable(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::TubechatError;

    /// Transcript source serving a fixed answer.
    pub(crate) struct StaticSource(pub std::result::Result<Vec<TranscriptSegment>, String>);

    #[async_trait]
    impl TranscriptSource for StaticSource {
        async fn fetch(&self, _id: &VideoId) -> Result<Vec<TranscriptSegment>> {
            self.0
                .clone()
                .map_err(TubechatError::TranscriptUnavailable)
        }
    }

    pub(crate) fn sample_segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new("hello world", 0.0, 5.0),
            TranscriptSegment::new("hello there friend", 5.0, 3.5),
        ]
    }

    #[tokio::test]
    async fn test_fetch_success_keeps_order() {
        let source = StaticSource(Ok(sample_segments()));
        let outcome = fetch_segments(&source, &VideoId::new("abc")).await;

        assert!(outcome.warning().is_none());
        let bundle = outcome.into_bundle();
        assert_eq!(bundle.title, "Unknown");
        assert_eq!(bundle.flat_text, "hello world hello there friend");
        assert_eq!(bundle.segments, sample_segments());
        assert!(bundle.has_transcript());
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades() {
        let source = StaticSource(Err("Subtitles are disabled for this video".to_string()));
        let outcome = fetch_segments(&source, &VideoId::new("abc")).await;

        let warning = outcome.warning().unwrap();
        assert!(warning.contains("Subtitles are disabled"));

        let bundle = outcome.bundle();
        assert!(bundle.segments.is_empty());
        assert_eq!(bundle.flat_text, NO_TRANSCRIPT);
        assert_eq!(bundle.title, UNKNOWN_TITLE);
        assert!(!bundle.has_transcript());
    }

    #[tokio::test]
    async fn test_empty_transcript_uses_sentinel() {
        let source = StaticSource(Ok(Vec::new()));
        let outcome = fetch_segments(&source, &VideoId::new("abc")).await;

        assert!(matches!(outcome, TranscriptOutcome::Fetched(_)));
        assert_eq!(outcome.bundle().flat_text, NO_TRANSCRIPT);
    }

    #[test]
    fn test_flat_text_preserves_word_count() {
        let segments = vec![
            TranscriptSegment::new("one two", 0.0, 1.0),
            TranscriptSegment::new("three", 1.0, 1.0),
            TranscriptSegment::new("four five six", 2.0, 1.0),
        ];
        let words: usize = segments.iter().map(|s| s.text.split_whitespace().count()).sum();
        let bundle = TranscriptBundle::from_segments(segments);

        assert_eq!(bundle.flat_text.split_whitespace().count(), words);
        assert_eq!(bundle.duration_seconds(), 3.0);
    }
}
