//! YouTube caption source backed by `yt-transcript-rs`.

use super::{TranscriptSegment, TranscriptSource};
use crate::config::YoutubeSettings;
use crate::error::{Result, TubechatError};
use crate::resolver::VideoId;
use async_trait::async_trait;
use tracing::{debug, instrument};
use yt_transcript_rs::YouTubeTranscriptApi;

/// Fetches captions straight from YouTube.
pub struct YoutubeTranscriptSource {
    languages: Vec<String>,
    preserve_formatting: bool,
}

impl YoutubeTranscriptSource {
    /// Create a source asking for English captions.
    pub fn new() -> Self {
        Self::with_config(&YoutubeSettings::default())
    }

    pub fn with_config(settings: &YoutubeSettings) -> Self {
        Self {
            languages: settings.languages.clone(),
            preserve_formatting: settings.preserve_formatting,
        }
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self), fields(video_id = %id))]
    async fn fetch(&self, id: &VideoId) -> Result<Vec<TranscriptSegment>> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| TubechatError::TranscriptUnavailable(e.to_string()))?;

        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();
        debug!("Requesting captions in {:?}", languages);

        let fetched = api
            .fetch_transcript(id.as_str(), &languages, self.preserve_formatting)
            .await
            .map_err(|e| TubechatError::TranscriptUnavailable(e.to_string()))?;

        Ok(fetched
            .parts()
            .iter()
            .map(|p| TranscriptSegment::new(p.text.clone(), p.start, p.duration))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_languages() {
        let source = YoutubeTranscriptSource::new();
        assert_eq!(source.languages, vec!["en".to_string()]);
        assert!(!source.preserve_formatting);
    }
}
