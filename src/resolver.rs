//! YouTube URL resolution.
//!
//! Turns a pasted video URL into a [`VideoId`] and builds deep links back into the video.

use crate::error::{Result, TubechatError};
use serde::{Deserialize, Serialize};

/// Marker of a standard watch URL carrying the video in its `v` parameter.
const WATCH_MARKER: &str = "youtube.com/watch?v=";

/// Marker of a shorts URL carrying the video as a path segment.
const SHORTS_MARKER: &str = "youtube.com/shorts/";

/// Base of every link this crate hands back to the user.
const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";

/// Opaque identifier of a video, as understood by the transcript source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_BASE, self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video identifier from a YouTube URL.
///
/// Watch URLs are checked before shorts URLs. The input is taken as-is: no trimming,
/// case folding or protocol rewriting happens here.
pub fn resolve(url: &str) -> Result<VideoId> {
    if let Some(rest) = after_marker(url, WATCH_MARKER) {
        return Ok(VideoId::new(until(rest, '&')));
    }

    if let Some(rest) = after_marker(url, SHORTS_MARKER) {
        return Ok(VideoId::new(until(rest, '?')));
    }

    Err(TubechatError::InvalidUrlKind(url.to_string()))
}

/// Build a link that starts playback at `start_seconds`, truncated to whole seconds.
pub fn deep_link(id: &VideoId, start_seconds: f64) -> String {
    format!("{}&t={}s", id.watch_url(), start_seconds.trunc() as u64)
}

fn after_marker<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    url.find(marker).map(|pos| &url[pos + marker.len()..])
}

fn until(s: &str, separator: char) -> &str {
    s.split(separator).next().unwrap_or(s)
}
