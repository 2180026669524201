//! Keyword relevance matching between a question and transcript segments.
//!
//! Deliberately naive: each whitespace-separated query token that occurs anywhere inside a
//! segment's text (substring, not whole word) adds one point. This gives a timestamp signal
//! that does not depend on the answer generated by the language model.

use crate::resolver::{deep_link, VideoId};
use crate::transcript::TranscriptSegment;
use serde::Serialize;

/// Best-scoring segment for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// `None` when no segment matched any token.
    pub segment: Option<TranscriptSegment>,
    pub score: usize,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            segment: None,
            score: 0,
        }
    }

    /// Deep link to the matched segment, if any.
    pub fn timestamp_link(&self, id: &VideoId) -> Option<TimestampLink> {
        self.segment
            .as_ref()
            .map(|segment| TimestampLink::new(id, segment.start))
    }
}

/// A link that starts playback at a whole second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampLink {
    pub seconds: u64,
    pub url: String,
}

impl TimestampLink {
    pub fn new(id: &VideoId, start: f64) -> Self {
        Self {
            seconds: start.trunc() as u64,
            url: deep_link(id, start),
        }
    }
}

/// Find the segment sharing the most query tokens.
///
/// Ties keep the earliest segment.
pub fn best_match(query: &str, segments: &[TranscriptSegment]) -> MatchResult {
    let query = query.to_lowercase();
    let tokens: Vec<&str> = query.split_whitespace().collect();

    let mut best: Option<&TranscriptSegment> = None;
    let mut best_score = 0;

    for segment in segments {
        let score = score_segment(&tokens, segment);
        if score > best_score {
            best_score = score;
            best = Some(segment);
        }
    }

    match best {
        Some(segment) => MatchResult {
            segment: Some(segment.clone()),
            score: best_score,
        },
        None => MatchResult::none(),
    }
}

fn score_segment(tokens: &[&str], segment: &TranscriptSegment) -> usize {
    let text = segment.text.to_lowercase();
    tokens.iter().filter(|token| text.contains(**token)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new("hello world", 0.0, 5.0),
            TranscriptSegment::new("hello there friend", 5.0, 4.0),
        ]
    }

    #[test]
    fn test_empty_query_or_segments() {
        assert_eq!(best_match("", &segments()), MatchResult::none());
        assert_eq!(best_match("   ", &segments()), MatchResult::none());
        assert_eq!(best_match("hello", &[]), MatchResult::none());
    }

    #[test]
    fn test_ties_keep_earliest_segment() {
        let result = best_match("hello hello", &segments());
        assert_eq!(result.score, 2);
        assert_eq!(result.segment.unwrap().start, 0.0);
    }

    #[test]
    fn test_single_token_match_and_link() {
        let result = best_match("friend", &segments());
        assert_eq!(result.score, 1);

        let link = result.timestamp_link(&VideoId::new("abc")).unwrap();
        assert_eq!(link.seconds, 5);
        assert!(link.url.ends_with("&t=5s"));
    }

    #[test]
    fn test_case_insensitive_substring_scoring() {
        let segs = vec![
            TranscriptSegment::new("Let's get started", 12.7, 2.0),
            TranscriptSegment::new("Modern Art history", 30.0, 2.0),
        ];

        // "art" is found inside "started" too, so the earlier segment wins the tie.
        let result = best_match("ART", &segs);
        assert_eq!(result.score, 1);
        assert_eq!(result.segment.as_ref().unwrap().start, 12.7);
        assert_eq!(result.timestamp_link(&VideoId::new("v")).unwrap().seconds, 12);

        let result = best_match("art history", &segs);
        assert_eq!(result.score, 2);
        assert_eq!(result.segment.unwrap().start, 30.0);
    }

    #[test]
    fn test_no_match_has_no_link() {
        let result = best_match("quantum", &segments());
        assert_eq!(result, MatchResult::none());
        assert!(result.timestamp_link(&VideoId::new("abc")).is_none());
    }

    #[test]
    fn test_best_match_is_pure() {
        let segs = segments();
        assert_eq!(best_match("there world", &segs), best_match("there world", &segs));
    }
}
