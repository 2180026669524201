//! Locate command: keyword timestamp search without the language model.

use super::transcript::load_transcript;
use crate::cli::{format_clock, Output};
use crate::config::Settings;
use crate::matcher::best_match;
use anyhow::Result;

/// Run the locate command.
pub async fn run_locate(url: &str, query: &str, settings: Settings) -> Result<()> {
    let (video_id, bundle) = load_transcript(url, &settings).await?;
    let result = best_match(query, &bundle.segments);

    match (&result.segment, result.timestamp_link(&video_id)) {
        (Some(segment), Some(link)) => {
            Output::header("Best match");
            Output::kv("At", &format_clock(segment.start));
            Output::kv("Score", &result.score.to_string());
            Output::kv("Text", &segment.text);
            Output::timestamp(&link);
        }
        _ => Output::info(&format!("No segment of {} matches '{}'.", video_id, query)),
    }

    Ok(())
}
