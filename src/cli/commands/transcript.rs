//! Transcript command: fetch captions without touching the knowledge base.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::resolver::{resolve, VideoId};
use crate::transcript::{
    fetch_segments, format_bundle, OutputFormat, TranscriptBundle, YoutubeTranscriptSource,
};
use anyhow::Result;

/// Resolve `url` and fetch its transcript, printing the transcript warning if any.
pub(crate) async fn load_transcript(url: &str, settings: &Settings) -> Result<(VideoId, TranscriptBundle)> {
    preflight::check(Operation::Transcript)?;

    let video_id = resolve(url)?;
    let source = YoutubeTranscriptSource::with_config(&settings.youtube);

    let spinner = Output::spinner("Fetching transcript...");
    let outcome = fetch_segments(&source, &video_id).await;
    spinner.finish_and_clear();

    if let Some(warning) = outcome.warning() {
        Output::warning(&warning);
    }

    Ok((video_id, outcome.into_bundle()))
}

/// Run the transcript command.
pub async fn run_transcript(
    url: &str,
    format: &str,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let (video_id, bundle) = load_transcript(url, &settings).await?;

    let rendered = format_bundle(&video_id, &bundle, format);

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            Output::success(&format!(
                "Wrote {} segments of {} to {}",
                bundle.segments.len(),
                video_id,
                path
            ));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
