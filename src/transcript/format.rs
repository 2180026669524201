//! Transcript output formatting (JSON, SRT, VTT, plain text).

use super::TranscriptBundle;
use crate::resolver::VideoId;
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Srt,
    Vtt,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err(format!("Unknown format: {}. Use json, srt, vtt, or text.", s)),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct BundleExport<'a> {
    pub video_id: &'a str,
    pub title: &'a str,
    pub url: String,
    pub duration_seconds: f64,
    pub segments: &'a [super::TranscriptSegment],
}

/// Format a transcript bundle for output.
pub fn format_bundle(id: &VideoId, bundle: &TranscriptBundle, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(id, bundle),
        OutputFormat::Srt => format_cues(bundle, false),
        OutputFormat::Vtt => format!("WEBVTT\n\n{}", format_cues(bundle, true)),
        OutputFormat::Text => bundle.flat_text.clone(),
    }
}

fn format_json(id: &VideoId, bundle: &TranscriptBundle) -> String {
    let export = BundleExport {
        video_id: id.as_str(),
        title: &bundle.title,
        url: id.watch_url(),
        duration_seconds: bundle.duration_seconds(),
        segments: &bundle.segments,
    };
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Numbered cues; SRT and WebVTT only differ in the millisecond separator.
fn format_cues(bundle: &TranscriptBundle, vtt: bool) -> String {
    let mut output = String::new();

    for (i, segment) in bundle.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_cue_timestamp(segment.start, vtt),
            format_cue_timestamp(segment.end(), vtt)
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

fn format_cue_timestamp(seconds: f64, vtt: bool) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    let sep = if vtt { '.' } else { ',' };

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, sep, ms)
}
