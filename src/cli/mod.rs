//! CLI module for tubechat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_clock, Output};

use clap::{Parser, Subcommand};

/// tubechat - chat with a YouTube video
///
/// Paste a video link, ask questions about it, and get a link to the most relevant moment.
#[derive(Parser, Debug)]
#[command(name = "tubechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat about a video
    Chat {
        /// YouTube watch or shorts URL
        url: String,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube watch or shorts URL
        url: String,

        /// The question to ask
        question: String,
    },

    /// Print the transcript of a video
    Transcript {
        /// YouTube watch or shorts URL
        url: String,

        /// Output format (json, srt, vtt, text)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Find the moment of a video that best matches some keywords
    Locate {
        /// YouTube watch or shorts URL
        url: String,

        /// Keywords to look for
        query: String,
    },

    /// Check configuration and credentials
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from([
            "tubechat",
            "-vv",
            "ask",
            "https://www.youtube.com/watch?v=abc",
            "what is this about?",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { url, question } => {
                assert_eq!(url, "https://www.youtube.com/watch?v=abc");
                assert_eq!(question, "what is this about?");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_transcript_defaults_to_text() {
        let cli = Cli::parse_from(["tubechat", "transcript", "https://youtube.com/shorts/x"]);
        match cli.command {
            Commands::Transcript { format, output, .. } => {
                assert_eq!(format, "text");
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
