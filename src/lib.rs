//! tubechat - chat with a YouTube video
//!
//! Paste a video link, ask questions about it, and get pointed at the most relevant moment.
//!
//! # Overview
//!
//! - Resolve watch and shorts URLs into a video identifier
//! - Fetch the time-coded transcript, degrading gracefully when captions are missing
//! - Ingest the transcript into a per-session knowledge base and answer questions
//! - Find the best-matching transcript segment and build a deep link to it
//!
//! # Architecture
//!
//! - `resolver` - URL to video identifier, deep links
//! - `transcript` - caption retrieval and export
//! - `matcher` - keyword relevance matching over segments
//! - `knowledge` - chunking, embeddings, chunk store and answer generation
//! - `session` - per-user session context tying the above together
//! - `config` - settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use tubechat::config::Settings;
//! use tubechat::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut session = Session::start(&settings)?;
//!
//!     session.open_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     let answer = session.ask("What is this song about?").await?;
//!     println!("{}", answer.text);
//!     if let Some(link) = answer.timestamp {
//!         println!("Relevant timestamp: {}", link.url);
//!     }
//!
//!     session.close()?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod matcher;
pub mod openai;
pub mod resolver;
pub mod session;
pub mod transcript;

pub use error::{Result, TubechatError};
