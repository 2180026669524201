//! Ask command implementation.

use super::chat::{ask_question, open_video, start_session};
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command: one video, one question, then tear the session down.
pub async fn run_ask(url: &str, question: &str, settings: Settings) -> Result<()> {
    let mut session = start_session(&settings)?;

    if !open_video(&mut session, url).await {
        session.close()?;
        anyhow::bail!("Could not open video: {}", url);
    }

    let answered = ask_question(&mut session, question).await;
    session.close()?;

    if !answered {
        anyhow::bail!("No answer for: {}", question);
    }
    Ok(())
}
