//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::resolver::resolve;
use crate::session::{IngestStatus, Session};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(url: &str, settings: Settings) -> Result<()> {
    let mut session = start_session(&settings)?;

    open_video(&mut session, url).await;

    println!("\n{}", style("tubechat").bold().cyan());
    println!(
        "{}\n",
        style("Ask anything about the video. 'load <url>' switches video, 'clear' resets the conversation, 'exit' quits.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match parse_repl_command(&input) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ReplCommand::Clear => {
                session.clear_history();
                Output::info("Conversation history cleared.");
            }
            ReplCommand::Load(new_url) => {
                open_video(&mut session, new_url).await;
            }
            ReplCommand::Ask(question) => {
                ask_question(&mut session, question).await;
            }
        }
    }

    session.close()?;
    Ok(())
}

/// One line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReplCommand<'a> {
    Empty,
    Exit,
    Clear,
    Load(&'a str),
    Ask(&'a str),
}

/// Classify a prompt line. `load` only switches video when followed by a recognized
/// video URL; anything else starting with "load " is a question.
pub(crate) fn parse_repl_command(line: &str) -> ReplCommand<'_> {
    let line = line.trim();

    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ReplCommand::Exit;
    }
    if line.eq_ignore_ascii_case("clear") {
        return ReplCommand::Clear;
    }
    if let Some(rest) = line.strip_prefix("load ") {
        let url = rest.trim();
        if resolve(url).is_ok() {
            return ReplCommand::Load(url);
        }
    }

    ReplCommand::Ask(line)
}

/// Start a session, telling the user how to fix a missing credential.
pub(crate) fn start_session(settings: &Settings) -> Result<Session> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tubechat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Ok(Session::start(settings)?)
}

/// Load a video into the session and report the outcome. Returns whether a video is now loaded.
pub(crate) async fn open_video(session: &mut Session, url: &str) -> bool {
    let spinner = Output::spinner("Fetching transcript...");
    let result = session.open_video(url).await;
    spinner.finish_and_clear();

    let load = match result {
        Ok(load) => load,
        Err(e) => {
            Output::error(&format!("Error adding video: {}", e));
            return false;
        }
    };

    if let Some(warning) = &load.warning {
        Output::warning(warning);
    }

    match &load.ingest {
        IngestStatus::Added { chunks } => Output::success(&format!(
            "Added video '{}' to knowledge base! ({} segments, {} chunks)",
            load.title, load.segment_count, chunks
        )),
        IngestStatus::Skipped => Output::warning(&format!(
            "No transcript available for video '{}'. Cannot add to knowledge base.",
            load.title
        )),
        IngestStatus::Failed(e) => Output::error(&format!("Error adding video: {}", e)),
    }

    true
}

/// Ask one question and print the answer with its timestamp link. Returns whether an
/// answer was given; failures are reported here.
pub(crate) async fn ask_question(session: &mut Session, question: &str) -> bool {
    let spinner = Output::spinner("Thinking...");
    let result = session.ask(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("\n{} {}\n", style("tubechat:").cyan().bold(), answer.text);
            if let Some(link) = &answer.timestamp {
                Output::timestamp(link);
                println!();
            }
            true
        }
        Err(e) => {
            Output::error(&format!("Error chatting with the video: {}", e));
            false
        }
    }
}
