//! Doctor command - verify credentials and configuration.

use crate::cli::preflight::{self, API_KEY_VAR};
use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("tubechat doctor");
    println!();

    let checks = vec![
        check_api_key(),
        check_temp_dir(settings),
        check_config_file(),
        check_settings(settings),
    ];

    for check in &checks {
        check.print();
    }
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Chat is unavailable until they are fixed.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s) found.", warnings));
    } else {
        Output::success("All checks passed.");
    }

    Ok(())
}

fn check_api_key() -> CheckResult {
    match preflight::require_api_key() {
        Ok(key) => {
            let masked = if key.len() > 8 && key.is_ascii() {
                format!("{}...{}", &key[..4], &key[key.len() - 4..])
            } else {
                "****".to_string()
            };
            CheckResult::ok("OpenAI API key", &format!("set ({})", masked))
        }
        Err(e) => CheckResult::error(
            "OpenAI API key",
            &e.to_string(),
            &format!("export {}='sk-...' or add it to a .env file", API_KEY_VAR),
        ),
    }
}

fn check_temp_dir(settings: &Settings) -> CheckResult {
    let dir = settings.temp_dir();
    let probe = std::fs::create_dir_all(&dir).and_then(|_| tempfile::tempdir_in(&dir));

    match probe {
        Ok(_) => CheckResult::ok("Session storage", &format!("{} is writable", dir.display())),
        Err(e) => CheckResult::error(
            "Session storage",
            &format!("{} is not writable: {}", dir.display(), e),
            "Set general.temp_dir to a writable directory",
        ),
    }
}

fn check_config_file() -> CheckResult {
    let path = Settings::default_config_path();
    if path.exists() {
        CheckResult::ok("Config file", &path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "not found, using defaults",
            "Run 'tubechat config edit' to create one",
        )
    }
}

fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Settings",
            &format!(
                "model {}, captions in {}",
                settings.llm.model,
                settings.youtube.languages.join(", ")
            ),
        ),
        Err(e) => CheckResult::error("Settings", &e.to_string(), "Fix the value in the config file"),
    }
}
