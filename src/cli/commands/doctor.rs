//! Doctor command - verify configuration and API keys.

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
    Output::header("orgsearch doctor");
    println!();

    println!("{}", style("Chat completion").bold());
    let mut checks = check_chat(settings);
    checks.iter().for_each(CheckResult::print);
    println!();

    println!("{}", style("Vector index").bold());
    let index_checks = check_index(settings);
    index_checks.iter().for_each(CheckResult::print);
    checks.extend(index_checks);
    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(&Settings::default_config_path());
    config_check.print();
    checks.push(config_check);
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before serving searches.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s). orgsearch should still work.", warnings));
    } else {
        Output::success("All checks passed.");
    }

    Ok(())
}

fn has_value(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn check_chat(settings: &Settings) -> Vec<CheckResult> {
    let key = if has_value(settings.chat.api_key.as_deref()) {
        CheckResult::ok("API key", "GROQ_API_KEY is set")
    } else {
        CheckResult::error(
            "API key",
            "GROQ_API_KEY is not set",
            "export GROQ_API_KEY='gsk_...'",
        )
    };

    vec![
        key,
        CheckResult::ok(
            "Model",
            &format!("{} via {}", settings.chat.model, settings.chat.api_base),
        ),
    ]
}

fn check_index(settings: &Settings) -> Vec<CheckResult> {
    let index = &settings.index;

    let key = if has_value(index.api_key.as_deref()) {
        CheckResult::ok("API key", "PINECONE_API_KEY is set")
    } else {
        CheckResult::error(
            "API key",
            "PINECONE_API_KEY is not set",
            "export PINECONE_API_KEY='pcsk_...'",
        )
    };

    let location = match (index.host.as_deref(), index.name.as_deref()) {
        (Some(host), _) => CheckResult::ok("Host", host),
        (None, Some(name)) => CheckResult::warning(
            "Host",
            &format!("will be resolved from index '{}' at startup", name),
            "set PINECONE_HOST to skip the lookup",
        ),
        (None, None) => CheckResult::error(
            "Host",
            "no index host or name configured",
            "export PINECONE_HOST='<index>-<project>.svc.pinecone.io'",
        ),
    };

    vec![
        key,
        location,
        CheckResult::ok(
            "Query",
            &format!("namespace {}, top {}", index.namespace, index.top_k),
        ),
    ]
}

fn check_config_file(path: &std::path::Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Config file", &path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "not found, using defaults",
            "run `orgsearch config edit` to create one",
        )
    }
}
