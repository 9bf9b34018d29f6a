//! Doctor command - verify configuration and tool backends.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use url::Url;

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
    Output::header("Sleuth Doctor");
    println!();
    println!("Checking configuration and research tools...\n");

    let mut checks = Vec::new();

    println!("{}", style("Model").bold());
    let model_checks = vec![
        check_api_key(&settings.model.api_key_env, std::env::var(&settings.model.api_key_env).ok()),
        check_model(settings),
    ];
    print_all(&model_checks);
    checks.extend(model_checks);

    println!();

    println!("{}", style("Research Tools").bold());
    let tool_checks = vec![
        check_endpoint("Web search", &settings.tools.search_url),
        check_endpoint("Wikipedia", &settings.tools.wikipedia_url),
        check_notes(settings),
    ];
    print_all(&tool_checks);
    checks.extend(tool_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Sleuth.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Sleuth is ready to use.");
    }

    Ok(())
}

fn print_all(checks: &[CheckResult]) {
    for check in checks {
        check.print();
    }
}

/// Check that the model API key variable is set.
fn check_api_key(var: &str, value: Option<String>) -> CheckResult {
    let hint = format!("Set with: export {}='sk-...'", var);
    match value {
        Some(key) if key.trim().is_empty() => CheckResult::error(var, "empty", &hint),
        Some(key) if key.chars().count() > 12 => {
            let chars: Vec<char> = key.chars().collect();
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            CheckResult::ok(var, &format!("configured ({}...{})", head, tail))
        }
        Some(_) => CheckResult::warning(var, "set but looks too short", &hint),
        None => CheckResult::error(var, "not set", &hint),
    }
}

fn check_model(settings: &Settings) -> CheckResult {
    let model = &settings.model;
    let backend = model.api_base.as_deref().unwrap_or("OpenAI");
    if model.max_iterations == 0 {
        return CheckResult::error(
            "Model",
            &format!("{} via {} with max_iterations = 0", model.name, backend),
            "Set model.max_iterations to at least 1",
        );
    }
    CheckResult::ok(
        "Model",
        &format!(
            "{} via {} (up to {} tool rounds)",
            model.name, backend, model.max_iterations
        ),
    )
}

/// Check that a tool backend URL is usable.
fn check_endpoint(name: &str, raw: &str) -> CheckResult {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "https" => CheckResult::ok(name, raw),
        Ok(url) if url.scheme() == "http" => CheckResult::warning(
            name,
            raw,
            "Plain HTTP endpoint; queries are sent unencrypted",
        ),
        Ok(url) => CheckResult::error(
            name,
            &format!("unsupported scheme '{}'", url.scheme()),
            "Use an http(s) URL",
        ),
        Err(e) => CheckResult::error(
            name,
            &format!("invalid URL: {}", e),
            "The tool will run in fallback mode. Fix the URL in the [tools] section",
        ),
    }
}

fn check_notes(settings: &Settings) -> CheckResult {
    if !settings.notes.write_to_disk {
        return CheckResult::ok("Notes", "formatted only (write_to_disk = false)");
    }
    let dir = settings.notes_dir();
    if dir.exists() {
        CheckResult::ok("Notes", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Notes",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first save",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: sleuth init (or sleuth config edit)",
        )
    }
}
