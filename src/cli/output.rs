//! CLI output formatting utilities.

use crate::response::{ParseError, ResearchResponse};
use crate::SleuthError;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a structured research result.
    pub fn research_result(response: &ResearchResponse) {
        Output::header(&response.topic);
        println!("\n{}", response.summary);

        Output::header("Sources");
        if response.sources.is_empty() {
            println!("  {}", style("No specific sources provided").dim());
        } else {
            for (i, source) in response.sources.iter().enumerate() {
                println!("  {}. {}", i + 1, source);
            }
        }

        Output::header("Tools used");
        if response.tools_used.is_empty() {
            println!("  {}", style("No specific tools mentioned").dim());
        } else {
            println!("  {}", response.tools_used.join(", "));
        }
        println!();
    }

    /// Print a failed research attempt, with the raw output when parsing failed.
    pub fn research_error(err: &SleuthError) {
        match err.parse_error() {
            Some(parse_error) => Output::parse_failure(parse_error),
            None => Output::error(&format!("Research failed: {}", err)),
        }
        if err.is_retryable() {
            Output::info("Please try again, possibly with a rephrased question.");
        }
    }

    fn parse_failure(err: &ParseError) {
        Output::error(&format!("Could not parse the research response: {}", err.message));
        Output::header("Raw response (for debugging)");
        println!("{}", style(&err.raw_output.output).dim());
        for step in &err.raw_output.intermediate_steps {
            Output::kv("tool call", &step.to_string());
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate text with an ellipsis, on a character boundary.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let text = text.replace('\n', " ");
    if text.chars().count() <= max_chars {
        text
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("line one\nline two", 100), "line one line two");
        assert_eq!(preview("abcdefghij", 6), "abc...");
        assert_eq!(preview("ééééééé", 5), "éé...");
    }
}
