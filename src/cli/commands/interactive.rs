//! Interactive research prompt.
//!
//! Every question is researched independently; the session only remembers the
//! most recent questions so they can be listed again.

use super::prepare_researcher;
use crate::cli::output::preview;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Bounded list of recent queries, newest last.
#[derive(Debug)]
struct QueryHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl QueryHistory {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, query: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(query.to_string());
    }

    /// Queries newest first.
    fn recent(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().rev()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run the interactive research loop.
pub async fn run_interactive(model: Option<String>, settings: Settings) -> Result<()> {
    let mut history = QueryHistory::new(settings.general.history_size);
    let researcher = prepare_researcher(model, settings).await?;

    println!("\n{}", style("Sleuth Research Assistant").bold().cyan());
    println!(
        "{}",
        style(format!("Tools: {}", researcher.tool_names().join(", "))).dim()
    );
    println!(
        "{}\n",
        style("Type a question, 'history' for recent searches, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("?").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("history") {
            print_history(&history);
            continue;
        }

        history.push(input);

        let spinner = Output::spinner("Researching...");
        let outcome = researcher.research(input).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(response) => Output::research_result(&response),
            Err(e) => Output::research_error(&e),
        }
    }

    Ok(())
}

fn print_history(history: &QueryHistory) {
    if history.is_empty() {
        Output::info("No searches yet.");
        return;
    }
    Output::header("Recent searches");
    for query in history.recent() {
        Output::list_item(&preview(query, 80));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_most_recent() {
        let mut history = QueryHistory::new(2);
        history.push("first");
        history.push("second");
        history.push("third");
        let entries: Vec<&String> = history.recent().collect();
        assert_eq!(entries, vec!["third", "second"]);
    }

    #[test]
    fn test_history_recent_is_newest_first() {
        let mut history = QueryHistory::new(5);
        for query in ["a", "b", "c"] {
            history.push(query);
        }
        let recent: Vec<&String> = history.recent().collect();
        assert_eq!(recent, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_history_zero_capacity() {
        let mut history = QueryHistory::new(0);
        history.push("ignored");
        assert!(history.is_empty());
    }
}
