//! CLI module for Sleuth.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Sleuth - a tool-using research assistant
///
/// Ask a question; an AI agent researches it with web search, Wikipedia and
/// note taking, and answers with a summary and its sources.
#[derive(Parser, Debug)]
#[command(name = "sleuth")]
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
    /// Create a default configuration file
    Init,

    /// Check configuration and tool backends
    Doctor,

    /// Research a single question
    Ask {
        /// The research question
        query: String,

        /// Print the structured result as JSON
        #[arg(long)]
        json: bool,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Research questions interactively, one after another
    Interactive {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an HTTP server exposing the research endpoint
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

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
        let cli = Cli::parse_from(["sleuth", "-vv", "ask", "What is Rust?", "--json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { query, json, model } => {
                assert_eq!(query, "What is Rust?");
                assert!(json);
                assert!(model.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["sleuth", "serve"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 3000);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
