//! Sleuth - a tool-using research assistant
//!
//! Sleuth takes a free-text question, lets a language model research it with
//! web search, Wikipedia lookups and note taking, and returns a structured
//! answer: topic, summary, sources and the tools that were used.
//!
//! # Architecture
//!
//! - `tools` - the tools the model can call, behind a uniform `Tool` trait
//! - `agent` - prompt contract, chat model abstraction and the reasoning loop
//! - `response` - fence stripping and strict decoding of the final answer
//! - `research` - the `research(query)` entry point shared by all frontends
//! - `config` - settings and prompt templates
//! - `cli` - command-line, interactive and HTTP frontends
//!
//! # Example
//!
//! ```rust,no_run
//! use sleuth::config::Settings;
//! use sleuth::research::Researcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let researcher = Researcher::new(&settings)?;
//!
//!     let answer = researcher.research("How do hummingbirds hover?").await?;
//!     println!("{}\n\nSources: {}", answer.summary, answer.sources.join(", "));
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod research;
pub mod response;
pub mod tools;

#[cfg(test)]
mod testing;

pub use error::{Result, SleuthError};
pub use research::Researcher;
pub use response::ResearchResponse;
