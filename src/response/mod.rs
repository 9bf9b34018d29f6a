//! Turning the agent's final text into a validated research record.
//!
//! The model is asked to answer with bare JSON, but frequently wraps it in a
//! fenced code block. [`normalize`] strips that wrapping, and [`parse`] decodes
//! the result all-or-nothing into a [`ResearchResponse`].

mod normalize;
mod parser;

pub use normalize::normalize;
pub use parser::{parse, SchemaValidationError};

use crate::agent::RawModelOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured answer to a research question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchResponse {
    /// The topic of the research.
    pub topic: String,
    /// A concise summary answering the question.
    pub summary: String,
    /// Sources consulted (URLs, article titles, etc.).
    pub sources: Vec<String>,
    /// Names of the tools used while researching.
    pub tools_used: Vec<String>,
}

/// A research response that could not be decoded.
///
/// Always keeps the untouched agent output so frontends can show it for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct ParseError {
    /// Why decoding failed.
    pub message: String,
    /// The text that was handed to the parser, after normalization.
    pub normalized_text: String,
    /// The agent output before normalization.
    pub raw_output: RawModelOutput,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Normalize and parse the agent's final output.
pub fn process_response(raw: RawModelOutput) -> std::result::Result<ResearchResponse, ParseError> {
    let normalized = normalize(&raw.output);
    parse(&normalized).map_err(|e| ParseError {
        message: e.message,
        normalized_text: e.normalized_text,
        raw_output: raw,
    })
}
