//! Web search via the DuckDuckGo Instant Answer API.

use super::{extract_argument, HttpBackend, Tool, ToolError};
use crate::config::ToolSettings;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

const DESCRIPTION: &str = "Search the web for information. Input should be a search query.";
const FALLBACK_DESCRIPTION: &str = "Search the web for information (fallback mode).";
/// DuckDuckGo answers throttled requests with 202 and an empty body.
const RATE_LIMITED: &[StatusCode] = &[StatusCode::ACCEPTED];

/// Web search tool backed by DuckDuckGo.
pub struct WebSearchTool {
    backend: Option<HttpBackend>,
    max_results: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "Answer")]
    answer: serde_json::Value,
    #[serde(rename = "Definition")]
    definition: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
    /// Grouped topics (disambiguation categories) nest further topics.
    #[serde(rename = "Topics")]
    topics: Vec<RelatedTopic>,
}

impl WebSearchTool {
    /// Create the search tool. Falls back to placeholder mode if the HTTP
    /// client or the endpoint URL cannot be set up.
    pub fn new(settings: &ToolSettings) -> Self {
        let backend = match HttpBackend::new(&settings.search_url, settings.timeout_secs) {
            Ok(backend) => Some(backend),
            Err(e) => {
                warn!("Web search unavailable, using fallback mode: {}", e);
                None
            }
        };

        Self {
            backend,
            max_results: settings.search_max_results,
        }
    }

    /// Whether the tool runs without a backend.
    pub fn is_fallback(&self) -> bool {
        self.backend.is_none()
    }

    async fn search(&self, query: &str) -> Result<String, ToolError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| ToolError::Unavailable("no search backend".to_string()))?;

        let mut url = backend.endpoint();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("no_html", "1")
            .append_pair("skip_disambig", "1");

        let answer: InstantAnswer = backend.get_json(url, RATE_LIMITED).await?;
        Ok(format_answer(&answer, self.max_results))
    }
}

/// Render an instant answer as a plain-text observation.
fn format_answer(answer: &InstantAnswer, max_results: usize) -> String {
    let mut sections = Vec::new();

    let direct = match &answer.answer {
        serde_json::Value::String(s) => s.clone(),
        _ => String::new(),
    };
    if !direct.is_empty() {
        sections.push(format!("Answer: {}", direct));
    }

    if !answer.abstract_text.is_empty() {
        let heading = if answer.heading.is_empty() {
            "Summary".to_string()
        } else {
            answer.heading.clone()
        };
        let mut section = format!("{}: {}", heading, answer.abstract_text);
        if !answer.abstract_url.is_empty() {
            section.push_str(&format!(" ({})", answer.abstract_url));
        }
        sections.push(section);
    } else if !answer.definition.is_empty() {
        sections.push(format!("Definition: {}", answer.definition));
    }

    let related: Vec<String> = flatten_topics(&answer.related_topics)
        .into_iter()
        .take(max_results)
        .map(|t| {
            if t.first_url.is_empty() {
                format!("- {}", t.text)
            } else {
                format!("- {} ({})", t.text, t.first_url)
            }
        })
        .collect();
    if !related.is_empty() {
        sections.push(format!("Related:\n{}", related.join("\n")));
    }

    if sections.is_empty() {
        "No good DuckDuckGo Search Result was found".to_string()
    } else {
        sections.join("\n\n")
    }
}

fn flatten_topics(topics: &[RelatedTopic]) -> Vec<&RelatedTopic> {
    let mut flat = Vec::new();
    for topic in topics {
        if !topic.text.is_empty() {
            flat.push(topic);
        }
        flat.extend(flatten_topics(&topic.topics));
    }
    flat
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        if self.is_fallback() {
            FALLBACK_DESCRIPTION
        } else {
            DESCRIPTION
        }
    }

    #[instrument(skip(self, input))]
    async fn invoke(&self, input: &str) -> String {
        let query = extract_argument(input, "query");
        match self.search(&query).await {
            Ok(results) => {
                debug!("Search returned {} chars", results.len());
                results
            }
            Err(e) => {
                warn!("Search failed for '{}': {}", query, e);
                format!(
                    "Search functionality temporarily unavailable. Query was: {}",
                    query
                )
            }
        }
    }
}
