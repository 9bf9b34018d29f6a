//! Encyclopedia lookup via the MediaWiki API.

use super::{extract_argument, truncate_chars, HttpBackend, Tool, ToolError};
use crate::config::ToolSettings;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{instrument, warn};

const DESCRIPTION: &str = "A wrapper around Wikipedia. Useful for when you need to answer general \
questions about people, places, companies, facts, historical events, or other subjects. \
Input should be a search query.";
const FALLBACK_DESCRIPTION: &str = "Search Wikipedia for information (fallback mode).";

/// Wikipedia lookup returning short, length-capped page summaries.
pub struct WikipediaTool {
    backend: Option<HttpBackend>,
    top_k: usize,
    max_chars: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryResponse {
    query: Option<QueryPages>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryPages {
    pages: Vec<Page>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Page {
    title: String,
    extract: String,
    /// Search rank of the page.
    index: u32,
}

impl WikipediaTool {
    /// Create the Wikipedia tool, in fallback mode if the backend cannot be set up.
    pub fn new(settings: &ToolSettings) -> Self {
        let backend = match HttpBackend::new(&settings.wikipedia_url, settings.timeout_secs) {
            Ok(backend) => Some(backend),
            Err(e) => {
                warn!("Wikipedia unavailable, using fallback mode: {}", e);
                None
            }
        };

        Self {
            backend,
            top_k: settings.wikipedia_top_k.max(1),
            max_chars: settings.wikipedia_max_chars,
        }
    }

    /// Whether the tool runs without a backend.
    pub fn is_fallback(&self) -> bool {
        self.backend.is_none()
    }

    async fn lookup(&self, query: &str) -> Result<String, ToolError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| ToolError::Unavailable("no Wikipedia backend".to_string()))?;

        let limit = self.top_k.to_string();
        let mut url = backend.endpoint();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("format", "json")
            .append_pair("formatversion", "2")
            .append_pair("generator", "search")
            .append_pair("gsrsearch", query)
            .append_pair("gsrlimit", &limit)
            .append_pair("prop", "extracts")
            .append_pair("exintro", "1")
            .append_pair("explaintext", "1")
            .append_pair("exlimit", &limit)
            .append_pair("redirects", "1");

        let parsed: QueryResponse = backend.get_json(url, &[]).await?;

        Ok(format_pages(parsed, self.max_chars))
    }
}

/// Render pages in search-rank order, capped at `max_chars` characters.
fn format_pages(response: QueryResponse, max_chars: usize) -> String {
    let mut pages = response.query.map(|q| q.pages).unwrap_or_default();
    pages.retain(|p| !p.extract.trim().is_empty());
    pages.sort_by_key(|p| p.index);

    if pages.is_empty() {
        return "No good Wikipedia Search Result was found".to_string();
    }

    let text = pages
        .iter()
        .map(|p| format!("Page: {}\nSummary: {}", p.title, p.extract.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");

    truncate_chars(&text, max_chars)
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
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
        match self.lookup(&query).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Wikipedia lookup failed for '{}': {}", query, e);
                format!(
                    "Wikipedia search temporarily unavailable. Query was: {}",
                    query
                )
            }
        }
    }
}
