//! Tools the research agent can call.
//!
//! Every tool takes a single text input and returns a text observation. A tool
//! never fails from the agent's point of view: backend problems are turned into
//! a descriptive observation so the reasoning loop can carry on.

mod notes;
mod search;
mod wikipedia;

pub use notes::SaveNoteTool;
pub use search::WebSearchTool;
pub use wikipedia::WikipediaTool;

use crate::config::Settings;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

const USER_AGENT: &str = concat!("sleuth/", env!("CARGO_PKG_VERSION"));

/// Failure of an external tool backend.
///
/// These never leave the tools module; each tool maps them to an observation.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited by backend")]
    RateLimited,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// A capability exposed to the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as seen by the model.
    fn name(&self) -> &str;

    /// Description the model uses to decide when to call the tool.
    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    /// Run the tool on the raw argument text sent by the model.
    async fn invoke(&self, input: &str) -> String;
}

/// Name, description and argument schema of a tool, as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Extract the text argument for a tool from the model's argument string.
///
/// Accepts a JSON object carrying `key` (or LangChain's `__arg1`), a bare JSON
/// string, or plain non-JSON text. An object with a differently named key
/// yields its only string value, or else the raw argument text.
pub fn extract_argument(arguments: &str, key: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(arguments) {
        Ok(serde_json::Value::Object(map)) => {
            if let Some(value) = map.get(key).or_else(|| map.get("__arg1")) {
                return match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
            }
            if map.is_empty() {
                return String::new();
            }
            let mut strings = map.values().filter_map(|v| v.as_str());
            match (strings.next(), strings.next()) {
                (Some(only), None) => only.to_string(),
                _ => arguments.trim().to_string(),
            }
        }
        Ok(serde_json::Value::String(s)) => s,
        _ => arguments.trim().to_string(),
    }
}

/// HTTP client bound to a tool's JSON endpoint.
pub(crate) struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    pub(crate) fn new(url: &str, timeout_secs: u64) -> Result<Self, ToolError> {
        let endpoint = Url::parse(url)
            .map_err(|e| ToolError::Unavailable(format!("invalid URL '{}': {}", url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// A copy of the endpoint URL, for appending query parameters.
    pub(crate) fn endpoint(&self) -> Url {
        self.endpoint.clone()
    }

    /// GET `url` and decode the JSON body.
    ///
    /// HTTP 429 and any status in `rate_limited` map to [`ToolError::RateLimited`].
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        rate_limited: &[StatusCode],
    ) -> Result<T, ToolError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || rate_limited.contains(&status) {
            return Err(ToolError::RateLimited);
        }
        if !status.is_success() {
            return Err(ToolError::Unavailable(format!("HTTP {}", status)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ToolError::Decode(e.to_string()))
    }
}

/// Registry of tools keyed by unique name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard registry: web search, Wikipedia and note saving.
    ///
    /// Always returns all three tools; a tool whose backend cannot be set up
    /// is registered in fallback mode.
    pub fn build(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(WebSearchTool::new(&settings.tools));
        registry.register(WikipediaTool::new(&settings.tools));
        registry.register(SaveNoteTool::new(&settings.notes, settings.notes_dir()));
        registry
    }

    /// Register a tool. Returns false if the name is already taken.
    pub fn register(&mut self, tool: impl Tool + 'static) -> bool {
        if self.get(tool.name()).is_some() {
            warn!("Tool '{}' already registered, ignoring duplicate", tool.name());
            return false;
        }
        self.tools.push(Arc::new(tool));
        true
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Specs of all registered tools, for function calling.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name. Unknown names produce an observation listing the valid tools.
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(&self, name: &str, arguments: &str) -> String {
        match self.get(name) {
            Some(tool) => {
                info!("Invoking tool {} with args: {}", name, arguments);
                tool.invoke(arguments).await
            }
            None => {
                warn!("Model requested unknown tool: {}", name);
                format!(
                    "{} is not a valid tool, try one of [{}].",
                    name,
                    self.names().join(", ")
                )
            }
        }
    }
}

/// Truncate text to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
