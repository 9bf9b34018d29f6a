//! Test doubles shared by unit tests.

use crate::agent::{ChatMessage, ChatModel, ModelReply, ToolInvocation};
use crate::config::Settings;
use crate::error::{Result, SleuthError};
use crate::tools::ToolSpec;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Chat model that replays a fixed script of replies and records each request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ModelReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of round-trips made so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Messages sent on the `index`-th round-trip.
    pub fn request(&self, index: usize) -> Vec<ChatMessage> {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage], _tools: &[ToolSpec]) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SleuthError::AgentExecution("script exhausted".to_string())))
    }
}

/// A reply requesting a single tool call.
pub fn tool_call(id: &str, name: &str, arguments: &str) -> ModelReply {
    ModelReply::ToolCalls {
        content: None,
        calls: vec![ToolInvocation {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
    }
}

/// Settings whose tool backends point at a closed local port.
pub fn offline_settings() -> Settings {
    let mut settings = Settings::default();
    settings.tools.search_url = "http://127.0.0.1:9/".to_string();
    settings.tools.wikipedia_url = "http://127.0.0.1:9/w/api.php".to_string();
    settings.tools.timeout_secs = 2;
    settings
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve_router(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
