//! The research pipeline: query in, structured answer out.
//!
//! A [`Researcher`] owns everything that is expensive to set up (model client,
//! tools, rendered prompt) and is built once, then shared read-only by every
//! query. Frontends call [`Researcher::research`] and render its outcome.

use crate::agent::{Agent, ChatModel, OpenAIChatModel, PromptContract, RawModelOutput};
use crate::config::{Prompts, Settings};
use crate::error::{Result, SleuthError};
use crate::response::{process_response, ResearchResponse};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Runs research queries against a prebuilt agent.
pub struct Researcher {
    agent: Agent,
}

impl Researcher {
    /// Build a researcher from settings, reading the API key from the environment.
    ///
    /// Fails with a configuration error before any client is created if the
    /// key is missing.
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.api_key()?;
        let model = OpenAIChatModel::new(&settings.model, &api_key)?;
        Self::with_model(settings, Arc::new(model))
    }

    /// Build a researcher around an existing chat model.
    pub fn with_model(settings: &Settings, model: Arc<dyn ChatModel>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let envelope = PromptContract::build(&prompts);
        let tools = ToolRegistry::build(settings);

        info!(
            "Research agent ready with tools: {}",
            tools.names().join(", ")
        );

        let agent = Agent::new(model, tools, envelope)
            .with_max_iterations(settings.model.max_iterations);

        Ok(Self { agent })
    }

    /// Names of the tools available to the agent.
    pub fn tool_names(&self) -> Vec<String> {
        self.agent.tools().names()
    }

    /// Answer a research question.
    ///
    /// Errors are [`SleuthError::InvalidInput`] for a blank query, an agent
    /// execution error if the model could not produce an answer, or
    /// [`SleuthError::SchemaValidation`] carrying the raw output if the answer
    /// did not match the expected format.
    #[instrument(skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn research(&self, query: &str) -> Result<ResearchResponse> {
        let raw = self.run_agent(query).await?;

        process_response(raw).map_err(|e| {
            warn!("Agent output did not match the response format: {}", e.message);
            SleuthError::from(e)
        })
    }

    /// Run the agent and return its unprocessed output.
    pub async fn run_agent(&self, query: &str) -> Result<RawModelOutput> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SleuthError::InvalidInput(
                "Research query must not be empty".to_string(),
            ));
        }

        info!("Researching: {}", query);
        self.agent.run(query).await
    }
}

/// Return the process-wide researcher, building it on first use.
///
/// Concurrent first callers wait for a single construction. A failed build is
/// not cached, so a later call can retry once the configuration is fixed.
pub async fn shared(settings: &Settings) -> Result<Arc<Researcher>> {
    static SHARED: OnceCell<Arc<Researcher>> = OnceCell::const_new();
    SHARED
        .get_or_try_init(|| async { Researcher::new(settings).map(Arc::new) })
        .await
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ModelReply;
    use crate::testing::{offline_settings, tool_call, ScriptedModel};

    fn researcher(replies: Vec<Result<ModelReply>>) -> (Researcher, Arc<ScriptedModel>) {
        let model = Arc::new(ScriptedModel::new(replies));
        let researcher = Researcher::with_model(&offline_settings(), model.clone()).unwrap();
        (researcher, model)
    }

    #[tokio::test]
    async fn test_research_fenced_answer() {
        let (researcher, _) = researcher(vec![
            Ok(tool_call("call_1", "search", r#"{"query": "t"}"#)),
            Ok(ModelReply::Final(
                "```json\n{\"topic\":\"t\",\"summary\":\"s\",\"sources\":[\"a\"],\"tools_used\":[\"search\"]}\n```"
                    .to_string(),
            )),
        ]);

        let response = researcher.research("Tell me about t").await.unwrap();
        assert_eq!(
            response,
            ResearchResponse {
                topic: "t".to_string(),
                summary: "s".to_string(),
                sources: vec!["a".to_string()],
                tools_used: vec!["search".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_research_schema_failure_keeps_raw_output() {
        let (researcher, _) = researcher(vec![
            Ok(tool_call("call_1", "wikipedia", r#"{"query": "t"}"#)),
            Ok(ModelReply::Final("```json\n{\"topic\":\"t\"}".to_string())),
        ]);

        let err = researcher.research("Tell me about t").await.unwrap_err();
        assert!(err.is_retryable());

        let parse_error = err.parse_error().expect("schema validation error");
        assert!(parse_error.message.contains("summary"));
        assert_eq!(parse_error.raw_output.output, "```json\n{\"topic\":\"t\"}");
        assert_eq!(parse_error.raw_output.intermediate_steps.len(), 1);
        assert_eq!(parse_error.normalized_text, "{\"topic\":\"t\"}");
    }

    #[tokio::test]
    async fn test_research_rejects_blank_query() {
        let (researcher, model) = researcher(Vec::new());
        let err = researcher.research("   \n").await.unwrap_err();
        assert!(matches!(err, SleuthError::InvalidInput(_)));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_research_model_failure() {
        let (researcher, _) = researcher(vec![Err(SleuthError::OpenAI("503".to_string()))]);
        let err = researcher.research("anything").await.unwrap_err();
        assert!(matches!(err, SleuthError::AgentExecution(_)));
    }

    #[tokio::test]
    async fn test_query_is_trimmed_before_sending() {
        let (researcher, model) = researcher(vec![Ok(ModelReply::Final(
            r#"{"topic":"t","summary":"s","sources":[],"tools_used":[]}"#.to_string(),
        ))]);
        researcher.research("  What is Rust?  ").await.unwrap();
        assert!(model
            .request(0)
            .contains(&crate::agent::ChatMessage::User("What is Rust?".to_string())));
    }

    #[test]
    fn test_new_requires_api_key() {
        let mut settings = offline_settings();
        settings.model.api_key_env = "SLEUTH_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = Researcher::new(&settings).err().unwrap();
        assert!(matches!(err, SleuthError::Config(_)));
    }

    #[test]
    fn test_tool_names() {
        let (researcher, _) = researcher(Vec::new());
        assert_eq!(
            researcher.tool_names(),
            vec!["search", "wikipedia", "save_text_to_file"]
        );
    }
}
