//! Agent runner with tool calling loop.

use super::contract::PromptEnvelope;
use super::model::{ChatMessage, ChatModel, ModelReply, ToolInvocation};
use crate::error::{Result, SleuthError};
use crate::tools::ToolRegistry;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Default cap on model round-trips per query.
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Agent that alternates model calls with tool invocations.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    envelope: PromptEnvelope,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent from a model, its tools and the prompt envelope.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry, envelope: PromptEnvelope) -> Self {
        Self {
            model,
            tools,
            envelope,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// The tools available to the agent.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the agent on a query until the model gives a terminal answer.
    ///
    /// Tool calls are executed one at a time, in the order the model asked for them.
    pub async fn run(&self, query: &str) -> Result<RawModelOutput> {
        let specs = self.tools.specs();
        let mut scratchpad: Vec<ChatMessage> = Vec::new();
        let mut steps = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(SleuthError::ToolLoopExceeded(self.max_iterations));
            }

            debug!("Agent iteration {}", iterations);

            let messages = self.envelope.messages(query, &scratchpad);
            let reply = self
                .model
                .complete(&messages, &specs)
                .await
                .map_err(|e| match e {
                    SleuthError::AgentExecution(message) => SleuthError::AgentExecution(message),
                    other => SleuthError::AgentExecution(other.to_string()),
                })?;

            match reply {
                ModelReply::Final(output) => {
                    info!(
                        "Agent finished after {} iteration(s) and {} tool call(s)",
                        iterations,
                        steps.len()
                    );
                    return Ok(RawModelOutput {
                        output,
                        intermediate_steps: steps,
                        iterations,
                    });
                }
                ModelReply::ToolCalls { content, calls } => {
                    scratchpad.push(ChatMessage::Assistant {
                        content,
                        tool_calls: calls.clone(),
                    });

                    for call in &calls {
                        let record = self.execute_tool_call(call).await;
                        scratchpad.push(ChatMessage::Tool {
                            call_id: call.id.clone(),
                            content: record.observation.clone(),
                        });
                        steps.push(record);
                    }
                }
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &ToolInvocation) -> ToolCallRecord {
        info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

        let observation = self.tools.dispatch(&call.name, &call.arguments).await;

        ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            observation,
        }
    }
}

/// The final text of an agent run, with the trace of tool calls that led to it.
#[derive(Debug, Clone, Serialize)]
pub struct RawModelOutput {
    /// The model's terminal answer, unprocessed.
    pub output: String,
    /// Tool calls made during the run, in order.
    pub intermediate_steps: Vec<ToolCallRecord>,
    /// Number of model round-trips used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// Arguments passed to the tool.
    pub arguments: String,
    /// Observation returned by the tool.
    pub observation: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
