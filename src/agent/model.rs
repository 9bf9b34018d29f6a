//! Chat model abstraction used by the reasoning loop.

use crate::config::ModelSettings;
use crate::error::{Result, SleuthError};
use crate::openai::create_client;
use crate::tools::ToolSpec;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A message in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    /// An assistant turn; carries the tool calls it requested, if any.
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolInvocation>,
    },
    /// The observation produced for one tool call.
    Tool { call_id: String, content: String },
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// Arguments as sent by the model, normally a JSON object.
    pub arguments: String,
}

/// What the model answered on one round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// The model wants these tools run before it continues.
    ToolCalls {
        content: Option<String>,
        calls: Vec<ToolInvocation>,
    },
    /// A terminal answer.
    Final(String),
}

/// A chat model that supports tool calling.
///
/// Implementations must be safe to call concurrently from several queries.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation and the available tools, and return the reply.
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply>;
}

/// Chat model backed by an OpenAI-compatible chat completions API.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a model client from settings and an API key.
    pub fn new(settings: &ModelSettings, api_key: &str) -> Result<Self> {
        let client = create_client(
            api_key,
            settings.api_base.as_deref(),
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.name.clone(),
            temperature: settings.temperature,
        })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message {
            ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
                .content(content.clone())
                .build()
                .map_err(|e| SleuthError::AgentExecution(e.to_string()))?
                .into(),
            ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
                .content(content.clone())
                .build()
                .map_err(|e| SleuthError::AgentExecution(e.to_string()))?
                .into(),
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                if let Some(text) = content {
                    args.content(text.clone());
                }
                if !tool_calls.is_empty() {
                    args.tool_calls(
                        tool_calls
                            .iter()
                            .map(|call| ChatCompletionMessageToolCall {
                                id: call.id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.clone(),
                                },
                            })
                            .collect::<Vec<_>>(),
                    );
                }
                args.build()
                    .map_err(|e| SleuthError::AgentExecution(e.to_string()))?
                    .into()
            }
            ChatMessage::Tool { call_id, content } => {
                ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(call_id.clone())
                    .content(content.clone())
                    .build()
                    .map_err(|e| SleuthError::AgentExecution(e.to_string()))?
                    .into()
            }
        };
        Ok(built)
    }

    fn to_tool_definition(spec: &ToolSpec) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: spec.name.clone(),
                description: Some(spec.description.clone()),
                parameters: Some(spec.parameters.clone()),
                strict: None,
            },
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply> {
        let messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if !tools.is_empty() {
            args.tools(tools.iter().map(Self::to_tool_definition).collect::<Vec<_>>());
        }
        let request = args
            .build()
            .map_err(|e| SleuthError::AgentExecution(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SleuthError::OpenAI(format!("Agent API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SleuthError::AgentExecution("No response from model".to_string()))?;

        match choice.message.tool_calls {
            Some(tool_calls) if !tool_calls.is_empty() => {
                debug!("Model requested {} tool call(s)", tool_calls.len());
                Ok(ModelReply::ToolCalls {
                    content: choice.message.content,
                    calls: tool_calls
                        .into_iter()
                        .map(|call| ToolInvocation {
                            id: call.id,
                            name: call.function.name,
                            arguments: call.function.arguments,
                        })
                        .collect(),
                })
            }
            _ => Ok(ModelReply::Final(choice.message.content.unwrap_or_default())),
        }
    }
}
