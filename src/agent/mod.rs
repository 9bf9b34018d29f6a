//! Agent system: a tool-calling reasoning loop around a chat model.
//!
//! The agent sends the prompt envelope to the model, runs any tools the model
//! asks for, feeds the observations back, and stops at the first reply that
//! requests no tools.

mod contract;
mod model;
mod runner;

pub use contract::{format_instructions, format_instructions_for, PromptContract, PromptEnvelope};
pub use model::{ChatMessage, ChatModel, ModelReply, OpenAIChatModel, ToolInvocation};
pub use runner::{Agent, RawModelOutput, ToolCallRecord, DEFAULT_MAX_ITERATIONS};
