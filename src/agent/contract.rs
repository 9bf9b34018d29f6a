//! The prompt contract: system instructions plus the answer format.
//!
//! The model signals its final answer with plain text, so the system prompt is
//! the only thing shaping that text. The format instructions are generated from
//! the [`ResearchResponse`] schema and computed once per process.

use super::model::ChatMessage;
use crate::config::Prompts;
use crate::response::ResearchResponse;
use schemars::{schema_for, JsonSchema};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Describe the JSON shape of `T` for the model.
pub fn format_instructions_for<T: JsonSchema>() -> String {
    let mut schema = serde_json::to_value(schema_for!(T)).unwrap_or_default();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    let schema = serde_json::to_string(&schema).unwrap_or_default();

    format!(
        r#"The output must be a single JSON object that conforms to the JSON schema below.

For example, for the schema {{"properties": {{"items": {{"type": "array", "items": {{"type": "string"}}}}}}, "required": ["items"]}}
the object {{"items": ["a", "b"]}} is well-formatted, while {{"properties": {{"items": ["a", "b"]}}}} is not.

Output schema:
```
{}
```"#,
        schema
    )
}

/// Format instructions for [`ResearchResponse`], generated on first use.
pub fn format_instructions() -> &'static str {
    static INSTRUCTIONS: OnceLock<String> = OnceLock::new();
    INSTRUCTIONS.get_or_init(format_instructions_for::<ResearchResponse>)
}

/// Builds the prompt envelope used for every query.
pub struct PromptContract;

impl PromptContract {
    /// Render the system instructions with the format instructions embedded.
    pub fn build(prompts: &Prompts) -> PromptEnvelope {
        let mut vars = HashMap::new();
        vars.insert(
            "format_instructions".to_string(),
            format_instructions().to_string(),
        );

        PromptEnvelope {
            system: prompts.render_with_custom(&prompts.research.system, &vars),
            history: Vec::new(),
        }
    }
}

/// Fixed message layout: system, prior turns, user query, scratchpad.
#[derive(Debug, Clone)]
pub struct PromptEnvelope {
    system: String,
    /// Prior conversation turns. Empty for single-turn research.
    history: Vec<ChatMessage>,
}

impl PromptEnvelope {
    /// The rendered system instructions.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Assemble the messages for one model round-trip.
    pub fn messages(&self, query: &str, scratchpad: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2 + self.history.len() + scratchpad.len());
        messages.push(ChatMessage::System(self.system.clone()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::User(query.to_string()));
        messages.extend(scratchpad.iter().cloned());
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_instructions_describe_all_fields() {
        let instructions = format_instructions();
        for field in ["topic", "summary", "sources", "tools_used"] {
            assert!(instructions.contains(field), "{} missing", field);
        }
        assert!(!instructions.contains("$schema"));
    }

    #[test]
    fn test_format_instructions_computed_once() {
        let first = format_instructions();
        let second = format_instructions();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_system_prompt_embeds_instructions() {
        let envelope = PromptContract::build(&Prompts::default());
        assert!(envelope.system().contains("research assistant"));
        assert!(envelope.system().contains(format_instructions()));
        assert!(!envelope.system().contains("{{format_instructions}}"));
    }

    #[test]
    fn test_message_order() {
        let envelope = PromptContract::build(&Prompts::default());
        let scratch = vec![ChatMessage::Tool {
            call_id: "call_1".to_string(),
            content: "observation".to_string(),
        }];

        let messages = envelope.messages("What is Rust?", &scratch);
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], ChatMessage::System(_)));
        assert_eq!(messages[1], ChatMessage::User("What is Rust?".to_string()));
        assert_eq!(messages[2], scratch[0]);
    }
}
