//! Configuration module for Sleuth.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ResearchPrompts};
pub use settings::{
    GeneralSettings, ModelSettings, NoteSettings, PromptSettings, Settings, ToolSettings,
};
