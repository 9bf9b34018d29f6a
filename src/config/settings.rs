//! Configuration settings for Sleuth.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub tools: ToolSettings,
    pub notes: NoteSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Number of recent queries shown in interactive mode.
    pub history_size: usize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            history_size: 5,
        }
    }
}

/// Language model backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Chat model name.
    pub name: String,
    /// Base URL of an OpenAI-compatible API. None uses the OpenAI default.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum model round-trips per query.
    pub max_iterations: usize,
    /// Timeout for a single model request, in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.2,
            max_iterations: crate::agent::DEFAULT_MAX_ITERATIONS,
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// External tool backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// DuckDuckGo Instant Answer endpoint.
    pub search_url: String,
    /// Maximum related topics included in a search observation.
    pub search_max_results: usize,
    /// MediaWiki API endpoint.
    pub wikipedia_url: String,
    /// Number of Wikipedia pages summarized per lookup.
    pub wikipedia_top_k: usize,
    /// Maximum characters of Wikipedia content returned.
    pub wikipedia_max_chars: usize,
    /// Timeout for tool HTTP requests, in seconds.
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            search_url: "https://api.duckduckgo.com/".to_string(),
            search_max_results: 5,
            wikipedia_url: "https://en.wikipedia.org/w/api.php".to_string(),
            wikipedia_top_k: 1,
            wikipedia_max_chars: 100,
            timeout_secs: 15,
        }
    }
}

/// Settings for the note-saving tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteSettings {
    /// Append notes to disk. When false the tool only formats them.
    pub write_to_disk: bool,
    /// Directory notes are written to.
    pub dir: String,
    /// Filename used when the model does not provide one.
    pub default_filename: String,
}

impl Default for NoteSettings {
    fn default() -> Self {
        Self {
            write_to_disk: false,
            dir: "~/.sleuth/notes".to_string(),
            default_filename: "research_output.txt".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SleuthError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sleuth")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded notes directory path.
    pub fn notes_dir(&self) -> PathBuf {
        Self::expand_path(&self.notes.dir)
    }

    /// Read the model API key from the configured environment variable.
    pub fn api_key(&self) -> crate::error::Result<String> {
        let var = &self.model.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(crate::error::SleuthError::Config(format!(
                "{} is empty. Set it with: export {}='...'",
                var, var
            ))),
            Err(_) => Err(crate::error::SleuthError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                var, var
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.max_iterations, 15);
        assert_eq!(settings.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.tools.wikipedia_top_k, 1);
        assert_eq!(settings.tools.wikipedia_max_chars, 100);
        assert!(!settings.notes.write_to_disk);
        assert_eq!(settings.notes.default_filename, "research_output.txt");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[model]\nname = \"gemini-2.0-flash\"\napi_key_env = \"GOOGLE_API_KEY\"\n\n[notes]\nwrite_to_disk = true\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.model.name, "gemini-2.0-flash");
        assert_eq!(settings.model.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(settings.model.max_iterations, 15);
        assert!(settings.notes.write_to_disk);
        assert_eq!(settings.general.history_size, 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.model.name, ModelSettings::default().name);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.model.temperature = 0.7;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.model.temperature, 0.7);
    }

    #[test]
    fn test_api_key_missing_is_config_error() {
        let mut settings = Settings::default();
        settings.model.api_key_env = "SLEUTH_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = settings.api_key().unwrap_err();
        assert!(matches!(err, crate::error::SleuthError::Config(_)));
        assert!(err.to_string().contains("SLEUTH_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
