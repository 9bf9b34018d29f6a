//! Note-saving tool.
//!
//! Always returns the formatted note. Appending it to disk is opt-in, since the
//! process may run where the filesystem is read-only.

use super::{extract_argument, Tool};
use crate::config::NoteSettings;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

/// Formats research notes with a timestamp and optionally appends them to a file.
pub struct SaveNoteTool {
    write_to_disk: bool,
    dir: PathBuf,
    default_filename: String,
}

impl SaveNoteTool {
    /// Create the tool from note settings and the expanded notes directory.
    pub fn new(settings: &NoteSettings, dir: PathBuf) -> Self {
        Self {
            write_to_disk: settings.write_to_disk,
            dir,
            default_filename: settings.default_filename.clone(),
        }
    }

    /// Resolve the target file, keeping only the final path component of a
    /// model-supplied filename.
    fn target_path(&self, filename: Option<&str>) -> PathBuf {
        let name = filename
            .and_then(|f| Path::new(f).file_name())
            .and_then(|f| f.to_str())
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.default_filename);
        self.dir.join(name)
    }

    async fn append(&self, path: &Path, text: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await
    }
}

/// Format a note the way it is written to disk.
fn format_note(data: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "--- Research Output ---\nTimestamp: {}\n\n{}\n\n",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        data
    )
}

/// Optional `filename` argument from a JSON arguments object.
fn filename_argument(arguments: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(arguments)
        .ok()?
        .get("filename")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl Tool for SaveNoteTool {
    fn name(&self) -> &str {
        "save_text_to_file"
    }

    fn description(&self) -> &str {
        "Saves structured research data to a text file or formats it for display."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "string",
                    "description": "The research text to save"
                },
                "filename": {
                    "type": "string",
                    "description": "Target file name (optional)"
                }
            },
            "required": ["data"]
        })
    }

    #[instrument(skip(self, input))]
    async fn invoke(&self, input: &str) -> String {
        let data = extract_argument(input, "data");
        let note = format_note(&data, Local::now());
        let formatted = format!("Research data formatted and ready:\n{}", note);

        if !self.write_to_disk {
            return formatted;
        }

        let path = self.target_path(filename_argument(input).as_deref());
        match self.append(&path, &note).await {
            Ok(()) => {
                info!("Saved research note to {}", path.display());
                format!("{}Saved to {}", formatted, path.display())
            }
            Err(e) => {
                warn!("Could not save note to {}: {}", path.display(), e);
                format!(
                    "{}Note: Could not save to file ({}), but research completed successfully",
                    formatted, e
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tool(write_to_disk: bool, dir: PathBuf) -> SaveNoteTool {
        let settings = NoteSettings {
            write_to_disk,
            ..NoteSettings::default()
        };
        SaveNoteTool::new(&settings, dir)
    }

    #[test]
    fn test_format_note() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(
            format_note("findings", timestamp),
            "--- Research Output ---\nTimestamp: 2024-03-01 09:05:07\n\nfindings\n\n"
        );
    }

    #[test]
    fn test_target_path_strips_directories() {
        let tool = tool(true, PathBuf::from("/notes"));
        assert_eq!(tool.target_path(None), PathBuf::from("/notes/research_output.txt"));
        assert_eq!(
            tool.target_path(Some("../../etc/passwd")),
            PathBuf::from("/notes/passwd")
        );
        assert_eq!(tool.target_path(Some("")), PathBuf::from("/notes/research_output.txt"));
    }

    #[tokio::test]
    async fn test_format_only_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let tool = tool(false, dir.path().join("notes"));

        let result = tool.invoke(r#"{"data": "Rust is fast"}"#).await;
        assert!(result.starts_with("Research data formatted and ready:\n--- Research Output ---"));
        assert!(result.contains("\n\nRust is fast\n\n"));
        assert!(!dir.path().join("notes").exists());
    }

    #[tokio::test]
    async fn test_appends_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let notes_dir = dir.path().join("notes");
        let tool = tool(true, notes_dir.clone());

        tool.invoke(r#"{"data": "first", "filename": "topic.txt"}"#).await;
        let result = tool.invoke(r#"{"data": "second", "filename": "topic.txt"}"#).await;
        assert!(result.contains("Saved to"));

        let content = std::fs::read_to_string(notes_dir.join("topic.txt")).unwrap();
        assert_eq!(content.matches("--- Research Output ---").count(), 2);
        assert!(content.find("first").unwrap() < content.find("second").unwrap());
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_note() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let tool = tool(true, blocker.join("notes"));

        let result = tool.invoke("plain text note").await;
        assert!(result.contains("plain text note"));
        assert!(result.contains("Note: Could not save to file"));
    }
}
