//! Code-fence stripping for model output.

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Strip surrounding whitespace and code-fence markers from model output.
///
/// A fence annotated as JSON takes priority over a bare fence. A missing
/// closing fence is tolerated: only the opening marker is removed. Nested
/// fences are unwrapped until the text no longer opens with one, so the
/// function is idempotent.
pub fn normalize(text: &str) -> String {
    let mut current = text.trim();

    loop {
        let inner = if let Some(rest) = current.strip_prefix(JSON_FENCE) {
            rest
        } else if let Some(rest) = current.strip_prefix(FENCE) {
            rest
        } else {
            return current.to_string();
        };

        current = inner.strip_suffix(FENCE).unwrap_or(inner).trim();
    }
}
