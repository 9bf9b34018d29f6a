//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before building a model
//! client that would otherwise fail on its first request.

use crate::config::Settings;
use crate::error::Result;

/// Check that a research run can start.
///
/// Returns Ok(()) if the model API key is available, or an error describing what's missing.
pub fn check_research(settings: &Settings) -> Result<()> {
    settings.api_key()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SleuthError;

    #[test]
    fn test_check_research_requires_key() {
        let mut settings = Settings::default();
        settings.model.api_key_env = "SLEUTH_PREFLIGHT_KEY_NEVER_SET".to_string();
        let err = check_research(&settings).unwrap_err();
        assert!(matches!(err, SleuthError::Config(_)));
    }
}
