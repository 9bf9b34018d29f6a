//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod init;
mod interactive;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use interactive::run_interactive;
pub use serve::run_serve;

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::research::{self, Researcher};
use std::sync::Arc;

/// Check configuration and build (or reuse) the shared researcher.
async fn prepare_researcher(
    model: Option<String>,
    mut settings: Settings,
) -> anyhow::Result<Arc<Researcher>> {
    if let Some(model) = model {
        settings.model.name = model;
    }

    if let Err(e) = preflight::check_research(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'sleuth doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Loading research tools...");
    let researcher = research::shared(&settings).await;
    spinner.finish_and_clear();

    Ok(researcher?)
}
