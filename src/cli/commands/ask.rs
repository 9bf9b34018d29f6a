//! Ask command implementation.

use super::prepare_researcher;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    query: &str,
    json: bool,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    let researcher = prepare_researcher(model, settings).await?;

    let spinner = Output::spinner("Researching...");
    let outcome = researcher.research(query).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(response) if json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Ok(response) => Output::research_result(&response),
        Err(e) => {
            Output::research_error(&e);
            return Err(e.into());
        }
    }

    Ok(())
}
