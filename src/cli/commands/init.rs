//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Sleuth Setup");
    println!();
    println!("Welcome to Sleuth! Let's make sure everything is configured correctly.\n");

    // Step 1: API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    let key_var = &settings.model.api_key_env;
    if settings.api_key().is_err() {
        Output::warning(&format!("{} environment variable is not set.", key_var));
        println!();
        println!("  Sleuth needs a model API key to run the research agent.");
        println!(
            "  Get an OpenAI key from: {}",
            style("https://platform.openai.com/api-keys").underlined()
        );
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style(format!("export {}='sk-...'", key_var)).green());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'sleuth init' again.");
            return Ok(());
        }
    } else {
        Output::success("API key is configured!");
    }

    println!();

    // Step 2: notes directory
    println!("{}", style("Step 2: Research notes").bold().cyan());
    println!();

    if settings.notes.write_to_disk {
        let notes_dir = settings.notes_dir();
        if !notes_dir.exists() {
            std::fs::create_dir_all(&notes_dir)?;
            Output::success(&format!("Created notes directory: {}", notes_dir.display()));
        } else {
            Output::info(&format!("Notes directory exists: {}", notes_dir.display()));
        }
    } else {
        Output::info("Notes are returned to the agent only (notes.write_to_disk = false).");
    }

    println!();

    // Step 3: config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("sleuth config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check configuration and tools", style("sleuth doctor").cyan());
    println!("  {} Research a question", style("sleuth ask \"<question>\"").cyan());
    println!("  {} Research several questions", style("sleuth interactive").cyan());
    println!();
    println!("For more help: {}", style("sleuth --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
