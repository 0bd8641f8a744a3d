
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};

use super::{Config, DatabaseConfig, SearchConfig, get_config_dir};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Article Search Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Search Configuration").bold().yellow());
    eprintln!("Tune how collection indexes are built and queried.");
    eprintln!();

    configure_search(&mut config.search)?;

    eprintln!();
    eprintln!("{}", style("Database Configuration").bold().yellow());
    configure_database(&mut config.database)?;

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Search Settings:").bold().yellow());
    eprintln!("  Neighbors: {}", style(config.search.neighbors).cyan());
    eprintln!(
        "  Min Document Frequency: {}",
        style(config.search.min_document_frequency).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Database Settings:").bold().yellow());
    eprintln!(
        "  Max Connections: {}",
        style(config.database.max_connections).cyan()
    );
    eprintln!(
        "  Path: {}",
        style(config.database_path().display()).cyan()
    );

    let config_dir = get_config_dir().context("Failed to get config directory")?;
    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config_dir.join("config.toml").display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    let config_dir = get_config_dir().context("Failed to get config directory")?;
    let config_path = config_dir.join("config.toml");

    if config_path.exists() {
        let config = Config::load_from(&config_dir)?;
        eprintln!("{}", style("Found existing configuration.").green());
        Ok(config)
    } else {
        eprintln!(
            "{}",
            style("No existing configuration found. Using defaults.").yellow()
        );
        Ok(Config {
            base_dir: config_dir,
            ..Config::default()
        })
    }
}

fn configure_search(search: &mut SearchConfig) -> Result<()> {
    let neighbors: usize = Input::new()
        .with_prompt("Results per query")
        .default(search.neighbors)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Results per query must be between 1 and 100")
            }
        })
        .interact_text()?;

    let min_df: usize = Input::new()
        .with_prompt("Minimum documents a term must appear in")
        .default(search.min_document_frequency)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Minimum document frequency must be between 1 and 100")
            }
        })
        .interact_text()?;

    search.set_neighbors(neighbors)?;
    search.set_min_document_frequency(min_df)?;

    Ok(())
}

fn configure_database(database: &mut DatabaseConfig) -> Result<()> {
    let max_connections: u32 = Input::new()
        .with_prompt("Maximum database connections")
        .default(database.max_connections)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if (1..=64).contains(input) {
                Ok(())
            } else {
                Err("Connections must be between 1 and 64")
            }
        })
        .interact_text()?;

    database.set_max_connections(max_connections)?;

    Ok(())
}
