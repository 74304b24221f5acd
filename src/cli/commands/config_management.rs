//! Config commands

use std::path::Path;

use colored::Colorize;

use crate::config::{StaticConfig, get_config};
use crate::errors::{HolderError, Result};

/// Generate example configuration file
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() {
        return Err(HolderError::file_operation(format!(
            "File already exists: {} (use --force to overwrite)",
            path
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default().save_to_file(&path)?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}

/// Print the effective configuration as TOML
pub fn config_show() -> Result<()> {
    let config = get_config();
    print!("{}", toml::to_string_pretty(config.as_ref())?);
    Ok(())
}
