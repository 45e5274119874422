//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use villa_core::Config;

use crate::output::{Output, OutputFormat};

fn or_not_set(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(not set)".to_string())
}

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "published_url": config.published_url,
                    "published_path": config.published_path,
                    "max_document_bytes": config.max_document_bytes,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!("  published_url:      {}", or_not_set(config.published_url.clone()));
            println!(
                "  published_path:     {}",
                or_not_set(config.published_path.as_ref().map(|p| p.display().to_string()))
            );
            println!("  max_document_bytes: {}", config.max_document_bytes);
            println!(
                "  log_file:           {}",
                or_not_set(config.log_file.as_ref().map(|p| p.display().to_string()))
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
///
/// `none` or an empty value clears an optional setting.
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let cleared = value.is_empty() || value == "none";

    match key.as_str() {
        "data_dir" => {
            config.data_dir = value.clone().into();
        }
        "published_url" => {
            config.published_url = if cleared { None } else { Some(value.clone()) };
        }
        "published_path" => {
            config.published_path = if cleared {
                None
            } else {
                Some(value.clone().into())
            };
        }
        "max_document_bytes" => {
            config.max_document_bytes = value
                .parse()
                .context("Invalid value for max_document_bytes. Use a number of bytes.")?;
        }
        "log_file" => {
            config.log_file = if cleared {
                None
            } else {
                Some(value.clone().into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, published_url, published_path, max_document_bytes, log_file",
                key
            );
        }
    }

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
