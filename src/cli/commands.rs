//! CLI command handlers

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{self, ConfigLoader, STARTER_CONFIG, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "namespaces", "collector.concurrency")
        key: Option<String>,
    },
    /// Set configuration value in the root config
    Set {
        /// Configuration key (e.g., "namespaces", "collector.concurrency")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
    /// Write a commented starter config
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Handle configuration subcommands
///
/// `explicit` is the `--config` file layered over the root config.
pub async fn handle_config_command(cmd: ConfigSubcommand, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load(explicit).context("Failed to load configuration")?;

            if let Some(key) = key {
                // Get specific key
                let value = config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                // Print all config as YAML
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Only the root file is edited; other layers stay untouched
            let root_path = paths::root_config_path();
            let mut config = if root_path.exists() {
                ConfigLoader::load_file(&root_path)?
            } else {
                ConfigLoader::load_defaults()
            };

            config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;
            ConfigLoader::validate(&config)?;

            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load(explicit).context("Failed to load configuration")?;

            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path => {
            let config_path = paths::root_config_path();
            println!("{}", config_path.display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::load_validated(explicit).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
        ConfigSubcommand::Init { force } => {
            let config_path = paths::root_config_path();
            if config_path.exists() && !force {
                return Err(anyhow::anyhow!(
                    "Config file already exists: {} (use --force to overwrite)",
                    config_path.display()
                ));
            }
            if let Some(parent) = config_path.parent() {
                paths::ensure_dir(parent)?;
            }
            std::fs::write(&config_path, STARTER_CONFIG).with_context(|| {
                format!("Failed to write config file: {}", config_path.display())
            })?;
            println!("Wrote {}", config_path.display());
        }
    }

    Ok(())
}
