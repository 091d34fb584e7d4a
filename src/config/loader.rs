//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Environment variable overriding `context`
pub const CONTEXT_ENV: &str = "KUBE_INVENTORY_CONTEXT";
/// Environment variable overriding `namespaces` (comma-separated)
pub const NAMESPACES_ENV: &str = "KUBE_INVENTORY_NAMESPACES";
/// Environment variable overriding `collector.concurrency`
pub const CONCURRENCY_ENV: &str = "KUBE_INVENTORY_CONCURRENCY";
/// Environment variable overriding `collector.requestTimeoutSeconds`
pub const REQUEST_TIMEOUT_ENV: &str = "KUBE_INVENTORY_REQUEST_TIMEOUT";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Explicit config file (`--config`)
    /// 3. Root config
    /// 4. Built-in defaults
    ///
    /// A missing root config is fine; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut config = Self::load_defaults();

        let root_path = paths::root_config_path();
        if root_path.exists() {
            let root_config = Self::load_file(&root_path)?;
            config = Self::merge_config(config, root_config);
        }

        if let Some(path) = explicit {
            let file_config = Self::load_file(path)?;
            config = Self::merge_config(config, file_config);
        }

        config = Self::apply_env_overrides(config, |key| std::env::var(key).ok());

        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the merged configuration and check it for semantic errors
    pub fn load_validated(explicit: Option<&Path>) -> Result<Config> {
        let config = Self::load(explicit).context("Failed to load merged configuration")?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Check a configuration for values the collector cannot run with
    pub fn validate(config: &Config) -> Result<()> {
        if config.collector.concurrency == 0 {
            return Err(anyhow::anyhow!("collector.concurrency must be at least 1"));
        }
        if config.collector.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!(
                "collector.requestTimeoutSeconds must be at least 1"
            ));
        }

        let mut names = HashSet::new();
        for check in &config.checks {
            if check.name.trim().is_empty() {
                return Err(anyhow::anyhow!("every check needs a name"));
            }
            if check.kind.trim().is_empty() {
                return Err(anyhow::anyhow!("check '{}' has no kind", check.name));
            }
            if !names.insert(check.name.as_str()) {
                return Err(anyhow::anyhow!("duplicate check name '{}'", check.name));
            }
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Merge two configurations, with `other` taking precedence
    ///
    /// Lists and the context only override when `other` sets them.
    fn merge_config(base: Config, other: Config) -> Config {
        Config {
            context: other.context.or(base.context),
            namespaces: if other.namespaces.is_empty() {
                base.namespaces
            } else {
                other.namespaces
            },
            exclude_namespaces: if other.exclude_namespaces.is_empty() {
                base.exclude_namespaces
            } else {
                other.exclude_namespaces
            },
            collector: other.collector,
            cluster: other.cluster,
            checks: if other.checks.is_empty() {
                base.checks
            } else {
                other.checks
            },
        }
    }

    /// Apply environment variable overrides read through `lookup`
    ///
    /// Unparseable numeric values are logged and ignored.
    fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(context) = lookup(CONTEXT_ENV).filter(|c| !c.is_empty()) {
            config.context = Some(context);
        }

        if let Some(namespaces) = lookup(NAMESPACES_ENV) {
            config.namespaces = split_list(&namespaces);
        }

        if let Some(concurrency) = lookup(CONCURRENCY_ENV) {
            match concurrency.parse() {
                Ok(value) => config.collector.concurrency = value,
                Err(_) => tracing::warn!("Ignoring invalid {}: {}", CONCURRENCY_ENV, concurrency),
            }
        }

        if let Some(timeout) = lookup(REQUEST_TIMEOUT_ENV) {
            match timeout.parse() {
                Ok(value) => config.collector.request_timeout_seconds = value,
                Err(_) => tracing::warn!("Ignoring invalid {}: {}", REQUEST_TIMEOUT_ENV, timeout),
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
