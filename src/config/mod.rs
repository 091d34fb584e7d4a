//! Configuration system for kube-inventory
//!
//! Layered YAML configuration: built-in defaults, the root config file,
//! an explicit file and environment overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use defaults::STARTER_CONFIG;
pub use loader::{ConfigLoader, split_list};
pub use schema::{CheckConfig, ClusterConfig, CollectorConfig, Config};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "context" => Ok(config.context.clone().unwrap_or_default()),
        "namespaces" => Ok(config.namespaces.join(",")),
        "excludeNamespaces" => Ok(config.exclude_namespaces.join(",")),
        "collector.concurrency" => Ok(config.collector.concurrency.to_string()),
        "collector.requestTimeoutSeconds" => {
            Ok(config.collector.request_timeout_seconds.to_string())
        }
        "cluster.cniConfDir" => Ok(config.cluster.cni_conf_dir.display().to_string()),
        "cluster.cniBinDir" => Ok(config.cluster.cni_bin_dir.display().to_string()),
        "cluster.dnsProbeHost" => Ok(config.cluster.dns_probe_host.clone()),
        "checks" => {
            // Return as YAML array
            serde_yaml::to_string(&config.checks)
                .map_err(|e| anyhow::anyhow!("Failed to serialize checks: {}", e))
        }
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "context" => {
            if value.is_empty() {
                config.context = None;
            } else {
                config.context = Some(value.to_string());
            }
        }
        "namespaces" => {
            config.namespaces = split_list(value);
        }
        "excludeNamespaces" => {
            config.exclude_namespaces = split_list(value);
        }
        "collector.concurrency" => {
            config.collector.concurrency = value
                .parse()
                .context("collector.concurrency must be a number")?;
        }
        "collector.requestTimeoutSeconds" => {
            config.collector.request_timeout_seconds = value
                .parse()
                .context("collector.requestTimeoutSeconds must be a number")?;
        }
        "cluster.cniConfDir" => {
            config.cluster.cni_conf_dir = value.into();
        }
        "cluster.cniBinDir" => {
            config.cluster.cni_bin_dir = value.into();
        }
        "cluster.dnsProbeHost" => {
            config.cluster.dns_probe_host = value.to_string();
        }
        "checks" => {
            return Err(anyhow::anyhow!(
                "checks must be edited in the config file ({})",
                paths::root_config_path().display()
            ));
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
