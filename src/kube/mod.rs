//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides
//! a configured client for the inventory collector.
//!
//! HTTP/HTTPS proxies are honoured through the standard environment
//! variables (`HTTP_PROXY`, `HTTPS_PROXY`, `NO_PROXY`) by the kube client.

pub mod fetch;

pub use fetch::{ClusterApi, FetchError, FetchResult, KubeClusterApi};

use std::time::Duration;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// With no context the default loading strategy is used:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
///
/// With a context name the kubeconfig is loaded for that context only.
/// Connect and read timeouts are bounded by `request_timeout`.
pub async fn create_client(context: Option<&str>, request_timeout: Duration) -> Result<Client> {
    let mut config = match context {
        Some(name) => {
            let options = KubeConfigOptions {
                context: Some(name.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context '{}'", name))?
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    config.connect_timeout = Some(request_timeout);
    config.read_timeout = Some(request_timeout);

    tracing::debug!("Connecting to cluster at {}", config.cluster_url);
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Get the name of the context a run will use
///
/// Returns the explicit override when given, otherwise the kubeconfig's
/// `current-context`, or "in-cluster" when no kubeconfig can be read.
pub fn current_context(explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }
    Kubeconfig::read()
        .ok()
        .and_then(|kubeconfig| kubeconfig.current_context)
        .unwrap_or_else(|| "in-cluster".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_context_prefers_explicit() {
        assert_eq!(current_context(Some("staging")), "staging");
    }
}
