//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Kubeconfig context to use (current context when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Namespaces to inventory; empty means all namespaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,

    /// Namespaces to skip, applied after `namespaces`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_namespaces: Vec<String>,

    /// Collector tuning
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Cluster component discovery settings
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Checks to run alongside the inventory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckConfig>,
}

/// Collector configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorConfig {
    /// Maximum number of namespaces (and checks) processed at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout for API calls and the DNS probe
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

/// Cluster component configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Directory scanned for CNI network configuration
    #[serde(default = "default_cni_conf_dir")]
    pub cni_conf_dir: PathBuf,

    /// Directory holding CNI plugin binaries
    #[serde(default = "default_cni_bin_dir")]
    pub cni_bin_dir: PathBuf,

    /// Host resolved to decide whether external DNS works
    #[serde(default = "default_dns_probe_host")]
    pub dns_probe_host: String,
}

/// One configured check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckConfig {
    /// Name shown in the report
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Registered check kind used to build the check
    pub kind: String,

    /// Check-specific settings, interpreted by the check itself
    #[serde(default, skip_serializing_if = "serde_yaml::Value::is_null")]
    pub spec: serde_yaml::Value,
}

// Default value functions
fn default_concurrency() -> usize {
    8
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_cni_conf_dir() -> PathBuf {
    PathBuf::from("/etc/cni/net.d")
}

fn default_cni_bin_dir() -> PathBuf {
    PathBuf::from("/opt/cni/bin")
}

fn default_dns_probe_host() -> String {
    "google.com".to_string()
}

impl Config {
    /// Per-request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.collector.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context: None,
            namespaces: Vec::new(), // Empty means every namespace
            exclude_namespaces: Vec::new(),
            collector: CollectorConfig::default(),
            cluster: ClusterConfig::default(),
            checks: Vec::new(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cni_conf_dir: default_cni_conf_dir(),
            cni_bin_dir: default_cni_bin_dir(),
            dns_probe_host: default_dns_probe_host(),
        }
    }
}
