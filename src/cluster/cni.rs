//! CNI discovery
//!
//! Scans the CNI configuration directory and reports the first network
//! configuration that parses, has plugins, and whose plugin binaries are
//! all installed.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Value, json};

use crate::report::{COMPLETE, RenderNode, ReportNode};

const CONF_EXTENSIONS: [&str; 3] = ["conf", "conflist", "json"];

/// A network configuration list (`.conflist`) or a single plugin lifted into one
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfigList {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cni_version: String,
    #[serde(default)]
    pub disable_check: bool,
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

/// One plugin entry of a network configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cni_version: Option<String>,
    #[serde(rename = "type", default)]
    pub plugin_type: String,
    #[serde(default)]
    pub capabilities: Option<Value>,
    #[serde(default)]
    pub ipam: Option<Value>,
    #[serde(default)]
    pub dns: Option<Value>,
}

/// Result of CNI discovery
#[derive(Debug, Clone, Default)]
pub struct CniStatus {
    pub conf_file: Option<PathBuf>,
    pub network: Option<NetworkConfigList>,
    pub error: Option<String>,
}

impl CniStatus {
    /// Pick the first usable configuration in `conf_dir`, sorted by file name
    pub fn discover(conf_dir: &Path, bin_dir: &Path) -> Self {
        let files = match conf_files(conf_dir) {
            Ok(files) if files.is_empty() => {
                return Self::failed(format!(
                    "no CNI configuration files found in {}",
                    conf_dir.display()
                ));
            }
            Ok(files) => files,
            Err(e) => {
                return Self::failed(format!(
                    "could not read CNI configuration directory {}: {}",
                    conf_dir.display(),
                    e
                ));
            }
        };

        for file in files {
            match load_conf_file(&file).and_then(|list| validate(list, bin_dir)) {
                Ok(network) => {
                    tracing::info!("Using CNI config file {}", file.display());
                    return Self {
                        conf_file: Some(file),
                        network: Some(network),
                        error: None,
                    };
                }
                Err(e) => {
                    tracing::warn!("Skipping CNI config file {}: {}", file.display(), e);
                }
            }
        }

        Self::failed(format!(
            "no valid CNI configuration found in {}",
            conf_dir.display()
        ))
    }

    fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

fn conf_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| CONF_EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn load_conf_file(path: &Path) -> Result<NetworkConfigList, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    parse_conf(&content, path.extension().and_then(|ext| ext.to_str()) == Some("conflist"))
}

/// Parse a `.conflist`, or lift a single-plugin `.conf` into a list
pub fn parse_conf(content: &str, is_list: bool) -> Result<NetworkConfigList, String> {
    if is_list {
        return serde_json::from_str(content).map_err(|e| format!("invalid conflist: {}", e));
    }
    let plugin: PluginConfig =
        serde_json::from_str(content).map_err(|e| format!("invalid conf: {}", e))?;
    Ok(NetworkConfigList {
        name: plugin.name.clone().unwrap_or_default(),
        cni_version: plugin.cni_version.clone().unwrap_or_default(),
        disable_check: false,
        plugins: vec![plugin],
    })
}

fn validate(list: NetworkConfigList, bin_dir: &Path) -> Result<NetworkConfigList, String> {
    if list.plugins.is_empty() {
        return Err(format!("network {:?} has no plugins", list.name));
    }
    for plugin in &list.plugins {
        if plugin.plugin_type.is_empty() {
            return Err("plugin without a type".to_string());
        }
        if !bin_dir.join(&plugin.plugin_type).is_file() {
            return Err(format!(
                "plugin binary {} not found in {}",
                plugin.plugin_type,
                bin_dir.display()
            ));
        }
    }
    Ok(list)
}

impl RenderNode for CniStatus {
    fn render_node(&self) -> ReportNode {
        let (Some(network), None) = (&self.network, &self.error) else {
            return ReportNode::incomplete(
                "CNI",
                self.error.as_deref().unwrap_or("no CNI configuration"),
            );
        };

        let plugins = network
            .plugins
            .iter()
            .map(|plugin| {
                ReportNode::new(plugin.name.clone().unwrap_or_else(|| network.name.clone()), "")
                    .with_detail("version", json!(plugin.cni_version))
                    .with_detail("type", json!(plugin.plugin_type))
                    .with_detail("capabilities", json!(plugin.capabilities))
                    .with_detail("ipam", json!(plugin.ipam))
                    .with_detail("dns", json!(plugin.dns))
            })
            .collect();

        let mut network_node = ReportNode::new(network.name.clone(), COMPLETE)
            .with_detail("cniVersion", json!(network.cni_version))
            .with_detail("disableCheck", json!(network.disable_check))
            .with_children(plugins);
        if let Some(file) = &self.conf_file {
            network_node = network_node.with_meta("confFile", file.display().to_string());
        }

        ReportNode::new("CNI", COMPLETE).with_children(vec![network_node])
    }
}
