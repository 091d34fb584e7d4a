//! Namespace label check
//!
//! Passes a namespace when it carries every required label key.

use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use serde::Deserialize;
use serde_json::Value;

use super::{Check, CheckError};
use crate::config::CheckConfig;
use crate::kube::ClusterApi;
use crate::report::{FAILED, PASSED, ReportNode};

/// Registry kind for [`NamespaceLabelsCheck`]
pub const NAMESPACE_LABELS_KIND: &str = "namespace-labels";

/// Settings read from the check's `spec`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceLabelsSpec {
    /// Label keys every namespace must carry
    pub required_labels: Vec<String>,

    /// Namespaces to inspect; empty means all
    #[serde(default)]
    pub namespaces: Vec<String>,
}

pub struct NamespaceLabelsCheck {
    name: String,
    spec: NamespaceLabelsSpec,
    api: Arc<dyn ClusterApi>,
}

impl NamespaceLabelsCheck {
    pub fn new(name: impl Into<String>, spec: NamespaceLabelsSpec, api: Arc<dyn ClusterApi>) -> Self {
        Self {
            name: name.into(),
            spec,
            api,
        }
    }

    /// Build from configuration, rejecting a spec without labels
    pub fn from_config(api: Arc<dyn ClusterApi>, config: &CheckConfig) -> Result<Self, CheckError> {
        let spec: NamespaceLabelsSpec = serde_yaml::from_value(config.spec.clone()).map_err(|e| {
            CheckError::InvalidSpec {
                name: config.name.clone(),
                message: e.to_string(),
            }
        })?;

        if spec.required_labels.is_empty() {
            return Err(CheckError::InvalidSpec {
                name: config.name.clone(),
                message: "requiredLabels must not be empty".to_string(),
            });
        }

        Ok(Self::new(config.name.clone(), spec, api))
    }
}

#[async_trait]
impl Check for NamespaceLabelsCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<ReportNode, CheckError> {
        let namespaces = self.api.list_namespaces().await?;

        let mut root = ReportNode::new(self.name.clone(), PASSED);
        for namespace in &namespaces {
            let name = namespace.name_any();
            if !self.spec.namespaces.is_empty() && !self.spec.namespaces.contains(&name) {
                continue;
            }

            let labels = namespace.labels();
            let missing: Vec<Value> = self
                .spec
                .required_labels
                .iter()
                .filter(|key| !labels.contains_key(key.as_str()))
                .map(|key| Value::String(key.clone()))
                .collect();

            let node = if missing.is_empty() {
                ReportNode::new(name, PASSED)
            } else {
                ReportNode::new(name, FAILED).with_detail("missingLabels", Value::Array(missing))
            };
            root.push_child(node.with_meta("kind", "Namespace"));
        }

        root.sort_children();
        Ok(root)
    }
}
