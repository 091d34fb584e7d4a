use k8s_openapi::api::core::v1::{Node, Pod};
use serde_json::json;

use crate::kube::{ClusterApi, FetchResult};
use crate::report::{COMPLETE, RenderNode, ReportNode};

const CONTROL_PLANE_LABELS: [&str; 2] = [
    "node-role.kubernetes.io/master",
    "node-role.kubernetes.io/control-plane",
];

const AUDIT_FLAGS: [&str; 2] = ["audit-log-path", "audit-webhook-config-file"];

/// Facts about the control plane derived from nodes and apiserver pods
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPlane {
    pub provider: Option<String>,
    pub num_nodes: usize,
    pub is_ha: bool,
    pub audit_log_enabled: bool,
    pub error: Option<String>,
}

impl ControlPlane {
    /// Inspect the control plane; apiserver pods are only listed if nodes were
    pub async fn inspect<A: ClusterApi + ?Sized>(api: &A, nodes: &FetchResult<Vec<Node>>) -> Self {
        match nodes {
            Ok(nodes) => {
                let audit_log_enabled = audit_logging_enabled(api).await;
                Self::from_nodes(nodes, audit_log_enabled)
            }
            Err(e) => Self {
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn from_nodes(nodes: &[Node], audit_log_enabled: bool) -> Self {
        let num_nodes = nodes.iter().filter(|n| is_control_plane(n)).count();
        Self {
            provider: nodes.first().and_then(provider_of),
            num_nodes,
            is_ha: num_nodes > 1,
            audit_log_enabled,
            error: None,
        }
    }
}

fn is_control_plane(node: &Node) -> bool {
    node.metadata
        .labels
        .as_ref()
        .is_some_and(|labels| CONTROL_PLANE_LABELS.iter().any(|l| labels.contains_key(*l)))
}

/// Cloud provider named by a node's provider ID
pub fn provider_of(node: &Node) -> Option<String> {
    let id = node.spec.as_ref()?.provider_id.as_deref()?;
    let provider = if id.contains("aws://") {
        "AWS"
    } else if id.contains("gce://") {
        "GKE"
    } else if id.contains("azure://") {
        "Azure"
    } else {
        return None;
    };
    Some(provider.to_string())
}

/// Whether any kube-apiserver pod runs with an audit backend configured
async fn audit_logging_enabled<A: ClusterApi + ?Sized>(api: &A) -> bool {
    match api
        .list_pods_with_labels("kube-system", "component=kube-apiserver")
        .await
    {
        Ok(pods) => pods.iter().any(has_audit_flag),
        Err(e) => {
            tracing::debug!("Could not list kube-apiserver pods: {}", e);
            false
        }
    }
}

fn has_audit_flag(pod: &Pod) -> bool {
    pod.spec
        .iter()
        .flat_map(|spec| spec.containers.iter())
        .flat_map(|c| c.command.iter().flatten().chain(c.args.iter().flatten()))
        .any(|param| AUDIT_FLAGS.iter().any(|flag| param.contains(flag)))
}

impl RenderNode for ControlPlane {
    fn render_node(&self) -> ReportNode {
        if let Some(error) = &self.error {
            return ReportNode::incomplete("Control Plane", error);
        }
        ReportNode::new("Control Plane", COMPLETE)
            .with_detail("auditLogEnabled", json!(self.audit_log_enabled))
            .with_detail("isHA", json!(self.is_ha))
            .with_detail("numNodes", json!(self.num_nodes))
            .with_optional_detail("provider", self.provider.as_ref().map(|p| json!(p)))
    }
}
