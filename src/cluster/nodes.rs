use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde_json::{Value, json};

use crate::kube::FetchResult;
use crate::report::{COMPLETE, RenderNode, ReportNode, UNKNOWN, to_detail};

/// The cluster's node list
#[derive(Debug, Clone, Default)]
pub struct NodeInventory {
    pub nodes: Vec<Node>,
    pub error: Option<String>,
}

impl NodeInventory {
    pub fn from_listing(listing: &FetchResult<Vec<Node>>) -> Self {
        match listing {
            Ok(nodes) => {
                let mut nodes = nodes.clone();
                nodes.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
                Self { nodes, error: None }
            }
            Err(e) => Self {
                nodes: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

/// True condition types, then "SchedulingDisabled" when cordoned
pub fn node_status(node: &Node) -> String {
    let mut status: Vec<&str> = node
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .into_iter()
        .flatten()
        .filter(|c| c.status == "True")
        .map(|c| c.type_.as_str())
        .collect();

    if status.is_empty() {
        status.push(UNKNOWN);
    }
    if is_unschedulable(node) {
        status.push("SchedulingDisabled");
    }
    status.join(",")
}

fn is_unschedulable(node: &Node) -> bool {
    node.spec
        .as_ref()
        .and_then(|s| s.unschedulable)
        .unwrap_or(false)
}

fn resource_list(list: Option<&BTreeMap<String, Quantity>>) -> Value {
    Value::Object(
        list.into_iter()
            .flatten()
            .map(|(resource, quantity)| (resource.clone(), Value::String(quantity.0.clone())))
            .collect(),
    )
}

fn render_node_entry(node: &Node) -> ReportNode {
    let spec = node.spec.as_ref();
    let status = node.status.as_ref();

    ReportNode::new(node.metadata.name.clone().unwrap_or_default(), node_status(node))
        .with_detail("conditions", to_detail(&status.and_then(|s| s.conditions.as_ref())))
        .with_detail("images", to_detail(&status.and_then(|s| s.images.as_ref())))
        .with_detail(
            "resources",
            json!({
                "allocatable": resource_list(status.and_then(|s| s.allocatable.as_ref())),
                "capacity": resource_list(status.and_then(|s| s.capacity.as_ref())),
            }),
        )
        .with_detail("addresses", to_detail(&status.and_then(|s| s.addresses.as_ref())))
        .with_detail("volumesInUse", to_detail(&status.and_then(|s| s.volumes_in_use.as_ref())))
        .with_detail(
            "volumesAttached",
            to_detail(&status.and_then(|s| s.volumes_attached.as_ref())),
        )
        .with_detail("nodeInfo", to_detail(&status.and_then(|s| s.node_info.as_ref())))
        .with_detail("podCIDR", json!(spec.and_then(|s| s.pod_cidr.as_ref())))
        .with_detail("unschedulable", json!(is_unschedulable(node).to_string()))
        .with_optional_detail(
            "podCIDRs",
            spec.and_then(|s| s.pod_cidrs.as_ref())
                .filter(|c| !c.is_empty())
                .map(to_detail),
        )
        .with_optional_detail(
            "providerID",
            spec.and_then(|s| s.provider_id.as_ref())
                .filter(|p| !p.is_empty())
                .map(|p| json!(p)),
        )
        .with_optional_detail(
            "taints",
            spec.and_then(|s| s.taints.as_ref())
                .filter(|t| !t.is_empty())
                .map(to_detail),
        )
        .with_optional_detail(
            "labels",
            node.metadata
                .labels
                .as_ref()
                .filter(|l| !l.is_empty())
                .map(to_detail),
        )
}

impl RenderNode for NodeInventory {
    fn render_node(&self) -> ReportNode {
        match &self.error {
            Some(error) => ReportNode::incomplete("Nodes", error),
            None => ReportNode::new("Nodes", COMPLETE)
                .with_children(self.nodes.iter().map(render_node_entry).collect()),
        }
    }
}
