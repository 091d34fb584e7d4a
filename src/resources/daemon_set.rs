use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::json;

use super::{
    Adopter, PodNode, Workload, entity_node, labels_detail, node_selector_detail, render_adopted,
};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, to_detail};

/// A daemon set and the pods it controls
#[derive(Debug, Clone)]
pub struct DaemonSetNode {
    pub daemon_set: DaemonSet,
    pub pods: BTreeMap<String, PodNode>,
}

impl DaemonSetNode {
    pub fn new(daemon_set: DaemonSet) -> Self {
        Self {
            daemon_set,
            pods: BTreeMap::new(),
        }
    }

    pub fn status_message(&self) -> String {
        let status = self.daemon_set.status.as_ref();
        format!(
            "Current: {}, Desired: {}, Ready: {}, Up-to-date: {}, Available: {}",
            status.map(|s| s.current_number_scheduled).unwrap_or(0),
            status.map(|s| s.desired_number_scheduled).unwrap_or(0),
            status.map(|s| s.number_ready).unwrap_or(0),
            status.and_then(|s| s.updated_number_scheduled).unwrap_or(0),
            status.and_then(|s| s.number_available).unwrap_or(0),
        )
    }
}

impl From<DaemonSet> for DaemonSetNode {
    fn from(daemon_set: DaemonSet) -> Self {
        Self::new(daemon_set)
    }
}

impl Workload for DaemonSetNode {
    const KIND: ResourceKind = ResourceKind::DaemonSet;

    fn metadata(&self) -> &ObjectMeta {
        &self.daemon_set.metadata
    }
}

impl Adopter for DaemonSetNode {
    type Child = PodNode;

    fn adopted(&self) -> &BTreeMap<String, PodNode> {
        &self.pods
    }

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, PodNode> {
        &mut self.pods
    }
}

impl RenderNode for DaemonSetNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.daemon_set.spec.as_ref();

        entity_node("DaemonSet", self.metadata(), self.status_message())
            .with_detail("status", to_detail(&self.daemon_set.status))
            .with_detail(
                "updateStrategy",
                to_detail(&spec.and_then(|s| s.update_strategy.as_ref())),
            )
            .with_optional_detail(
                "revisionHistoryLimit",
                spec.and_then(|s| s.revision_history_limit).map(|r| json!(r)),
            )
            .with_optional_detail("selector", spec.map(|s| to_detail(&s.selector)))
            .with_optional_detail("nodeSelector", node_selector_detail(spec.map(|s| &s.template)))
            .with_optional_detail("labels", labels_detail(self.metadata()))
            .with_children(render_adopted(&self.pods))
    }
}
