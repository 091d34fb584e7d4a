use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ReplicationController;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::json;

use super::{
    Adopter, PodNode, Workload, entity_node, labels_detail, node_selector_detail, render_adopted,
};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, to_detail};

/// A replication controller and the pods it controls
#[derive(Debug, Clone)]
pub struct ReplicationControllerNode {
    pub controller: ReplicationController,
    pub pods: BTreeMap<String, PodNode>,
}

impl ReplicationControllerNode {
    pub fn new(controller: ReplicationController) -> Self {
        Self {
            controller,
            pods: BTreeMap::new(),
        }
    }

    pub fn status_message(&self) -> String {
        let desired = self
            .controller
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(1);
        let status = self.controller.status.as_ref();
        format!(
            "Desired: {}, Current: {}, Ready: {}, Available: {}",
            desired,
            status.map(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.ready_replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }
}

impl From<ReplicationController> for ReplicationControllerNode {
    fn from(controller: ReplicationController) -> Self {
        Self::new(controller)
    }
}

impl Workload for ReplicationControllerNode {
    const KIND: ResourceKind = ResourceKind::ReplicationController;

    fn metadata(&self) -> &ObjectMeta {
        &self.controller.metadata
    }
}

impl Adopter for ReplicationControllerNode {
    type Child = PodNode;

    fn adopted(&self) -> &BTreeMap<String, PodNode> {
        &self.pods
    }

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, PodNode> {
        &mut self.pods
    }
}

impl RenderNode for ReplicationControllerNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.controller.spec.as_ref();

        entity_node("ReplicationController", self.metadata(), self.status_message())
            .with_detail("status", to_detail(&self.controller.status))
            .with_detail("replicas", json!(spec.and_then(|s| s.replicas)))
            .with_detail("minReadySeconds", json!(spec.and_then(|s| s.min_ready_seconds)))
            .with_optional_detail(
                "selector",
                spec.and_then(|s| s.selector.as_ref()).map(to_detail),
            )
            .with_optional_detail(
                "nodeSelector",
                node_selector_detail(spec.and_then(|s| s.template.as_ref())),
            )
            .with_optional_detail("labels", labels_detail(self.metadata()))
            .with_children(render_adopted(&self.pods))
    }
}
