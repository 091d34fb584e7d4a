use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::{Value, json};

use super::{
    Adopter, PodNode, Workload, entity_node, labels_detail, node_selector_detail, render_adopted,
};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, to_detail};

/// A stateful set and the pods it controls
#[derive(Debug, Clone)]
pub struct StatefulSetNode {
    pub stateful_set: StatefulSet,
    pub pods: BTreeMap<String, PodNode>,
}

impl StatefulSetNode {
    pub fn new(stateful_set: StatefulSet) -> Self {
        Self {
            stateful_set,
            pods: BTreeMap::new(),
        }
    }

    pub fn status_message(&self) -> String {
        let desired = self
            .stateful_set
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(1);
        let status = self.stateful_set.status.as_ref();
        format!(
            "Desired: {}, Current: {}, Ready: {}, Up-to-date: {}",
            desired,
            status.and_then(|s| s.current_replicas).unwrap_or(0),
            status.and_then(|s| s.ready_replicas).unwrap_or(0),
            status.and_then(|s| s.updated_replicas).unwrap_or(0),
        )
    }
}

impl From<StatefulSet> for StatefulSetNode {
    fn from(stateful_set: StatefulSet) -> Self {
        Self::new(stateful_set)
    }
}

impl Workload for StatefulSetNode {
    const KIND: ResourceKind = ResourceKind::StatefulSet;

    fn metadata(&self) -> &ObjectMeta {
        &self.stateful_set.metadata
    }
}

impl Adopter for StatefulSetNode {
    type Child = PodNode;

    fn adopted(&self) -> &BTreeMap<String, PodNode> {
        &self.pods
    }

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, PodNode> {
        &mut self.pods
    }
}

impl RenderNode for StatefulSetNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.stateful_set.spec.as_ref();
        // serviceName changed optionality across API versions; read it from the wire form
        let service_name = to_detail(&spec)
            .get("serviceName")
            .cloned()
            .unwrap_or(Value::Null);

        entity_node("StatefulSet", self.metadata(), self.status_message())
            .with_detail("status", to_detail(&self.stateful_set.status))
            .with_detail("replicas", json!(spec.and_then(|s| s.replicas)))
            .with_detail("serviceName", service_name)
            .with_detail(
                "podManagementPolicy",
                json!(spec.and_then(|s| s.pod_management_policy.as_ref())),
            )
            .with_detail(
                "updateStrategy",
                to_detail(&spec.and_then(|s| s.update_strategy.as_ref())),
            )
            .with_optional_detail("selector", spec.map(|s| to_detail(&s.selector)))
            .with_optional_detail("nodeSelector", node_selector_detail(spec.map(|s| &s.template)))
            .with_optional_detail("labels", labels_detail(self.metadata()))
            .with_children(render_adopted(&self.pods))
    }
}
