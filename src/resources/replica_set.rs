use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::json;

use super::{
    Adopter, PodNode, Workload, entity_node, labels_detail, node_selector_detail, render_adopted,
};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, to_detail};

/// A replica set and the pods it controls
#[derive(Debug, Clone)]
pub struct ReplicaSetNode {
    pub replica_set: ReplicaSet,
    pub pods: BTreeMap<String, PodNode>,
}

impl ReplicaSetNode {
    pub fn new(replica_set: ReplicaSet) -> Self {
        Self {
            replica_set,
            pods: BTreeMap::new(),
        }
    }

    pub fn status_message(&self) -> String {
        let desired = self
            .replica_set
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(1);
        let status = self.replica_set.status.as_ref();
        format!(
            "Desired: {}, Current: {}, Ready: {}, Available: {}",
            desired,
            status.map(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.ready_replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }
}

impl From<ReplicaSet> for ReplicaSetNode {
    fn from(replica_set: ReplicaSet) -> Self {
        Self::new(replica_set)
    }
}

impl Workload for ReplicaSetNode {
    const KIND: ResourceKind = ResourceKind::ReplicaSet;

    fn metadata(&self) -> &ObjectMeta {
        &self.replica_set.metadata
    }
}

impl Adopter for ReplicaSetNode {
    type Child = PodNode;

    fn adopted(&self) -> &BTreeMap<String, PodNode> {
        &self.pods
    }

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, PodNode> {
        &mut self.pods
    }
}

impl RenderNode for ReplicaSetNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.replica_set.spec.as_ref();

        entity_node("ReplicaSet", self.metadata(), self.status_message())
            .with_detail("status", to_detail(&self.replica_set.status))
            .with_detail("replicas", json!(spec.and_then(|s| s.replicas)))
            .with_detail("minReadySeconds", json!(spec.and_then(|s| s.min_ready_seconds)))
            .with_optional_detail("selector", spec.map(|s| to_detail(&s.selector)))
            .with_optional_detail(
                "nodeSelector",
                node_selector_detail(spec.and_then(|s| s.template.as_ref())),
            )
            .with_optional_detail("labels", labels_detail(self.metadata()))
            .with_children(render_adopted(&self.pods))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::meta;
    use k8s_openapi::api::apps::v1::{ReplicaSetSpec, ReplicaSetStatus};

    #[test]
    fn test_status_message() {
        let node = ReplicaSetNode::new(ReplicaSet {
            metadata: meta("rs1", "u-rs1"),
            spec: Some(ReplicaSetSpec {
                replicas: Some(2),
                ..Default::default()
            }),
            status: Some(ReplicaSetStatus {
                replicas: 2,
                ready_replicas: Some(1),
                ..Default::default()
            }),
        });
        assert_eq!(
            node.status_message(),
            "Desired: 2, Current: 2, Ready: 1, Available: 0"
        );
        assert_eq!(node.render_node().metadata["uid"], "u-rs1");
    }
}
