use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::json;

use super::{
    Adopter, ReplicaSetNode, Workload, entity_node, labels_detail, node_selector_detail,
    render_adopted,
};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, to_detail};

/// A deployment and the replica sets it controls
#[derive(Debug, Clone)]
pub struct DeploymentNode {
    pub deployment: Deployment,
    pub replica_sets: BTreeMap<String, ReplicaSetNode>,
}

impl DeploymentNode {
    pub fn new(deployment: Deployment) -> Self {
        Self {
            deployment,
            replica_sets: BTreeMap::new(),
        }
    }

    pub fn status_message(&self) -> String {
        let desired = self
            .deployment
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(1);
        let status = self.deployment.status.as_ref();
        format!(
            "Desired: {}, Up-to-date: {}, Total: {}, Available: {}",
            desired,
            status.and_then(|s| s.updated_replicas).unwrap_or(0),
            status.and_then(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }
}

impl From<Deployment> for DeploymentNode {
    fn from(deployment: Deployment) -> Self {
        Self::new(deployment)
    }
}

impl Workload for DeploymentNode {
    const KIND: ResourceKind = ResourceKind::Deployment;

    fn metadata(&self) -> &ObjectMeta {
        &self.deployment.metadata
    }
}

impl Adopter for DeploymentNode {
    type Child = ReplicaSetNode;

    fn adopted(&self) -> &BTreeMap<String, ReplicaSetNode> {
        &self.replica_sets
    }

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, ReplicaSetNode> {
        &mut self.replica_sets
    }
}

impl RenderNode for DeploymentNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.deployment.spec.as_ref();

        entity_node("Deployment", self.metadata(), self.status_message())
            .with_detail("status", to_detail(&self.deployment.status))
            .with_detail("deploymentStrategy", to_detail(&spec.and_then(|s| s.strategy.as_ref())))
            .with_detail("minReadySeconds", json!(spec.and_then(|s| s.min_ready_seconds)))
            .with_detail("paused", json!(spec.and_then(|s| s.paused)))
            .with_optional_detail("replicas", spec.and_then(|s| s.replicas).map(|r| json!(r)))
            .with_optional_detail(
                "progressDeadlineSeconds",
                spec.and_then(|s| s.progress_deadline_seconds).map(|p| json!(p)),
            )
            .with_optional_detail(
                "revisionHistoryLimit",
                spec.and_then(|s| s.revision_history_limit).map(|r| json!(r)),
            )
            .with_optional_detail("selector", spec.map(|s| to_detail(&s.selector)))
            .with_optional_detail("nodeSelector", node_selector_detail(spec.map(|s| &s.template)))
            .with_optional_detail("labels", labels_detail(self.metadata()))
            .with_children(render_adopted(&self.replica_sets))
    }
}
