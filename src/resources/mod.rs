//! Inventory entities
//!
//! Each wrapper owns the immutable API object it was listed as, plus the
//! map of children adopted during ownership resolution. Every entity knows
//! how to render itself as a report node.

mod cron_job;
mod daemon_set;
mod deployment;
mod job;
mod namespace;
mod pod;
mod replica_set;
mod replication_controller;
mod stateful_set;

pub use cron_job::CronJobNode;
pub use daemon_set::DaemonSetNode;
pub use deployment::DeploymentNode;
pub use job::JobNode;
pub use namespace::NamespaceNode;
pub use pod::PodNode;
pub use replica_set::ReplicaSetNode;
pub use replication_controller::ReplicationControllerNode;
pub use stateful_set::StatefulSetNode;

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::Value;

use crate::models::{OwnerLink, ResourceKind, ResourceRef, controller_of};
use crate::report::{RenderNode, ReportNode, to_detail};

/// A listed workload object
pub trait Workload: RenderNode {
    const KIND: ResourceKind;

    fn metadata(&self) -> &ObjectMeta;

    fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    fn uid(&self) -> Option<&str> {
        self.metadata().uid.as_deref()
    }

    /// Authoritative controller owner reference, if declared
    fn controller(&self) -> Option<OwnerLink> {
        controller_of(self.metadata())
    }

    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::from_meta(Self::KIND.as_str(), self.metadata())
    }
}

/// A workload that takes ownership of children of one kind
pub trait Adopter: Workload {
    type Child: Workload;

    fn adopted(&self) -> &BTreeMap<String, Self::Child>;

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, Self::Child>;
}

/// Start an entity node with the common `kind` and `uid` metadata
pub(crate) fn entity_node(kind: &str, meta: &ObjectMeta, status: impl Into<String>) -> ReportNode {
    let node = ReportNode::new(meta.name.clone().unwrap_or_default(), status).with_meta("kind", kind);
    match meta.uid.as_deref() {
        Some(uid) if !uid.is_empty() => node.with_meta("uid", uid),
        _ => node,
    }
}

/// Labels as a detail, omitted when there are none
pub(crate) fn labels_detail(meta: &ObjectMeta) -> Option<Value> {
    meta.labels
        .as_ref()
        .filter(|labels| !labels.is_empty())
        .map(to_detail)
}

/// Node selector of a pod template, if set
pub(crate) fn node_selector_detail(template: Option<&PodTemplateSpec>) -> Option<Value> {
    template
        .and_then(|template| template.spec.as_ref())
        .and_then(|spec| spec.node_selector.as_ref())
        .map(to_detail)
}

/// Render adopted children; map order gives name order
pub(crate) fn render_adopted<C: RenderNode>(children: &BTreeMap<String, C>) -> Vec<ReportNode> {
    children.values().map(RenderNode::render_node).collect()
}
