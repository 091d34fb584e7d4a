//! Workload forest
//!
//! A `WorkloadTree` holds one namespace's workload collections, keyed by
//! name. After resolution each collection exposes only its root entities:
//! objects without a controller and orphans whose controller could not be
//! matched. Adopted objects live only inside their parent.

pub mod resolver;

pub use resolver::{ResolutionSummary, resolve};

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};

use crate::kube::{ClusterApi, FetchError, FetchResult};
use crate::models::ResourceKind;
use crate::report::{COMPLETE, RenderNode, ReportNode};
use crate::resources::{
    CronJobNode, DaemonSetNode, DeploymentNode, JobNode, PodNode, ReplicaSetNode,
    ReplicationControllerNode, StatefulSetNode, Workload,
};

/// Workload collections of a single namespace
#[derive(Debug, Clone, Default)]
pub struct WorkloadTree {
    pub namespace: String,
    pub deployments: BTreeMap<String, DeploymentNode>,
    pub replica_sets: BTreeMap<String, ReplicaSetNode>,
    pub replication_controllers: BTreeMap<String, ReplicationControllerNode>,
    pub stateful_sets: BTreeMap<String, StatefulSetNode>,
    pub daemon_sets: BTreeMap<String, DaemonSetNode>,
    pub cron_jobs: BTreeMap<String, CronJobNode>,
    pub jobs: BTreeMap<String, JobNode>,
    pub pods: BTreeMap<String, PodNode>,
    /// Listings that failed, by kind
    pub errors: BTreeMap<ResourceKind, String>,
}

impl WorkloadTree {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Fetch all workload kinds of a namespace and resolve ownership
    ///
    /// The eight listings run concurrently and all complete before the
    /// resolver runs. A failed listing leaves its collection empty and is
    /// recorded in `errors`; siblings are unaffected.
    pub async fn populate<A: ClusterApi + ?Sized>(
        api: &A,
        namespace: &str,
    ) -> (Self, ResolutionSummary) {
        let (
            deployments,
            replica_sets,
            replication_controllers,
            stateful_sets,
            daemon_sets,
            cron_jobs,
            jobs,
            pods,
        ) = tokio::join!(
            api.list_deployments(namespace),
            api.list_replica_sets(namespace),
            api.list_replication_controllers(namespace),
            api.list_stateful_sets(namespace),
            api.list_daemon_sets(namespace),
            api.list_cron_jobs(namespace),
            api.list_jobs(namespace),
            api.list_pods(namespace),
        );

        let mut tree = Self::new(namespace);
        tree.deployments = tree.index(deployments);
        tree.replica_sets = tree.index(replica_sets);
        tree.replication_controllers = tree.index(replication_controllers);
        tree.stateful_sets = tree.index(stateful_sets);
        tree.daemon_sets = tree.index(daemon_sets);
        tree.cron_jobs = tree.index(cron_jobs);
        tree.jobs = tree.index(jobs);
        tree.pods = tree.index(pods);

        let summary = resolve(&mut tree);
        tracing::debug!(
            "Namespace {}: adopted {} workload(s), {} orphan(s)",
            namespace,
            summary.adopted,
            summary.orphans.len()
        );
        (tree, summary)
    }

    /// Key a listing by name, recording a failure instead
    fn index<T, N>(&mut self, listing: FetchResult<Vec<T>>) -> BTreeMap<String, N>
    where
        N: Workload + From<T>,
    {
        match listing {
            Ok(items) => index_by_name(items),
            Err(e) => {
                self.record_error(&e);
                BTreeMap::new()
            }
        }
    }

    /// Record a failed listing for one kind
    pub fn record_error(&mut self, error: &FetchError) {
        tracing::warn!("Could not list workloads in {}: {}", self.namespace, error);
        self.errors.insert(error.kind(), error.to_string());
    }

    /// Number of root entities of a kind
    pub fn root_count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Deployment => self.deployments.len(),
            ResourceKind::ReplicaSet => self.replica_sets.len(),
            ResourceKind::ReplicationController => self.replication_controllers.len(),
            ResourceKind::StatefulSet => self.stateful_sets.len(),
            ResourceKind::DaemonSet => self.daemon_sets.len(),
            ResourceKind::CronJob => self.cron_jobs.len(),
            ResourceKind::Job => self.jobs.len(),
            ResourceKind::Pod => self.pods.len(),
            _ => 0,
        }
    }

    fn render_roots(&self, kind: ResourceKind) -> Vec<ReportNode> {
        match kind {
            ResourceKind::Deployment => render_all(&self.deployments),
            ResourceKind::ReplicaSet => render_all(&self.replica_sets),
            ResourceKind::ReplicationController => render_all(&self.replication_controllers),
            ResourceKind::StatefulSet => render_all(&self.stateful_sets),
            ResourceKind::DaemonSet => render_all(&self.daemon_sets),
            ResourceKind::CronJob => render_all(&self.cron_jobs),
            ResourceKind::Job => render_all(&self.jobs),
            ResourceKind::Pod => render_all(&self.pods),
            _ => Vec::new(),
        }
    }
}

/// Key objects by name; on duplicate names the first listed wins
pub fn index_by_name<T, N>(items: Vec<T>) -> BTreeMap<String, N>
where
    N: Workload + From<T>,
{
    let mut map = BTreeMap::new();
    for item in items {
        let node = N::from(item);
        let name = node.name().to_string();
        if map.contains_key(&name) {
            tracing::warn!("Ignoring duplicate {} named {}", N::KIND, name);
            continue;
        }
        map.insert(name, node);
    }
    map
}

fn render_all<N: RenderNode>(map: &BTreeMap<String, N>) -> Vec<ReportNode> {
    map.values().map(RenderNode::render_node).collect()
}

impl RenderNode for WorkloadTree {
    fn render_node(&self) -> ReportNode {
        let mut node = ReportNode::new(self.namespace.clone(), COMPLETE).with_meta("kind", "Namespace");

        for kind in ResourceKind::workloads() {
            if let Some(error) = self.errors.get(kind) {
                node.push_child(ReportNode::incomplete(kind.group_label(), error));
            } else if self.root_count(*kind) > 0 {
                node.push_child(
                    ReportNode::new(kind.group_label(), COMPLETE).with_children(self.render_roots(*kind)),
                );
            }
        }

        node
    }
}

/// Workload trees of every namespace in a run
#[derive(Debug, Clone, Default)]
pub struct NamespacedWorkloads {
    pub trees: BTreeMap<String, WorkloadTree>,
    /// Set when the namespace listing itself failed
    pub error: Option<String>,
}

impl NamespacedWorkloads {
    /// Populate trees for the given namespaces with bounded concurrency
    pub async fn populate<A: ClusterApi + ?Sized>(
        api: &A,
        namespaces: &[String],
        concurrency: usize,
    ) -> (Self, ResolutionSummary) {
        let results: Vec<(WorkloadTree, ResolutionSummary)> = stream::iter(namespaces)
            .map(|namespace| WorkloadTree::populate(api, namespace))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut workloads = Self::default();
        let mut total = ResolutionSummary::default();
        for (tree, summary) in results {
            total.merge(summary);
            workloads.trees.insert(tree.namespace.clone(), tree);
        }
        (workloads, total)
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

impl RenderNode for NamespacedWorkloads {
    fn render_node(&self) -> ReportNode {
        let name = "Namespaced Workloads";
        match &self.error {
            Some(error) => ReportNode::incomplete(name, error),
            None => ReportNode::new(name, COMPLETE).with_children(render_all(&self.trees)),
        }
    }
}
