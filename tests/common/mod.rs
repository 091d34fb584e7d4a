//! Shared fixtures for integration tests
//!
//! `FakeCluster` is an in-memory `ClusterApi` with per-kind failure
//! injection; the builders below create minimal objects for it.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    LimitRange, Namespace, Node, Pod, ReplicationController, ResourceQuota,
};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::ResourceExt;

use kube_inventory::kube::{ClusterApi, FetchError, FetchResult};
use kube_inventory::models::ResourceKind;

/// In-memory cluster
#[derive(Debug, Clone, Default)]
pub struct FakeCluster {
    pub namespaces: Vec<Namespace>,
    pub nodes: Vec<Node>,
    pub pods: Vec<Pod>,
    pub deployments: Vec<Deployment>,
    pub replica_sets: Vec<ReplicaSet>,
    pub replication_controllers: Vec<ReplicationController>,
    pub stateful_sets: Vec<StatefulSet>,
    pub daemon_sets: Vec<DaemonSet>,
    pub jobs: Vec<Job>,
    pub cron_jobs: Vec<CronJob>,
    pub limit_ranges: Vec<LimitRange>,
    pub resource_quotas: Vec<ResourceQuota>,
    pub disruption_budgets: Vec<PodDisruptionBudget>,
    /// (kind, namespace) pairs whose listing fails; "" for cluster scope
    failures: BTreeSet<(ResourceKind, String)>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make listing `kind` in `namespace` fail
    pub fn fail(mut self, kind: ResourceKind, namespace: &str) -> Self {
        self.failures.insert((kind, namespace.to_string()));
        self
    }

    fn guard(&self, kind: ResourceKind, namespace: &str) -> FetchResult<()> {
        if self.failures.contains(&(kind, namespace.to_string())) {
            return Err(FetchError::Other {
                kind,
                message: format!("injected failure in '{}'", namespace),
            });
        }
        Ok(())
    }

    fn scoped<K>(&self, kind: ResourceKind, namespace: &str, items: &[K]) -> FetchResult<Vec<K>>
    where
        K: ResourceExt + Clone,
    {
        self.guard(kind, namespace)?;
        Ok(items
            .iter()
            .filter(|item| item.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }
}

fn matches_selector(labels: &BTreeMap<String, String>, selector: &str) -> bool {
    selector
        .split(',')
        .filter_map(|term| term.split_once('='))
        .all(|(key, value)| labels.get(key.trim()).map(String::as_str) == Some(value.trim()))
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_namespaces(&self) -> FetchResult<Vec<Namespace>> {
        self.guard(ResourceKind::Namespace, "")?;
        Ok(self.namespaces.clone())
    }

    async fn list_nodes(&self) -> FetchResult<Vec<Node>> {
        self.guard(ResourceKind::Node, "")?;
        Ok(self.nodes.clone())
    }

    async fn list_pods(&self, namespace: &str) -> FetchResult<Vec<Pod>> {
        self.scoped(ResourceKind::Pod, namespace, &self.pods)
    }

    async fn list_pods_with_labels(
        &self,
        namespace: &str,
        selector: &str,
    ) -> FetchResult<Vec<Pod>> {
        let pods = self.scoped(ResourceKind::Pod, namespace, &self.pods)?;
        Ok(pods
            .into_iter()
            .filter(|pod| matches_selector(pod.labels(), selector))
            .collect())
    }

    async fn list_deployments(&self, namespace: &str) -> FetchResult<Vec<Deployment>> {
        self.scoped(ResourceKind::Deployment, namespace, &self.deployments)
    }

    async fn list_replica_sets(&self, namespace: &str) -> FetchResult<Vec<ReplicaSet>> {
        self.scoped(ResourceKind::ReplicaSet, namespace, &self.replica_sets)
    }

    async fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> FetchResult<Vec<ReplicationController>> {
        self.scoped(
            ResourceKind::ReplicationController,
            namespace,
            &self.replication_controllers,
        )
    }

    async fn list_stateful_sets(&self, namespace: &str) -> FetchResult<Vec<StatefulSet>> {
        self.scoped(ResourceKind::StatefulSet, namespace, &self.stateful_sets)
    }

    async fn list_daemon_sets(&self, namespace: &str) -> FetchResult<Vec<DaemonSet>> {
        self.scoped(ResourceKind::DaemonSet, namespace, &self.daemon_sets)
    }

    async fn list_jobs(&self, namespace: &str) -> FetchResult<Vec<Job>> {
        self.scoped(ResourceKind::Job, namespace, &self.jobs)
    }

    async fn list_cron_jobs(&self, namespace: &str) -> FetchResult<Vec<CronJob>> {
        self.scoped(ResourceKind::CronJob, namespace, &self.cron_jobs)
    }

    async fn list_limit_ranges(&self, namespace: &str) -> FetchResult<Vec<LimitRange>> {
        self.scoped(ResourceKind::LimitRange, namespace, &self.limit_ranges)
    }

    async fn list_resource_quotas(&self, namespace: &str) -> FetchResult<Vec<ResourceQuota>> {
        self.scoped(ResourceKind::ResourceQuota, namespace, &self.resource_quotas)
    }

    async fn list_pod_disruption_budgets(
        &self,
        namespace: &str,
    ) -> FetchResult<Vec<PodDisruptionBudget>> {
        self.scoped(
            ResourceKind::PodDisruptionBudget,
            namespace,
            &self.disruption_budgets,
        )
    }
}

/// Metadata of a namespaced object
pub fn meta(namespace: &str, name: &str, uid: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        uid: Some(uid.to_string()),
        ..Default::default()
    }
}

/// Metadata with a controller owner reference
pub fn owned(
    namespace: &str,
    name: &str,
    uid: &str,
    owner_kind: &str,
    owner_name: &str,
    owner_uid: &str,
) -> ObjectMeta {
    ObjectMeta {
        owner_references: Some(vec![OwnerReference {
            api_version: "apps/v1".to_string(),
            kind: owner_kind.to_string(),
            name: owner_name.to_string(),
            uid: owner_uid.to_string(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }]),
        ..meta(namespace, name, uid)
    }
}

pub fn namespace(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            uid: Some(format!("ns-{}", name)),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn deployment(metadata: ObjectMeta) -> Deployment {
    Deployment {
        metadata,
        ..Default::default()
    }
}

pub fn replica_set(metadata: ObjectMeta) -> ReplicaSet {
    ReplicaSet {
        metadata,
        ..Default::default()
    }
}

pub fn pod(metadata: ObjectMeta) -> Pod {
    Pod {
        metadata,
        ..Default::default()
    }
}

pub fn job(metadata: ObjectMeta) -> Job {
    Job {
        metadata,
        ..Default::default()
    }
}

pub fn cron_job(metadata: ObjectMeta) -> CronJob {
    CronJob {
        metadata,
        ..Default::default()
    }
}

pub fn stateful_set(metadata: ObjectMeta) -> StatefulSet {
    StatefulSet {
        metadata,
        ..Default::default()
    }
}

/// Namespace `ns1` with the d1 -> rs1 -> p1 chain and an orphan pod p2
pub fn sample_cluster() -> FakeCluster {
    let mut cluster = FakeCluster::new();
    cluster.namespaces = vec![namespace("ns1")];
    cluster.deployments = vec![deployment(meta("ns1", "d1", "u1"))];
    cluster.replica_sets = vec![replica_set(owned(
        "ns1",
        "rs1",
        "u-rs1",
        "Deployment",
        "d1",
        "u1",
    ))];
    cluster.pods = vec![
        pod(owned("ns1", "p1", "u-p1", "ReplicaSet", "rs1", "u-rs1")),
        pod(owned("ns1", "p2", "u-p2", "ReplicaSet", "rs-gone", "u-old")),
    ];
    cluster
}
