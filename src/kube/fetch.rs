//! Resource fetching
//!
//! `ClusterApi` is the only capability the inventory core needs from a
//! cluster: one flat list call per kind. `KubeClusterApi` implements it on
//! top of `kube::Api`, bounding every call with a timeout. Failures are
//! reported per call and never retried here.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    LimitRange, Namespace, Node, Pod, ReplicationController, ResourceQuota,
};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::Api;
use kube::api::ListParams;
use serde::de::DeserializeOwned;

use crate::models::ResourceKind;

/// Error returned by a single listing
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to list {kind}: {source}")]
    Api {
        kind: ResourceKind,
        #[source]
        source: kube::Error,
    },

    #[error("listing {kind} timed out after {after:?}")]
    Timeout { kind: ResourceKind, after: Duration },

    #[error("failed to list {kind}: {message}")]
    Other { kind: ResourceKind, message: String },
}

impl FetchError {
    /// Kind whose listing failed
    pub fn kind(&self) -> ResourceKind {
        match self {
            FetchError::Api { kind, .. }
            | FetchError::Timeout { kind, .. }
            | FetchError::Other { kind, .. } => *kind,
        }
    }
}

/// Result type for listings
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// List capability over a cluster
///
/// Namespaced listings take the namespace name; cluster-scoped ones take
/// nothing. Implementations must be safe to call concurrently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_namespaces(&self) -> FetchResult<Vec<Namespace>>;

    async fn list_nodes(&self) -> FetchResult<Vec<Node>>;

    async fn list_pods(&self, namespace: &str) -> FetchResult<Vec<Pod>>;

    /// List pods matching a label selector such as `component=kube-apiserver`
    async fn list_pods_with_labels(
        &self,
        namespace: &str,
        selector: &str,
    ) -> FetchResult<Vec<Pod>>;

    async fn list_deployments(&self, namespace: &str) -> FetchResult<Vec<Deployment>>;

    async fn list_replica_sets(&self, namespace: &str) -> FetchResult<Vec<ReplicaSet>>;

    async fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> FetchResult<Vec<ReplicationController>>;

    async fn list_stateful_sets(&self, namespace: &str) -> FetchResult<Vec<StatefulSet>>;

    async fn list_daemon_sets(&self, namespace: &str) -> FetchResult<Vec<DaemonSet>>;

    async fn list_jobs(&self, namespace: &str) -> FetchResult<Vec<Job>>;

    async fn list_cron_jobs(&self, namespace: &str) -> FetchResult<Vec<CronJob>>;

    async fn list_limit_ranges(&self, namespace: &str) -> FetchResult<Vec<LimitRange>>;

    async fn list_resource_quotas(&self, namespace: &str) -> FetchResult<Vec<ResourceQuota>>;

    async fn list_pod_disruption_budgets(
        &self,
        namespace: &str,
    ) -> FetchResult<Vec<PodDisruptionBudget>>;
}

/// `ClusterApi` backed by a live kube client
#[derive(Clone)]
pub struct KubeClusterApi {
    client: kube::Client,
    request_timeout: Duration,
}

impl KubeClusterApi {
    pub fn new(client: kube::Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    async fn list<K>(&self, kind: ResourceKind, api: Api<K>, params: ListParams) -> FetchResult<Vec<K>>
    where
        K: Clone + DeserializeOwned + Debug,
    {
        match tokio::time::timeout(self.request_timeout, api.list(&params)).await {
            Ok(Ok(list)) => {
                tracing::debug!("Listed {} {} object(s)", list.items.len(), kind);
                Ok(list.items)
            }
            Ok(Err(source)) => Err(FetchError::Api { kind, source }),
            Err(_) => Err(FetchError::Timeout {
                kind,
                after: self.request_timeout,
            }),
        }
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn list_namespaces(&self) -> FetchResult<Vec<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        self.list(ResourceKind::Namespace, api, ListParams::default())
            .await
    }

    async fn list_nodes(&self) -> FetchResult<Vec<Node>> {
        let api: Api<Node> = Api::all(self.client.clone());
        self.list(ResourceKind::Node, api, ListParams::default())
            .await
    }

    async fn list_pods(&self, namespace: &str) -> FetchResult<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::Pod, api, ListParams::default()).await
    }

    async fn list_pods_with_labels(
        &self,
        namespace: &str,
        selector: &str,
    ) -> FetchResult<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::Pod, api, ListParams::default().labels(selector))
            .await
    }

    async fn list_deployments(&self, namespace: &str) -> FetchResult<Vec<Deployment>> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::Deployment, api, ListParams::default())
            .await
    }

    async fn list_replica_sets(&self, namespace: &str) -> FetchResult<Vec<ReplicaSet>> {
        let api: Api<ReplicaSet> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::ReplicaSet, api, ListParams::default())
            .await
    }

    async fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> FetchResult<Vec<ReplicationController>> {
        let api: Api<ReplicationController> = Api::namespaced(self.client.clone(), namespace);
        self.list(
            ResourceKind::ReplicationController,
            api,
            ListParams::default(),
        )
        .await
    }

    async fn list_stateful_sets(&self, namespace: &str) -> FetchResult<Vec<StatefulSet>> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::StatefulSet, api, ListParams::default())
            .await
    }

    async fn list_daemon_sets(&self, namespace: &str) -> FetchResult<Vec<DaemonSet>> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::DaemonSet, api, ListParams::default())
            .await
    }

    async fn list_jobs(&self, namespace: &str) -> FetchResult<Vec<Job>> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::Job, api, ListParams::default()).await
    }

    async fn list_cron_jobs(&self, namespace: &str) -> FetchResult<Vec<CronJob>> {
        let api: Api<CronJob> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::CronJob, api, ListParams::default())
            .await
    }

    async fn list_limit_ranges(&self, namespace: &str) -> FetchResult<Vec<LimitRange>> {
        let api: Api<LimitRange> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::LimitRange, api, ListParams::default())
            .await
    }

    async fn list_resource_quotas(&self, namespace: &str) -> FetchResult<Vec<ResourceQuota>> {
        let api: Api<ResourceQuota> = Api::namespaced(self.client.clone(), namespace);
        self.list(ResourceKind::ResourceQuota, api, ListParams::default())
            .await
    }

    async fn list_pod_disruption_budgets(
        &self,
        namespace: &str,
    ) -> FetchResult<Vec<PodDisruptionBudget>> {
        let api: Api<PodDisruptionBudget> = Api::namespaced(self.client.clone(), namespace);
        self.list(
            ResourceKind::PodDisruptionBudget,
            api,
            ListParams::default(),
        )
        .await
    }
}
