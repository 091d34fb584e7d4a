//! Inventory orchestration
//!
//! Gathers cluster components, namespace policy objects, workload trees and
//! optional check results into one report.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use tracing::{info, warn};

use crate::checks::{CheckError, CheckRunner};
use crate::cluster::ClusterComponents;
use crate::config::{ClusterConfig, Config};
use crate::kube::ClusterApi;
use crate::report::{COMPLETE, RenderNode, ReportNode};
use crate::resources::NamespaceNode;
use crate::workloads::{NamespacedWorkloads, ResolutionSummary};

/// Name of the root report node
pub const INVENTORY_REPORT: &str = "Cluster Inventory";
/// Name of the checks report node
pub const CHECKS_REPORT: &str = "Checks";

/// Settings for one collection run
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Namespaces to include; empty means all
    pub namespaces: Vec<String>,
    pub exclude_namespaces: Vec<String>,
    /// Maximum namespaces processed at once
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub cluster: ClusterConfig,
}

impl CollectorOptions {
    fn selects(&self, namespace: &str) -> bool {
        let included =
            self.namespaces.is_empty() || self.namespaces.iter().any(|ns| ns == namespace);
        included && !self.exclude_namespaces.iter().any(|ns| ns == namespace)
    }
}

impl From<&Config> for CollectorOptions {
    fn from(config: &Config) -> Self {
        Self {
            namespaces: config.namespaces.clone(),
            exclude_namespaces: config.exclude_namespaces.clone(),
            concurrency: config.collector.concurrency,
            request_timeout: config.request_timeout(),
            cluster: config.cluster.clone(),
        }
    }
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Everything gathered in one run
#[derive(Debug, Clone)]
pub struct Inventory {
    pub components: ClusterComponents,
    pub namespaces: Vec<NamespaceNode>,
    /// Set when the namespace listing failed
    pub namespaces_error: Option<String>,
    pub workloads: NamespacedWorkloads,
    pub checks: Option<ReportNode>,
    pub summary: ResolutionSummary,
}

impl RenderNode for Inventory {
    fn render_node(&self) -> ReportNode {
        let namespaces = match &self.namespaces_error {
            Some(error) => ReportNode::incomplete("Namespaces", error),
            None => {
                let mut node = ReportNode::new("Namespaces", COMPLETE)
                    .with_children(self.namespaces.iter().map(|ns| ns.render_node()).collect());
                node.sort_children();
                node
            }
        };

        let mut root = ReportNode::new(INVENTORY_REPORT, COMPLETE).with_children(vec![
            self.components.render_node(),
            namespaces,
            self.workloads.render_node(),
        ]);
        if let Some(checks) = &self.checks {
            root.push_child(checks.clone());
        }
        root
    }
}

/// Result of the namespace-scoped half of a run
struct NamespaceScan {
    namespaces: Vec<NamespaceNode>,
    error: Option<String>,
    workloads: NamespacedWorkloads,
    summary: ResolutionSummary,
}

/// Runs a full inventory against a cluster
pub struct Collector {
    api: Arc<dyn ClusterApi>,
    options: CollectorOptions,
    checks: Option<CheckRunner>,
}

impl Collector {
    pub fn new(api: Arc<dyn ClusterApi>, options: CollectorOptions) -> Self {
        Self {
            api,
            options,
            checks: None,
        }
    }

    /// Run these checks alongside the inventory
    pub fn with_checks(mut self, runner: CheckRunner) -> Self {
        self.checks = Some(runner);
        self
    }

    /// Gather the inventory
    ///
    /// Listing failures become incomplete sections; the only error is a
    /// check runner with nothing to run.
    pub async fn run(&self) -> Result<Inventory, CheckError> {
        info!("Collecting inventory");

        let (components, scan, checks) = tokio::join!(
            ClusterComponents::collect(
                self.api.as_ref(),
                &self.options.cluster,
                self.options.request_timeout,
            ),
            self.scan_namespaces(),
            self.run_checks(),
        );
        let checks = checks?;

        info!(
            "Inventory complete: {} namespaces, {} adopted, {} orphans",
            scan.workloads.trees.len(),
            scan.summary.adopted,
            scan.summary.orphans.len()
        );

        Ok(Inventory {
            components,
            namespaces: scan.namespaces,
            namespaces_error: scan.error,
            workloads: scan.workloads,
            checks,
            summary: scan.summary,
        })
    }

    async fn scan_namespaces(&self) -> NamespaceScan {
        let listed = match self.api.list_namespaces().await {
            Ok(listed) => listed,
            Err(e) => {
                warn!("Could not list namespaces: {}", e);
                return NamespaceScan {
                    namespaces: Vec::new(),
                    error: Some(e.to_string()),
                    workloads: NamespacedWorkloads::failed(&e),
                    summary: ResolutionSummary::default(),
                };
            }
        };

        let selected: Vec<Namespace> = listed
            .into_iter()
            .filter(|ns| self.options.selects(&ns.name_any()))
            .collect();
        let names: Vec<String> = selected.iter().map(|ns| ns.name_any()).collect();
        info!("Scanning {} namespaces", names.len());

        let api = self.api.as_ref();
        let (mut namespaces, (workloads, summary)) = tokio::join!(
            stream::iter(selected)
                .map(|ns| NamespaceNode::collect(api, ns))
                .buffer_unordered(self.options.concurrency.max(1))
                .collect::<Vec<_>>(),
            NamespacedWorkloads::populate(api, &names, self.options.concurrency),
        );
        namespaces.sort_by(|a, b| a.name().cmp(b.name()));

        NamespaceScan {
            namespaces,
            error: None,
            workloads,
            summary,
        }
    }

    async fn run_checks(&self) -> Result<Option<ReportNode>, CheckError> {
        match &self.checks {
            Some(runner) => runner.run(CHECKS_REPORT).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kube::FetchError;
    use crate::kube::fetch::MockClusterApi;
    use crate::models::ResourceKind;
    use crate::report::INCOMPLETE;
    use k8s_openapi::api::apps::v1::Deployment;
    use crate::resources::testing::meta;

    fn namespace(name: &str) -> Namespace {
        Namespace {
            metadata: meta(name, &format!("{}-uid", name)),
            ..Default::default()
        }
    }

    fn deployment(name: &str) -> Deployment {
        Deployment {
            metadata: meta(name, &format!("{}-uid", name)),
            ..Default::default()
        }
    }

    fn offline_options() -> CollectorOptions {
        CollectorOptions {
            cluster: ClusterConfig {
                cni_conf_dir: "/nonexistent/cni/net.d".into(),
                cni_bin_dir: "/nonexistent/cni/bin".into(),
                dns_probe_host: "localhost".to_string(),
            },
            ..Default::default()
        }
    }

    /// Mock cluster with one namespace whose Jobs listing fails
    fn mock_with_failing_jobs() -> MockClusterApi {
        let mut mock = MockClusterApi::new();
        mock.expect_list_nodes().returning(|| Ok(Vec::new()));
        mock.expect_list_pods_with_labels()
            .returning(|_, _| Ok(Vec::new()));
        mock.expect_list_namespaces()
            .returning(|| Ok(vec![namespace("ns1")]));
        mock.expect_list_limit_ranges().returning(|_| Ok(Vec::new()));
        mock.expect_list_resource_quotas().returning(|_| Ok(Vec::new()));
        mock.expect_list_pod_disruption_budgets()
            .returning(|_| Ok(Vec::new()));
        mock.expect_list_deployments()
            .returning(|_| Ok(vec![deployment("d1")]));
        mock.expect_list_replica_sets().returning(|_| Ok(Vec::new()));
        mock.expect_list_replication_controllers()
            .returning(|_| Ok(Vec::new()));
        mock.expect_list_stateful_sets().returning(|_| Ok(Vec::new()));
        mock.expect_list_daemon_sets().returning(|_| Ok(Vec::new()));
        mock.expect_list_cron_jobs().returning(|_| Ok(Vec::new()));
        mock.expect_list_pods().returning(|_| Ok(Vec::new()));
        mock.expect_list_jobs().returning(|_| {
            Err(FetchError::Other {
                kind: ResourceKind::Job,
                message: "connection reset".to_string(),
            })
        });
        mock
    }

    #[tokio::test]
    async fn test_failed_jobs_listing_marks_only_jobs_incomplete() {
        let collector = Collector::new(Arc::new(mock_with_failing_jobs()), offline_options());
        let report = collector.run().await.unwrap().render_node();

        assert_eq!(report.name, INVENTORY_REPORT);
        let ns1 = report.find(&["Namespaced Workloads", "ns1"]).unwrap();
        assert_eq!(ns1.status, COMPLETE);

        let jobs = ns1.child("Jobs").unwrap();
        assert_eq!(jobs.status, INCOMPLETE);
        assert!(jobs.details.contains_key("error"));

        let deployments = ns1.child("Deployments").unwrap();
        assert_eq!(deployments.status, COMPLETE);
        assert!(deployments.child("d1").is_some());

        assert_eq!(report.find(&["Namespaces"]).unwrap().status, COMPLETE);
        assert!(report.child(CHECKS_REPORT).is_none());
    }

    #[tokio::test]
    async fn test_namespace_listing_failure() {
        let mut mock = MockClusterApi::new();
        mock.expect_list_nodes().returning(|| Ok(Vec::new()));
        mock.expect_list_pods_with_labels()
            .returning(|_, _| Ok(Vec::new()));
        mock.expect_list_namespaces().returning(|| {
            Err(FetchError::Other {
                kind: ResourceKind::Namespace,
                message: "forbidden".to_string(),
            })
        });

        let collector = Collector::new(Arc::new(mock), offline_options());
        let inventory = collector.run().await.unwrap();
        let report = inventory.render_node();

        assert_eq!(report.child("Namespaces").unwrap().status, INCOMPLETE);
        assert_eq!(report.child("Namespaced Workloads").unwrap().status, INCOMPLETE);
        assert_eq!(report.child("Cluster Components").unwrap().status, COMPLETE);
    }

    #[tokio::test]
    async fn test_empty_check_runner_is_fatal() {
        let collector = Collector::new(Arc::new(mock_with_failing_jobs()), offline_options())
            .with_checks(CheckRunner::new(Vec::new(), 1));
        let err = collector.run().await.unwrap_err();
        assert!(matches!(err, CheckError::NoChecksConfigured));
    }

    #[test]
    fn test_options_select_namespaces() {
        let options = CollectorOptions {
            namespaces: vec!["a".to_string(), "b".to_string()],
            exclude_namespaces: vec!["b".to_string()],
            ..Default::default()
        };
        assert!(options.selects("a"));
        assert!(!options.selects("b"));
        assert!(!options.selects("c"));
    }
}
