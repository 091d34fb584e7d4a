//! Ownership resolution
//!
//! Two fixed passes over a populated `WorkloadTree`:
//!
//! 1. Pods move under their ReplicaSet, ReplicationController, DaemonSet,
//!    StatefulSet or Job.
//! 2. ReplicaSets move under their Deployment and Jobs under their CronJob,
//!    carrying the pods adopted in the first pass.
//!
//! A child is adopted only when its controller reference matches a parent
//! on both name and UID. Anything else stays at the top level as an orphan.
//! Resolution never fails and never drops an object.

use std::collections::BTreeMap;

use crate::models::{OwnerLink, ResourceKind, ResourceRef};
use crate::resources::{Adopter, PodNode, Workload};

use super::WorkloadTree;

/// Outcome of one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Children moved under a parent
    pub adopted: usize,
    /// Objects declaring a controller that could not be matched
    pub orphans: Vec<ResourceRef>,
}

impl ResolutionSummary {
    pub fn merge(&mut self, other: ResolutionSummary) {
        self.adopted += other.adopted;
        self.orphans.extend(other.orphans);
    }
}

/// Re-parent children in place; see the module docs for the rules
pub fn resolve(tree: &mut WorkloadTree) -> ResolutionSummary {
    let mut summary = ResolutionSummary::default();

    adopt_pods(tree, &mut summary);
    reparent(
        &mut tree.replica_sets,
        ResourceKind::Deployment,
        &mut tree.deployments,
        &mut summary,
    );
    reparent(
        &mut tree.jobs,
        ResourceKind::CronJob,
        &mut tree.cron_jobs,
        &mut summary,
    );

    summary
}

/// Pass A: pods, dispatched by the kind of their controller
fn adopt_pods(tree: &mut WorkloadTree, summary: &mut ResolutionSummary) {
    let pods = std::mem::take(&mut tree.pods);

    for (name, pod) in pods {
        let Some(link) = pod.controller() else {
            tree.pods.insert(name, pod);
            continue;
        };

        let outcome = match ResourceKind::parse_optional(&link.kind) {
            Some(ResourceKind::ReplicaSet) => adopt(&mut tree.replica_sets, &link, pod),
            Some(ResourceKind::ReplicationController) => {
                adopt(&mut tree.replication_controllers, &link, pod)
            }
            Some(ResourceKind::DaemonSet) => adopt(&mut tree.daemon_sets, &link, pod),
            Some(ResourceKind::StatefulSet) => adopt(&mut tree.stateful_sets, &link, pod),
            Some(ResourceKind::Job) => adopt(&mut tree.jobs, &link, pod),
            _ => Err(pod),
        };

        match outcome {
            Ok(()) => summary.adopted += 1,
            Err(pod) => {
                orphaned::<PodNode>(&pod, &link, summary);
                tree.pods.insert(name, pod);
            }
        }
    }
}

/// Pass B: move children of one kind under parents of a single owner kind
fn reparent<P: Adopter>(
    children: &mut BTreeMap<String, P::Child>,
    owner_kind: ResourceKind,
    parents: &mut BTreeMap<String, P>,
    summary: &mut ResolutionSummary,
) {
    let pending = std::mem::take(children);

    for (name, child) in pending {
        let Some(link) = child.controller() else {
            children.insert(name, child);
            continue;
        };

        let outcome = if link.kind == owner_kind.as_str() {
            adopt(parents, &link, child)
        } else {
            Err(child)
        };

        match outcome {
            Ok(()) => summary.adopted += 1,
            Err(child) => {
                orphaned(&child, &link, summary);
                children.insert(name, child);
            }
        }
    }
}

/// Move `child` into the parent named by `link` when the UID matches too
///
/// Hands the child back when there is no such parent or when the parent
/// with that name is a different generation (UID mismatch).
fn adopt<P: Adopter>(
    parents: &mut BTreeMap<String, P>,
    link: &OwnerLink,
    child: P::Child,
) -> Result<(), P::Child> {
    match parents.get_mut(&link.name) {
        Some(parent) if parent.uid() == Some(link.uid.as_str()) => {
            let name = child.name().to_string();
            parent.adopted_mut().insert(name, child);
            Ok(())
        }
        _ => Err(child),
    }
}

fn orphaned<C: Workload>(child: &C, link: &OwnerLink, summary: &mut ResolutionSummary) {
    tracing::debug!(
        "{} {} has unmatched controller {} {} ({})",
        C::KIND,
        child.name(),
        link.kind,
        link.name,
        link.uid
    );
    summary.orphans.push(child.resource_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{meta, owned_meta};
    use crate::resources::{CronJobNode, JobNode, ReplicaSetNode};
    use crate::workloads::index_by_name;
    use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
    use k8s_openapi::api::batch::v1::{CronJob, Job};
    use k8s_openapi::api::core::v1::Pod;

    fn tree_with(
        deployments: Vec<Deployment>,
        replica_sets: Vec<ReplicaSet>,
        pods: Vec<Pod>,
    ) -> WorkloadTree {
        let mut tree = WorkloadTree::new("ns1");
        tree.deployments = index_by_name(deployments);
        tree.replica_sets = index_by_name(replica_sets);
        tree.pods = index_by_name(pods);
        tree
    }

    fn pod(name: &str, owner: Option<(&str, &str, &str)>) -> Pod {
        let metadata = match owner {
            Some((kind, owner, uid)) => owned_meta(name, &format!("u-{name}"), kind, owner, uid),
            None => meta(name, &format!("u-{name}")),
        };
        Pod {
            metadata,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_level_chain() {
        let mut tree = tree_with(
            vec![Deployment {
                metadata: meta("d1", "u1"),
                ..Default::default()
            }],
            vec![ReplicaSet {
                metadata: owned_meta("rs1", "u-rs1", "Deployment", "d1", "u1"),
                ..Default::default()
            }],
            vec![pod("p1", Some(("ReplicaSet", "rs1", "u-rs1")))],
        );

        let summary = resolve(&mut tree);

        assert_eq!(summary.adopted, 2);
        assert!(summary.orphans.is_empty());
        assert!(tree.pods.is_empty());
        assert!(tree.replica_sets.is_empty());
        let rs = &tree.deployments["d1"].replica_sets["rs1"];
        assert!(rs.pods.contains_key("p1"));
    }

    #[test]
    fn test_missing_parent_leaves_orphan() {
        let mut tree = tree_with(
            vec![],
            vec![],
            vec![pod("p2", Some(("ReplicaSet", "rs-gone", "u-old")))],
        );

        let summary = resolve(&mut tree);

        assert_eq!(summary.adopted, 0);
        assert!(tree.pods.contains_key("p2"));
        assert_eq!(summary.orphans.len(), 1);
        assert_eq!(summary.orphans[0].name, "p2");
        assert_eq!(summary.orphans[0].kind, "Pod");
    }

    #[test]
    fn test_uid_mismatch_is_not_adopted() {
        let mut tree = tree_with(
            vec![],
            vec![ReplicaSet {
                metadata: meta("rs1", "u-new"),
                ..Default::default()
            }],
            vec![pod("p1", Some(("ReplicaSet", "rs1", "u-old")))],
        );

        resolve(&mut tree);

        assert!(tree.pods.contains_key("p1"));
        assert!(tree.replica_sets["rs1"].pods.is_empty());
    }

    #[test]
    fn test_pod_without_controller_stays_root_without_orphan_entry() {
        let mut tree = tree_with(vec![], vec![], vec![pod("static", None)]);
        let summary = resolve(&mut tree);
        assert!(tree.pods.contains_key("static"));
        assert!(summary.orphans.is_empty());
    }

    #[test]
    fn test_owner_kind_must_match_collection() {
        // A ReplicaSet claimed by a non-Deployment controller stays a root
        let mut tree = tree_with(
            vec![Deployment {
                metadata: meta("d1", "u1"),
                ..Default::default()
            }],
            vec![ReplicaSet {
                metadata: owned_meta("rs1", "u-rs1", "Rollout", "d1", "u1"),
                ..Default::default()
            }],
            vec![],
        );
        let summary = resolve(&mut tree);
        assert!(tree.replica_sets.contains_key("rs1"));
        assert!(tree.deployments["d1"].replica_sets.is_empty());
        assert_eq!(summary.orphans.len(), 1);
    }

    #[test]
    fn test_cron_job_adopts_jobs_with_pods() {
        let mut tree = WorkloadTree::new("ns1");
        tree.cron_jobs.insert(
            "nightly".to_string(),
            CronJobNode::new(CronJob {
                metadata: meta("nightly", "u-cj"),
                ..Default::default()
            }),
        );
        tree.jobs.insert(
            "nightly-1".to_string(),
            JobNode::new(Job {
                metadata: owned_meta("nightly-1", "u-j1", "CronJob", "nightly", "u-cj"),
                ..Default::default()
            }),
        );
        tree.pods = index_by_name(vec![pod(
            "nightly-1-abc",
            Some(("Job", "nightly-1", "u-j1")),
        )]);

        let summary = resolve(&mut tree);

        assert_eq!(summary.adopted, 2);
        let job = &tree.cron_jobs["nightly"].jobs["nightly-1"];
        assert!(job.pods.contains_key("nightly-1-abc"));
        assert!(tree.jobs.is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut tree = tree_with(
            vec![Deployment {
                metadata: meta("d1", "u1"),
                ..Default::default()
            }],
            vec![ReplicaSet {
                metadata: owned_meta("rs1", "u-rs1", "Deployment", "d1", "u1"),
                ..Default::default()
            }],
            vec![
                pod("p1", Some(("ReplicaSet", "rs1", "u-rs1"))),
                pod("p2", Some(("ReplicaSet", "rs-gone", "u-old"))),
            ],
        );

        resolve(&mut tree);
        let deployments_before: Vec<String> = tree.deployments.keys().cloned().collect();
        let second = resolve(&mut tree);

        assert_eq!(second.adopted, 0);
        assert_eq!(tree.deployments.keys().cloned().collect::<Vec<_>>(), deployments_before);
        assert_eq!(tree.deployments["d1"].replica_sets["rs1"].pods.len(), 1);
        assert_eq!(tree.pods.keys().collect::<Vec<_>>(), vec!["p2"]);
    }

    #[test]
    fn test_adopt_returns_child_on_mismatch() {
        let mut parents: BTreeMap<String, ReplicaSetNode> = BTreeMap::new();
        parents.insert(
            "rs1".to_string(),
            ReplicaSetNode::new(ReplicaSet {
                metadata: meta("rs1", "u-rs1"),
                ..Default::default()
            }),
        );
        let link = OwnerLink {
            kind: "ReplicaSet".to_string(),
            name: "rs1".to_string(),
            uid: "other".to_string(),
            is_controller: true,
        };
        let child = PodNode::new(pod("p1", None));
        let returned = adopt(&mut parents, &link, child).unwrap_err();
        assert_eq!(returned.name(), "p1");
        assert!(parents["rs1"].pods.is_empty());
    }
}
