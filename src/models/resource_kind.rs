//! Resource kind definitions
//!
//! Centralized enum for every Kubernetes kind the inventory lists.
//! This keeps kind strings out of the fetch, resolution and rendering code
//! and fixes the order in which workload groups appear in a report.

use std::fmt;
use std::str::FromStr;

/// Enumeration of all listable resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    // Cluster scoped
    Namespace,
    Node,
    // Workloads
    Deployment,
    ReplicaSet,
    ReplicationController,
    StatefulSet,
    DaemonSet,
    CronJob,
    Job,
    Pod,
    // Namespace policy objects
    LimitRange,
    ResourceQuota,
    PodDisruptionBudget,
}

impl ResourceKind {
    /// Get the API kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Node => "Node",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::ReplicationController => "ReplicationController",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::CronJob => "CronJob",
            ResourceKind::Job => "Job",
            ResourceKind::Pod => "Pod",
            ResourceKind::LimitRange => "LimitRange",
            ResourceKind::ResourceQuota => "ResourceQuota",
            ResourceKind::PodDisruptionBudget => "PodDisruptionBudget",
        }
    }

    /// Try to parse a string into a ResourceKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all resource kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Namespace,
            ResourceKind::Node,
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::ReplicationController,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::CronJob,
            ResourceKind::Job,
            ResourceKind::Pod,
            ResourceKind::LimitRange,
            ResourceKind::ResourceQuota,
            ResourceKind::PodDisruptionBudget,
        ]
    }

    /// Workload kinds in report order
    ///
    /// A namespace node lists its groups in exactly this order.
    pub fn workloads() -> &'static [Self] {
        &[
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::ReplicationController,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::CronJob,
            ResourceKind::Job,
            ResourceKind::Pod,
        ]
    }

    /// Check if this kind is one of the workload kinds
    pub fn is_workload(&self) -> bool {
        Self::workloads().contains(self)
    }

    /// Name of the container node grouping this kind inside a namespace
    pub fn group_label(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespaces",
            ResourceKind::Node => "Nodes",
            ResourceKind::Deployment => "Deployments",
            ResourceKind::ReplicaSet => "Replica Sets",
            ResourceKind::ReplicationController => "Replication Controllers",
            ResourceKind::StatefulSet => "Stateful Sets",
            ResourceKind::DaemonSet => "Daemon Sets",
            ResourceKind::CronJob => "Cron Jobs",
            ResourceKind::Job => "Jobs",
            ResourceKind::Pod => "Pods",
            ResourceKind::LimitRange => "Limit Ranges",
            ResourceKind::ResourceQuota => "Resource Quotas",
            ResourceKind::PodDisruptionBudget => "Pod Disruption Budgets",
        }
    }

    /// Try to parse a string (case-insensitive) into a ResourceKind
    ///
    /// Accepts plurals and the short names kubectl understands.
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "namespace" | "namespaces" | "ns" => Some(ResourceKind::Namespace),
            "node" | "nodes" | "no" => Some(ResourceKind::Node),
            "deployment" | "deployments" | "deploy" => Some(ResourceKind::Deployment),
            "replicaset" | "replicasets" | "rs" => Some(ResourceKind::ReplicaSet),
            "replicationcontroller" | "replicationcontrollers" | "rc" => {
                Some(ResourceKind::ReplicationController)
            }
            "statefulset" | "statefulsets" | "sts" => Some(ResourceKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(ResourceKind::DaemonSet),
            "cronjob" | "cronjobs" | "cj" => Some(ResourceKind::CronJob),
            "job" | "jobs" => Some(ResourceKind::Job),
            "pod" | "pods" | "po" => Some(ResourceKind::Pod),
            "limitrange" | "limitranges" | "limits" => Some(ResourceKind::LimitRange),
            "resourcequota" | "resourcequotas" | "quota" => Some(ResourceKind::ResourceQuota),
            "poddisruptionbudget" | "poddisruptionbudgets" | "pdb" => {
                Some(ResourceKind::PodDisruptionBudget)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(ResourceKind::ReplicaSet.as_str(), "ReplicaSet");
        assert_eq!(
            ResourceKind::ReplicationController.as_str(),
            "ReplicationController"
        );
        assert_eq!(ResourceKind::CronJob.as_str(), "CronJob");
    }

    #[test]
    fn test_from_str_is_exact() {
        assert_eq!(
            ResourceKind::parse_optional("StatefulSet"),
            Some(ResourceKind::StatefulSet)
        );
        // Owner references carry the exact kind; lowercase is not an owner kind
        assert_eq!(ResourceKind::parse_optional("statefulset"), None);
        assert_eq!(ResourceKind::parse_optional("Unknown"), None);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(
            ResourceKind::from_str_case_insensitive("deploy"),
            Some(ResourceKind::Deployment)
        );
        assert_eq!(
            ResourceKind::from_str_case_insensitive("Jobs"),
            Some(ResourceKind::Job)
        );
        assert_eq!(
            ResourceKind::from_str_case_insensitive("pdb"),
            Some(ResourceKind::PodDisruptionBudget)
        );
        assert_eq!(ResourceKind::from_str_case_insensitive("ingress"), None);
    }

    #[test]
    fn test_workload_order() {
        let labels: Vec<&str> = ResourceKind::workloads()
            .iter()
            .map(|k| k.group_label())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Deployments",
                "Replica Sets",
                "Replication Controllers",
                "Stateful Sets",
                "Daemon Sets",
                "Cron Jobs",
                "Jobs",
                "Pods",
            ]
        );
        assert!(ResourceKind::Pod.is_workload());
        assert!(!ResourceKind::Node.is_workload());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ResourceKind::DaemonSet), "DaemonSet");
        let s: String = ResourceKind::Job.into();
        assert_eq!(s, "Job");
    }
}
