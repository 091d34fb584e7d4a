use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::json;

use super::{Adopter, PodNode, Workload, entity_node, render_adopted};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, to_detail};

/// A job and the pods it controls
#[derive(Debug, Clone)]
pub struct JobNode {
    pub job: Job,
    pub pods: BTreeMap<String, PodNode>,
}

impl JobNode {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            pods: BTreeMap::new(),
        }
    }

    pub fn status_message(&self) -> String {
        let status = self.job.status.as_ref();
        format!(
            "Running: {}, Succeeded: {}, Failed: {}",
            status.and_then(|s| s.active).unwrap_or(0),
            status.and_then(|s| s.succeeded).unwrap_or(0),
            status.and_then(|s| s.failed).unwrap_or(0),
        )
    }
}

impl From<Job> for JobNode {
    fn from(job: Job) -> Self {
        Self::new(job)
    }
}

impl Workload for JobNode {
    const KIND: ResourceKind = ResourceKind::Job;

    fn metadata(&self) -> &ObjectMeta {
        &self.job.metadata
    }
}

impl Adopter for JobNode {
    type Child = PodNode;

    fn adopted(&self) -> &BTreeMap<String, PodNode> {
        &self.pods
    }

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, PodNode> {
        &mut self.pods
    }
}

impl RenderNode for JobNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.job.spec.as_ref();

        entity_node("Job", self.metadata(), self.status_message())
            .with_detail("status", to_detail(&self.job.status))
            .with_detail("selector", to_detail(&spec.and_then(|s| s.selector.as_ref())))
            .with_optional_detail("parallelism", spec.and_then(|s| s.parallelism).map(|v| json!(v)))
            .with_optional_detail("completions", spec.and_then(|s| s.completions).map(|v| json!(v)))
            .with_optional_detail(
                "activeDeadlineSeconds",
                spec.and_then(|s| s.active_deadline_seconds).map(|v| json!(v)),
            )
            .with_optional_detail("backoffLimit", spec.and_then(|s| s.backoff_limit).map(|v| json!(v)))
            .with_optional_detail(
                "ttlSecondsAfterFinished",
                spec.and_then(|s| s.ttl_seconds_after_finished).map(|v| json!(v)),
            )
            .with_children(render_adopted(&self.pods))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::meta;
    use k8s_openapi::api::batch::v1::{JobSpec, JobStatus};

    #[test]
    fn test_status_message_and_details() {
        let node = JobNode::new(Job {
            metadata: meta("backup-1", "u-job"),
            spec: Some(JobSpec {
                backoff_limit: Some(6),
                ..Default::default()
            }),
            status: Some(JobStatus {
                succeeded: Some(1),
                ..Default::default()
            }),
        });
        assert_eq!(
            node.status_message(),
            "Running: 0, Succeeded: 1, Failed: 0"
        );
        let rendered = node.render_node();
        assert_eq!(rendered.details["backoffLimit"], json!(6));
        assert!(!rendered.details.contains_key("parallelism"));
    }
}
