use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::{Value, json};

use super::{Adopter, JobNode, Workload, entity_node, labels_detail, render_adopted};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, to_detail};

/// A cron job and the jobs it spawned
#[derive(Debug, Clone)]
pub struct CronJobNode {
    pub cron_job: CronJob,
    pub jobs: BTreeMap<String, JobNode>,
}

impl CronJobNode {
    pub fn new(cron_job: CronJob) -> Self {
        Self {
            cron_job,
            jobs: BTreeMap::new(),
        }
    }

    fn active_count(&self) -> usize {
        self.cron_job
            .status
            .as_ref()
            .and_then(|s| s.active.as_ref())
            .map_or(0, Vec::len)
    }

    fn last_schedule_time(&self) -> Value {
        to_detail(
            &self
                .cron_job
                .status
                .as_ref()
                .and_then(|s| s.last_schedule_time.as_ref()),
        )
    }

    pub fn status_message(&self) -> String {
        let last = match self.last_schedule_time() {
            Value::String(time) => time,
            _ => "<none>".to_string(),
        };
        format!("Active: {}, Last Schedule: {}", self.active_count(), last)
    }
}

impl From<CronJob> for CronJobNode {
    fn from(cron_job: CronJob) -> Self {
        Self::new(cron_job)
    }
}

impl Workload for CronJobNode {
    const KIND: ResourceKind = ResourceKind::CronJob;

    fn metadata(&self) -> &ObjectMeta {
        &self.cron_job.metadata
    }
}

impl Adopter for CronJobNode {
    type Child = JobNode;

    fn adopted(&self) -> &BTreeMap<String, JobNode> {
        &self.jobs
    }

    fn adopted_mut(&mut self) -> &mut BTreeMap<String, JobNode> {
        &mut self.jobs
    }
}

impl RenderNode for CronJobNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.cron_job.spec.as_ref();

        entity_node("CronJob", self.metadata(), self.status_message())
            .with_detail("active", json!(self.active_count()))
            .with_detail("schedule", json!(spec.map(|s| &s.schedule)))
            .with_detail("suspend", json!(spec.and_then(|s| s.suspend)))
            .with_detail(
                "concurrencyPolicy",
                json!(spec.and_then(|s| s.concurrency_policy.as_ref())),
            )
            .with_detail("lastScheduleTime", self.last_schedule_time())
            .with_detail(
                "successfulJobHistoryLimit",
                json!(spec.and_then(|s| s.successful_jobs_history_limit)),
            )
            .with_detail(
                "failedJobHistoryLimit",
                json!(spec.and_then(|s| s.failed_jobs_history_limit)),
            )
            .with_optional_detail("labels", labels_detail(self.metadata()))
            .with_children(render_adopted(&self.jobs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::meta;
    use k8s_openapi::api::batch::v1::{CronJobSpec, CronJobStatus};
    use k8s_openapi::api::core::v1::ObjectReference;

    #[test]
    fn test_status_message_never_scheduled() {
        let node = CronJobNode::new(CronJob {
            metadata: meta("nightly", "u-cj"),
            spec: Some(CronJobSpec {
                schedule: "0 2 * * *".to_string(),
                ..Default::default()
            }),
            status: Some(CronJobStatus {
                active: Some(vec![ObjectReference::default()]),
                ..Default::default()
            }),
        });
        assert_eq!(node.status_message(), "Active: 1, Last Schedule: <none>");

        let rendered = node.render_node();
        assert_eq!(rendered.details["schedule"], json!("0 2 * * *"));
        assert_eq!(rendered.details["active"], json!(1));
        assert_eq!(rendered.details["lastScheduleTime"], Value::Null);
    }
}
