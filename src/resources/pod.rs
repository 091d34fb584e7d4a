use k8s_openapi::api::core::v1::{Container, ContainerStatus, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::{Value, json};

use super::{Workload, entity_node, labels_detail};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, UNKNOWN, to_detail};

/// A listed pod; always a leaf of the ownership forest
#[derive(Debug, Clone)]
pub struct PodNode {
    pub pod: Pod,
}

impl PodNode {
    pub fn new(pod: Pod) -> Self {
        Self { pod }
    }

    /// Pod phase, else the true condition types, else "Unknown"
    pub fn status_string(&self) -> String {
        let Some(status) = self.pod.status.as_ref() else {
            return UNKNOWN.to_string();
        };
        if let Some(phase) = status.phase.as_deref().filter(|p| !p.is_empty()) {
            return phase.to_string();
        }
        let true_conditions: Vec<&str> = status
            .conditions
            .iter()
            .flatten()
            .filter(|c| c.status == "True")
            .map(|c| c.type_.as_str())
            .collect();
        if true_conditions.is_empty() {
            UNKNOWN.to_string()
        } else {
            true_conditions.join(",")
        }
    }
}

impl From<Pod> for PodNode {
    fn from(pod: Pod) -> Self {
        Self::new(pod)
    }
}

impl Workload for PodNode {
    const KIND: ResourceKind = ResourceKind::Pod;

    fn metadata(&self) -> &ObjectMeta {
        &self.pod.metadata
    }
}

impl RenderNode for PodNode {
    fn render_node(&self) -> ReportNode {
        let spec = self.pod.spec.as_ref();
        let status = self.pod.status.as_ref();

        let volumes: Vec<Value> = spec
            .and_then(|s| s.volumes.as_ref())
            .into_iter()
            .flatten()
            .map(to_detail)
            .collect();

        let mut node = entity_node("Pod", &self.pod.metadata, self.status_string())
            .with_detail("conditions", to_detail(&status.and_then(|s| s.conditions.as_ref())))
            .with_detail("hostIP", json!(status.and_then(|s| s.host_ip.as_ref())))
            .with_detail("node", json!(spec.and_then(|s| s.node_name.as_ref())))
            .with_detail("podIP", json!(status.and_then(|s| s.pod_ip.as_ref())))
            .with_detail("priority", json!(spec.and_then(|s| s.priority)))
            .with_detail("qos", json!(status.and_then(|s| s.qos_class.as_ref())))
            .with_detail(
                "serviceAccount",
                json!(spec.and_then(|s| s.service_account_name.as_ref())),
            )
            .with_detail("volumes", Value::Array(volumes))
            .with_optional_detail("labels", labels_detail(&self.pod.metadata))
            .with_optional_detail(
                "tolerations",
                spec.and_then(|s| s.tolerations.as_ref())
                    .filter(|t| !t.is_empty())
                    .map(to_detail),
            )
            .with_optional_detail(
                "nodeSelector",
                spec.and_then(|s| s.node_selector.as_ref())
                    .filter(|n| !n.is_empty())
                    .map(to_detail),
            );

        if let Some(spec) = spec {
            let init_statuses = status
                .and_then(|s| s.init_container_statuses.as_deref())
                .unwrap_or_default();
            let statuses = status
                .and_then(|s| s.container_statuses.as_deref())
                .unwrap_or_default();

            for container in spec.init_containers.iter().flatten() {
                node.push_child(render_container(container, init_statuses, true));
            }
            for container in &spec.containers {
                node.push_child(render_container(container, statuses, false));
            }
        }

        node
    }
}

fn render_container(container: &Container, statuses: &[ContainerStatus], is_init: bool) -> ReportNode {
    let mut node = ReportNode::new(container.name.clone(), UNKNOWN)
        .with_meta("kind", "Container")
        .with_detail("image", json!(container.image))
        .with_detail("command", json!(container.command))
        .with_detail("args", json!(container.args))
        .with_detail("volumeMounts", to_detail(&container.volume_mounts));

    if is_init {
        node = node.with_meta("init", "true");
    }

    if let Some(status) = statuses.iter().find(|s| s.name == container.name) {
        let state = status.state.as_ref();
        if let Some(running) = state.and_then(|s| s.running.as_ref()) {
            node.status = "Running".to_string();
            node = node.with_detail("state", json!({ "running": to_detail(running) }));
        } else if let Some(waiting) = state.and_then(|s| s.waiting.as_ref()) {
            node.status = "Waiting".to_string();
            node = node.with_detail("state", json!({ "waiting": to_detail(waiting) }));
        } else if let Some(terminated) = state.and_then(|s| s.terminated.as_ref()) {
            node.status = "Terminated".to_string();
            node = node.with_detail("state", json!({ "terminated": to_detail(terminated) }));
        }

        node = node
            .with_detail("imageID", json!(status.image_id))
            .with_detail("ready", json!(status.ready))
            .with_detail("restartCount", json!(status.restart_count));
    }

    node
}
