use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{LimitRange, LimitRangeItem, Namespace, ResourceQuota};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde_json::{Map, Value, json};

use crate::kube::{ClusterApi, FetchResult};
use crate::models::ResourceKind;
use crate::report::{RenderNode, ReportNode, UNKNOWN, to_detail};

/// A namespace with its quota, limit and disruption budget objects
#[derive(Debug, Clone, Default)]
pub struct NamespaceNode {
    pub namespace: Namespace,
    pub quotas: Vec<ResourceQuota>,
    pub limits: Vec<LimitRange>,
    pub disruption_budgets: Vec<PodDisruptionBudget>,
    /// Sub-listings that failed, by kind
    pub errors: BTreeMap<ResourceKind, String>,
}

impl NamespaceNode {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        self.namespace.metadata.name.as_deref().unwrap_or_default()
    }

    /// Fetch the policy objects of one namespace concurrently
    ///
    /// A failed listing is logged and recorded; it never drops the namespace.
    pub async fn collect<A: ClusterApi + ?Sized>(api: &A, namespace: Namespace) -> Self {
        let mut node = Self::new(namespace);
        let name = node.name().to_string();

        let (limits, quotas, budgets) = tokio::join!(
            api.list_limit_ranges(&name),
            api.list_resource_quotas(&name),
            api.list_pod_disruption_budgets(&name),
        );

        node.limits = node.record(ResourceKind::LimitRange, limits);
        node.quotas = node.record(ResourceKind::ResourceQuota, quotas);
        node.disruption_budgets = node.record(ResourceKind::PodDisruptionBudget, budgets);
        node
    }

    fn record<T>(&mut self, kind: ResourceKind, result: FetchResult<Vec<T>>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Could not fetch {} for namespace {}: {}", kind, self.name(), e);
                self.errors.insert(kind, e.to_string());
                Vec::new()
            }
        }
    }
}

/// Quantities of a resource list as plain strings
fn resource_list(list: &BTreeMap<String, Quantity>) -> Value {
    Value::Object(
        list.iter()
            .map(|(resource, quantity)| (resource.clone(), Value::String(quantity.0.clone())))
            .collect(),
    )
}

/// `{resource: {limit, used}}` from a quota's observed status
fn parse_quota(quota: &ResourceQuota) -> Value {
    let mut parsed: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    let status = quota.status.as_ref();

    for (field, list) in [
        ("limit", status.and_then(|s| s.hard.as_ref())),
        ("used", status.and_then(|s| s.used.as_ref())),
    ] {
        for (resource, quantity) in list.into_iter().flatten() {
            parsed
                .entry(resource.clone())
                .or_default()
                .insert(field.to_string(), Value::String(quantity.0.clone()));
        }
    }

    to_detail(&parsed)
}

fn parse_limit_range_item(item: &LimitRangeItem) -> Value {
    let mut parsed = Map::new();
    parsed.insert("type".to_string(), Value::String(item.type_.clone()));

    for (field, list) in [
        ("default", &item.default),
        ("defaultRequest", &item.default_request),
        ("min", &item.min),
        ("max", &item.max),
        ("maxLimitRequestRatio", &item.max_limit_request_ratio),
    ] {
        if let Some(list) = list.as_ref().filter(|l| !l.is_empty()) {
            parsed.insert(field.to_string(), resource_list(list));
        }
    }

    Value::Object(parsed)
}

fn parse_disruption_budget(budget: &PodDisruptionBudget) -> Value {
    let spec = budget.spec.as_ref();
    let status = budget.status.as_ref();
    json!({
        "minAvailable": to_detail(&spec.and_then(|s| s.min_available.as_ref())),
        "maxUnavailable": to_detail(&spec.and_then(|s| s.max_unavailable.as_ref())),
        "disruptionsAllowed": status.map(|s| s.disruptions_allowed),
        "currentHealthy": status.map(|s| s.current_healthy),
        "desiredHealthy": status.map(|s| s.desired_healthy),
        "expectedPods": status.map(|s| s.expected_pods),
    })
}

fn object_name<T: kube::ResourceExt>(object: &T) -> String {
    object.name_any()
}

impl RenderNode for NamespaceNode {
    fn render_node(&self) -> ReportNode {
        let phase = self
            .namespace
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let mut node = ReportNode::new(self.name(), phase).with_meta("kind", "Namespace");

        if !self.quotas.is_empty() {
            let quotas: Map<String, Value> = self
                .quotas
                .iter()
                .map(|q| (object_name(q), parse_quota(q)))
                .collect();
            node = node.with_detail("resourceQuotas", Value::Object(quotas));
        }

        if !self.limits.is_empty() {
            let limits: Map<String, Value> = self
                .limits
                .iter()
                .map(|l| {
                    let items = l
                        .spec
                        .iter()
                        .flat_map(|s| s.limits.iter())
                        .map(parse_limit_range_item)
                        .collect();
                    (object_name(l), Value::Array(items))
                })
                .collect();
            node = node.with_detail("limitRanges", Value::Object(limits));
        }

        if !self.disruption_budgets.is_empty() {
            let budgets: Map<String, Value> = self
                .disruption_budgets
                .iter()
                .map(|b| (object_name(b), parse_disruption_budget(b)))
                .collect();
            node = node.with_detail("podDisruptionBudgets", Value::Object(budgets));
        }

        if !self.errors.is_empty() {
            let errors: Map<String, Value> = self
                .errors
                .iter()
                .map(|(kind, error)| (kind.to_string(), Value::String(error.clone())))
                .collect();
            node = node.with_detail("errors", Value::Object(errors));
        }

        node
    }
}
