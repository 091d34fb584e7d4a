//! Report tree
//!
//! `ReportNode` is the universal output unit: a name, a status string, a
//! small string map of metadata, open-ended details and ordered children.
//! Field names on the wire follow the Sonobuoy results format.

mod sink;

pub use sink::{ReportError, ReportFormat, write_report, write_report_file};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fetch of a container node succeeded
pub const COMPLETE: &str = "complete";
/// Fetch of a container node failed; see `details.error`
pub const INCOMPLETE: &str = "incomplete";
pub const PASSED: &str = "passed";
pub const FAILED: &str = "failed";
/// Status that could not be derived from the object
pub const UNKNOWN: &str = "Unknown";

/// One node of a rendered report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,

    #[serde(rename = "meta", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,

    #[serde(rename = "items", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportNode>,
}

impl ReportNode {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    /// Container node whose own fetch failed
    pub fn incomplete(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(name, INCOMPLETE).with_detail("error", Value::String(error.to_string()))
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Insert a detail only when it is present
    pub fn with_optional_detail(self, key: impl Into<String>, value: Option<Value>) -> Self {
        match value {
            Some(value) if !value.is_null() => self.with_detail(key, value),
            _ => self,
        }
    }

    pub fn with_children(mut self, children: Vec<ReportNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push_child(&mut self, child: ReportNode) {
        self.children.push(child);
    }

    /// Sort direct children by name, keeping equal names in insertion order
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&ReportNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Follow a path of child names from this node
    pub fn find(&self, path: &[&str]) -> Option<&ReportNode> {
        path.iter()
            .try_fold(self, |node, name| node.child(name))
    }

    /// Apply the pass/fail roll-up to this node's own status
    pub fn roll_up(&mut self) {
        self.status = rollup_status(&self.children).to_string();
    }
}

/// Capability of every inventory entity: render self as a report node
///
/// Rendering only reads fields; it never fails and never mutates.
pub trait RenderNode {
    fn render_node(&self) -> ReportNode;
}

/// Pass/fail roll-up over direct children
///
/// "failed" when any direct child's status is not exactly "passed",
/// otherwise "passed". No children rolls up to "passed". Deeper levels are
/// not inspected.
pub fn rollup_status(children: &[ReportNode]) -> &'static str {
    if children.iter().all(|child| child.status == PASSED) {
        PASSED
    } else {
        FAILED
    }
}

/// Serialize any value into a detail, dropping it on failure
pub(crate) fn to_detail<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(status: &str) -> ReportNode {
        ReportNode::new("check", status)
    }

    #[test]
    fn test_rollup_all_passed() {
        assert_eq!(rollup_status(&[leaf(PASSED), leaf(PASSED)]), PASSED);
    }

    #[test]
    fn test_rollup_any_failed() {
        assert_eq!(rollup_status(&[leaf(PASSED), leaf(FAILED)]), FAILED);
    }

    #[test]
    fn test_rollup_empty_is_passed() {
        assert_eq!(rollup_status(&[]), PASSED);
    }

    #[test]
    fn test_rollup_is_exact_string_match() {
        // Anything other than "passed" counts as a failure, including other casings
        assert_eq!(rollup_status(&[leaf("Passed")]), FAILED);
        assert_eq!(rollup_status(&[leaf(COMPLETE)]), FAILED);
    }

    #[test]
    fn test_rollup_inspects_direct_children_only() {
        let mut group = ReportNode::new("group", PASSED);
        group.push_child(leaf(FAILED));
        // The grandchild failure is invisible until the group rolls itself up
        assert_eq!(rollup_status(std::slice::from_ref(&group)), PASSED);
        group.roll_up();
        assert_eq!(rollup_status(std::slice::from_ref(&group)), FAILED);
    }

    #[test]
    fn test_incomplete_carries_error() {
        let node = ReportNode::incomplete("Jobs", "boom");
        assert_eq!(node.status, INCOMPLETE);
        assert_eq!(node.details.get("error"), Some(&json!("boom")));
    }

    #[test]
    fn test_optional_detail_skips_none_and_null() {
        let node = ReportNode::new("x", COMPLETE)
            .with_optional_detail("a", None)
            .with_optional_detail("b", Some(Value::Null))
            .with_optional_detail("c", Some(json!(3)));
        assert_eq!(node.details.len(), 1);
        assert_eq!(node.details["c"], json!(3));
    }

    #[test]
    fn test_find_path() {
        let root = ReportNode::new("root", COMPLETE).with_children(vec![
            ReportNode::new("a", COMPLETE).with_children(vec![ReportNode::new("b", PASSED)]),
        ]);
        assert_eq!(root.find(&["a", "b"]).map(|n| n.status.as_str()), Some(PASSED));
        assert!(root.find(&["a", "missing"]).is_none());
        assert_eq!(root.find(&[]).map(|n| n.name.as_str()), Some("root"));
    }

    #[test]
    fn test_serialized_field_names() {
        let node = ReportNode::new("Pods", COMPLETE)
            .with_meta("kind", "Pod")
            .with_children(vec![ReportNode::new("p1", "Running")]);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["meta"]["kind"], json!("Pod"));
        assert_eq!(value["items"][0]["name"], json!("p1"));
        // Empty maps and lists are omitted
        assert!(value.get("details").is_none());
        assert!(value["items"][0].get("items").is_none());
    }
}
