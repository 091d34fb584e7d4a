//! Check runner
//!
//! Runs a fixed set of checks on a bounded pool and aggregates their
//! results under one pass/fail root.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Check, CheckError, CheckRegistry};
use crate::config::CheckConfig;
use crate::report::{FAILED, PASSED, ReportNode};

/// Executes built checks with bounded concurrency
pub struct CheckRunner {
    checks: Vec<Box<dyn Check>>,
    concurrency: usize,
}

impl CheckRunner {
    pub fn new(checks: Vec<Box<dyn Check>>, concurrency: usize) -> Self {
        Self {
            checks,
            concurrency: concurrency.max(1),
        }
    }

    /// Build every configured check through the registry
    pub fn from_configs(
        registry: &CheckRegistry,
        configs: &[CheckConfig],
        concurrency: usize,
    ) -> Result<Self, CheckError> {
        let checks = configs
            .iter()
            .map(|config| registry.build(config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(checks, concurrency))
    }

    /// Get the number of checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Check if there is nothing to run
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check and roll the results up under `report_name`
    ///
    /// A failing check becomes a "failed" node; only an empty runner or a
    /// short result count is an error.
    pub async fn run(&self, report_name: &str) -> Result<ReportNode, CheckError> {
        if self.checks.is_empty() {
            return Err(CheckError::NoChecksConfigured);
        }

        let expected = self.checks.len();
        let results: Vec<ReportNode> = stream::iter(&self.checks)
            .map(|check| run_check(&**check))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        if results.len() != expected {
            return Err(CheckError::Incomplete {
                expected,
                got: results.len(),
            });
        }

        let mut root = ReportNode::new(report_name, PASSED).with_children(results);
        root.sort_children();
        root.roll_up();
        debug!("Checks finished: {} results, status {}", expected, root.status);
        Ok(root)
    }
}

async fn run_check(check: &dyn Check) -> ReportNode {
    match check.run().await {
        Ok(mut node) => {
            if !node.children.is_empty() {
                node.roll_up();
            }
            node
        }
        Err(e) => {
            warn!("Check '{}' failed: {}", check.name(), e);
            ReportNode::new(check.name(), FAILED).with_detail("error", Value::String(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    enum Outcome {
        Node(ReportNode),
        Error(String),
    }

    struct Scripted {
        name: String,
        outcome: Outcome,
    }

    #[async_trait]
    impl Check for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self) -> Result<ReportNode, CheckError> {
            match &self.outcome {
                Outcome::Node(node) => Ok(node.clone()),
                Outcome::Error(message) => Err(CheckError::Failed(message.clone())),
            }
        }
    }

    fn scripted(name: &str, outcome: Outcome) -> Box<dyn Check> {
        Box::new(Scripted {
            name: name.to_string(),
            outcome,
        })
    }

    fn with_children(name: &str, statuses: &[&str]) -> ReportNode {
        let children = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| ReportNode::new(format!("item-{}", i), *status))
            .collect();
        ReportNode::new(name, "").with_children(children)
    }

    #[tokio::test]
    async fn test_no_checks_is_fatal() {
        let runner = CheckRunner::new(Vec::new(), 4);
        let err = runner.run("Checks").await.unwrap_err();
        assert!(matches!(err, CheckError::NoChecksConfigured));
    }

    #[tokio::test]
    async fn test_all_passing() {
        let runner = CheckRunner::new(
            vec![
                scripted("b", Outcome::Node(with_children("b", &[PASSED, PASSED]))),
                scripted("a", Outcome::Node(ReportNode::new("a", PASSED))),
            ],
            2,
        );
        let root = runner.run("Checks").await.unwrap();
        assert_eq!(root.status, PASSED);
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(root.children[1].status, PASSED);
    }

    #[tokio::test]
    async fn test_child_failure_rolls_up_one_level_at_a_time() {
        let runner = CheckRunner::new(
            vec![scripted("probes", Outcome::Node(with_children("probes", &[PASSED, FAILED])))],
            1,
        );
        let root = runner.run("Checks").await.unwrap();
        assert_eq!(root.children[0].status, FAILED);
        assert_eq!(root.status, FAILED);
    }

    #[tokio::test]
    async fn test_check_error_becomes_failed_node() {
        let runner = CheckRunner::new(
            vec![
                scripted("ok", Outcome::Node(ReportNode::new("ok", PASSED))),
                scripted("broken", Outcome::Error("boom".to_string())),
            ],
            4,
        );
        let root = runner.run("Checks").await.unwrap();
        assert_eq!(root.status, FAILED);

        let broken = root.child("broken").unwrap();
        assert_eq!(broken.status, FAILED);
        assert_eq!(
            broken.details.get("error"),
            Some(&Value::String("check failed: boom".to_string()))
        );
    }

    #[test]
    fn test_from_configs_unknown_kind() {
        let registry = CheckRegistry::new();
        let configs = vec![CheckConfig {
            name: "x".to_string(),
            description: None,
            kind: "nope".to_string(),
            spec: serde_yaml::Value::Null,
        }];
        let err = CheckRunner::from_configs(&registry, &configs, 1).err().unwrap();
        assert!(matches!(err, CheckError::UnknownKind(_)));
    }
}
