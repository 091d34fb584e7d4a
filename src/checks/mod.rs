//! Check-plugin seam
//!
//! Checks are independent collaborators that query the cluster and return a
//! report node of pass/fail results. They are built from configuration via
//! an explicit [`CheckRegistry`] and executed by a [`CheckRunner`].

mod namespace_labels;
mod registry;
mod runner;

pub use namespace_labels::{NAMESPACE_LABELS_KIND, NamespaceLabelsCheck, NamespaceLabelsSpec};
pub use registry::{CheckFactory, CheckRegistry};
pub use runner::CheckRunner;

use async_trait::async_trait;

use crate::kube::FetchError;
use crate::report::ReportNode;

/// Check errors
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("no checks configured")]
    NoChecksConfigured,

    #[error("expected {expected} check results, got {got}")]
    Incomplete { expected: usize, got: usize },

    #[error("unknown check kind: {0}")]
    UnknownKind(String),

    #[error("invalid spec for check '{name}': {message}")]
    InvalidSpec { name: String, message: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("check failed: {0}")]
    Failed(String),
}

/// One configured check
#[async_trait]
pub trait Check: Send + Sync {
    /// Name used for the check's report node
    fn name(&self) -> &str;

    /// Run the check and return its result tree
    async fn run(&self) -> Result<ReportNode, CheckError>;
}
