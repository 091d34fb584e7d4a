//! Check registry
//!
//! Maps a check kind string to the factory that builds it. The registry is
//! created by the caller and handed to the runner; there is no global table.

use std::collections::HashMap;
use std::sync::Arc;

use super::namespace_labels::{NAMESPACE_LABELS_KIND, NamespaceLabelsCheck};
use super::{Check, CheckError};
use crate::config::CheckConfig;
use crate::kube::ClusterApi;

/// Builds a check from its configuration
pub type CheckFactory =
    Box<dyn Fn(&CheckConfig) -> Result<Box<dyn Check>, CheckError> + Send + Sync>;

/// Registry of check factories keyed by kind
#[derive(Default)]
pub struct CheckRegistry {
    factories: HashMap<String, CheckFactory>,
}

impl CheckRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the checks shipped in this crate
    pub fn with_builtin(api: Arc<dyn ClusterApi>) -> Self {
        let mut registry = Self::new();
        registry.register(NAMESPACE_LABELS_KIND, move |config| {
            NamespaceLabelsCheck::from_config(api.clone(), config)
                .map(|check| Box::new(check) as Box<dyn Check>)
        });
        registry
    }

    /// Register a factory, replacing any previous one for the same kind
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&CheckConfig) -> Result<Box<dyn Check>, CheckError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Build a check from its configuration
    pub fn build(&self, config: &CheckConfig) -> Result<Box<dyn Check>, CheckError> {
        let factory = self
            .factories
            .get(&config.kind)
            .ok_or_else(|| CheckError::UnknownKind(config.kind.clone()))?;
        factory(config)
    }

    /// Check if a kind is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Get the number of registered kinds
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
