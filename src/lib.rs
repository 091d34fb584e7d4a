//! kube-inventory library
//!
//! Fetches the workloads of a Kubernetes cluster, resolves controller
//! ownership into per-namespace trees and renders the result, together with
//! cluster components and optional checks, as a Sonobuoy-style report.
//! It can be used both as a binary and as a library for testing.

pub mod checks;
pub mod cli;
pub mod cluster;
pub mod collector;
pub mod config;
pub mod kube;
pub mod models;
pub mod report;
pub mod resources;
pub mod workloads;

// Re-export commonly used types for convenience
pub use collector::{Collector, CollectorOptions, Inventory};
pub use report::{RenderNode, ReportNode};
pub use workloads::{NamespacedWorkloads, ResolutionSummary, WorkloadTree};
