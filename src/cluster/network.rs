use std::time::Duration;

use serde_json::json;

use crate::report::{COMPLETE, RenderNode, ReportNode};

/// Reachability facts about the cluster's network
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStatus {
    pub probe_host: String,
    pub external_dns: bool,
}

impl NetworkStatus {
    /// Resolve `host`, bounded by `timeout`; failure or timeout means no external DNS
    pub async fn probe(host: &str, timeout: Duration) -> Self {
        let lookup = tokio::net::lookup_host((host, 443));
        let external_dns = match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                tracing::debug!("DNS lookup of {} failed: {}", host, e);
                false
            }
            Err(_) => {
                tracing::debug!("DNS lookup of {} timed out", host);
                false
            }
        };
        Self {
            probe_host: host.to_string(),
            external_dns,
        }
    }
}

impl RenderNode for NetworkStatus {
    fn render_node(&self) -> ReportNode {
        ReportNode::new("Network Status", COMPLETE)
            .with_detail("externalDNS", json!(self.external_dns))
    }
}
