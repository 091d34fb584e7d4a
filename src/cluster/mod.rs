//! Cluster-scoped facts
//!
//! Nodes, CNI, control plane and network reachability, gathered once per
//! run and rendered under "Cluster Components".

mod cni;
mod control_plane;
mod network;
mod nodes;

pub use cni::{CniStatus, NetworkConfigList, PluginConfig, parse_conf};
pub use control_plane::{ControlPlane, provider_of};
pub use network::NetworkStatus;
pub use nodes::{NodeInventory, node_status};

use std::time::Duration;

use crate::config::ClusterConfig;
use crate::kube::ClusterApi;
use crate::report::{COMPLETE, RenderNode, ReportNode};

/// All cluster-scoped components of one run
#[derive(Debug, Clone)]
pub struct ClusterComponents {
    pub nodes: NodeInventory,
    pub cni: CniStatus,
    pub control_plane: ControlPlane,
    pub network: NetworkStatus,
}

impl ClusterComponents {
    /// Gather every component; failures are captured per component
    pub async fn collect<A: ClusterApi + ?Sized>(
        api: &A,
        settings: &ClusterConfig,
        timeout: Duration,
    ) -> Self {
        let node_listing = api.list_nodes().await;
        if let Err(e) = &node_listing {
            tracing::warn!("Could not list nodes: {}", e);
        }

        let conf_dir = settings.cni_conf_dir.clone();
        let bin_dir = settings.cni_bin_dir.clone();
        let (control_plane, network, cni) = tokio::join!(
            ControlPlane::inspect(api, &node_listing),
            NetworkStatus::probe(&settings.dns_probe_host, timeout),
            tokio::task::spawn_blocking(move || CniStatus::discover(&conf_dir, &bin_dir)),
        );

        let cni = cni.unwrap_or_else(|e| CniStatus {
            error: Some(format!("CNI discovery task failed: {}", e)),
            ..Default::default()
        });

        Self {
            nodes: NodeInventory::from_listing(&node_listing),
            cni,
            control_plane,
            network,
        }
    }
}

impl RenderNode for ClusterComponents {
    fn render_node(&self) -> ReportNode {
        ReportNode::new("Cluster Components", COMPLETE).with_children(vec![
            self.nodes.render_node(),
            self.cni.render_node(),
            self.control_plane.render_node(),
            self.network.render_node(),
        ])
    }
}
