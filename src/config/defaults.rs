//! Default configuration values
//!
//! Provides default configuration instances and helper functions.

use super::schema::Config;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

/// Commented starter file written by `config init`
pub const STARTER_CONFIG: &str = r#"# kube-inventory configuration
#
# context: my-cluster
# namespaces: []            # empty means every namespace
# excludeNamespaces: []
collector:
  concurrency: 8
  requestTimeoutSeconds: 30
cluster:
  cniConfDir: /etc/cni/net.d
  cniBinDir: /opt/cni/bin
  dnsProbeHost: google.com
# checks:
#   - name: example
#     kind: some-registered-kind
#     spec: {}
"#;
