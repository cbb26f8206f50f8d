//! Configuration for the citation resolver
//!
//! An explicit immutable configuration value threaded through calls,
//! never ambient state, so resolution stays testable and parallel-safe.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keys::KeyType;

/// Which connector implementation a priority-list entry selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    /// Local desktop reference manager on its fixed local port
    Desktop,
    /// Remote web API (personal library and group libraries)
    WebApi,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Bearer credential for the web API; personal-library and
    /// private-group access require it
    pub api_key: Option<String>,
    /// Bibliography cache file; `None` disables persistence for the run
    pub bibliography_path: Option<PathBuf>,
    /// Citation-key types the classifier may consider; empty means all
    pub citekey_types: Vec<KeyType>,
    /// Connector priority order
    pub connectors: Vec<ConnectorKind>,
    /// Explicitly configured group libraries, searched after the
    /// personal library
    pub groups: Vec<u64>,
    /// Public group libraries, searched last; no credential needed
    pub public_groups: Vec<u64>,
    /// Web API user id; fetched once per run from the key-info endpoint
    /// when not supplied
    pub user_id: Option<u64>,
    /// Upper bound on concurrently resolving citations
    pub max_concurrency: usize,
    /// Timeout applied to every connector request
    pub request_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            bibliography_path: None,
            citekey_types: Vec::new(),
            connectors: vec![ConnectorKind::Desktop, ConnectorKind::WebApi],
            groups: Vec::new(),
            public_groups: Vec::new(),
            user_id: None,
            max_concurrency: 8,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_connector_order() {
        let config = ResolverConfig::default();
        assert_eq!(
            config.connectors,
            vec![ConnectorKind::Desktop, ConnectorKind::WebApi]
        );
    }

    #[test]
    fn test_default_is_web_inapplicable() {
        let config = ResolverConfig::default();
        assert!(config.api_key.is_none());
        assert!(config.public_groups.is_empty());
    }
}
