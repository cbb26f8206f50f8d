//! Desktop connector
//!
//! Queries the reference manager's embedded HTTP server on its fixed
//! local port. The desktop client searches the user's whole local
//! library, so group scopes do not apply. Unreachability is a soft
//! failure: the orchestrator falls through to the web API.

use async_trait::async_trait;
use tracing::debug;

use super::{parse_candidates, Connector};
use crate::config::{ConnectorKind, ResolverConfig};
use crate::domain::{Candidate, GroupScope};
use crate::error::ConnectorError;
use crate::http::HttpClient;
use crate::keys::SearchQuery;

/// Fixed endpoint of the desktop client's embedded HTTP server
const DESKTOP_BASE_URL: &str = "http://127.0.0.1:23119/citproc";

pub struct DesktopConnector {
    client: HttpClient,
    base_url: String,
}

impl DesktopConnector {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            client: HttpClient::new("imcite/0.1", config.request_timeout),
            base_url: DESKTOP_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl Connector for DesktopConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Desktop
    }

    fn applicable(&self, _config: &ResolverConfig) -> bool {
        // Always worth a try; an absent desktop client shows up as an
        // unreachable endpoint, not a configuration state
        true
    }

    fn scopes(&self, _config: &ResolverConfig) -> Vec<GroupScope> {
        vec![GroupScope::Personal]
    }

    async fn search(
        &self,
        query: &SearchQuery,
        _scope: GroupScope,
    ) -> Result<Vec<Candidate>, ConnectorError> {
        let body = match query {
            SearchQuery::ItemId(id) => {
                let url = format!("{}/items", self.base_url);
                self.client.get(&url, &[("key", id.as_str())], None).await?
            }
            SearchQuery::Terms(terms) => {
                let url = format!("{}/search", self.base_url);
                let q = terms.join(" ");
                self.client.get(&url, &[("q", q.as_str())], None).await?
            }
        };

        let candidates = parse_candidates(&body, true)?;
        debug!(
            count = candidates.len(),
            "desktop search returned candidates"
        );
        Ok(candidates)
    }
}
