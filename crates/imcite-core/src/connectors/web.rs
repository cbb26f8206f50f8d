//! Web-API connector
//!
//! HTTPS access to the remote library service: personal-library and
//! private-group search need a bearer credential, public groups need
//! none. The user id is resolved once per run from the key-info
//! endpoint and memoized in memory.
//!
//! Group libraries never contribute pinned-identifier data (their
//! annotation field is not inspected). Disambiguation degrades
//! accordingly: a single group match is accepted, multiple group
//! matches are reported as ambiguity, never guessed.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{parse_candidates, Connector};
use crate::config::{ConnectorKind, ResolverConfig};
use crate::domain::{Candidate, GroupScope};
use crate::error::ConnectorError;
use crate::http::HttpClient;
use crate::keys::SearchQuery;

const WEB_BASE_URL: &str = "https://api.citelib.org/v1";

/// Key-info endpoint response; identifies the credential's owner
#[derive(Debug, Deserialize)]
struct KeyInfo {
    #[serde(rename = "userID")]
    user_id: u64,
}

pub struct WebConnector {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    configured_user_id: Option<u64>,
    // fetched once per run, shared across citations
    user_id: OnceCell<u64>,
}

impl WebConnector {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            client: HttpClient::new("imcite/0.1", config.request_timeout),
            base_url: WEB_BASE_URL.to_string(),
            api_key: config.api_key.clone(),
            configured_user_id: config.user_id,
            user_id: OnceCell::new(),
        }
    }

    /// User id from configuration, or resolved via the key-info
    /// endpoint on first use
    async fn user_id(&self) -> Result<u64, ConnectorError> {
        if let Some(id) = self.configured_user_id {
            return Ok(id);
        }
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ConnectorError::Unreachable {
                message: "personal library requires a credential".to_string(),
            }
        })?;
        self.user_id
            .get_or_try_init(|| async {
                let url = format!("{}/keys/{}", self.base_url, api_key);
                let body = self.client.get(&url, &[], Some(api_key)).await?;
                let info: KeyInfo = serde_json::from_str(&body).map_err(|e| {
                    ConnectorError::InvalidResponse {
                        message: format!("key-info response: {}", e),
                    }
                })?;
                debug!(user_id = info.user_id, "resolved web API user id");
                Ok(info.user_id)
            })
            .await
            .copied()
    }

    /// Library prefix for one scope, e.g. `/users/1234` or `/groups/77`
    async fn library_prefix(&self, scope: GroupScope) -> Result<String, ConnectorError> {
        match scope {
            GroupScope::Personal => {
                let id = self.user_id().await?;
                Ok(format!("{}/users/{}", self.base_url, id))
            }
            GroupScope::Group(id) => Ok(format!("{}/groups/{}", self.base_url, id)),
        }
    }
}

#[async_trait]
impl Connector for WebConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::WebApi
    }

    fn applicable(&self, config: &ResolverConfig) -> bool {
        config.api_key.is_some() || !config.public_groups.is_empty()
    }

    /// Personal library first, then configured groups, then public
    /// groups. Without a credential only public groups are searchable.
    fn scopes(&self, config: &ResolverConfig) -> Vec<GroupScope> {
        let mut scopes = Vec::new();
        if config.api_key.is_some() {
            scopes.push(GroupScope::Personal);
            scopes.extend(config.groups.iter().map(|&id| GroupScope::Group(id)));
        }
        scopes.extend(config.public_groups.iter().map(|&id| GroupScope::Group(id)));
        scopes
    }

    async fn search(
        &self,
        query: &SearchQuery,
        scope: GroupScope,
    ) -> Result<Vec<Candidate>, ConnectorError> {
        let prefix = self.library_prefix(scope).await?;
        let bearer = self.api_key.as_deref();

        let body = match query {
            SearchQuery::ItemId(id) => {
                let url = format!("{}/items/{}", prefix, id);
                self.client.get(&url, &[], bearer).await?
            }
            SearchQuery::Terms(terms) => {
                let url = format!("{}/items", prefix);
                let q = terms.join(" ");
                self.client
                    .get(&url, &[("q", q.as_str()), ("qmode", "everything")], bearer)
                    .await?
            }
        };

        // Only the personal library exposes the annotation field
        let inspect = scope == GroupScope::Personal;
        let candidates = parse_candidates(&body, inspect)?;
        debug!(
            ?scope,
            count = candidates.len(),
            "web search returned candidates"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(api_key: Option<&str>, groups: Vec<u64>, public: Vec<u64>) -> ResolverConfig {
        ResolverConfig {
            api_key: api_key.map(|s| s.to_string()),
            groups,
            public_groups: public,
            ..Default::default()
        }
    }

    #[test]
    fn test_applicable_requires_credential_or_public_groups() {
        let config = config_with(None, vec![], vec![]);
        let web = WebConnector::new(&config);
        assert!(!web.applicable(&config));

        let config = config_with(Some("secret"), vec![], vec![]);
        let web = WebConnector::new(&config);
        assert!(web.applicable(&config));

        let config = config_with(None, vec![], vec![99]);
        let web = WebConnector::new(&config);
        assert!(web.applicable(&config));
    }

    #[test]
    fn test_scope_order_personal_then_groups_then_public() {
        let config = config_with(Some("secret"), vec![11, 22], vec![33]);
        let web = WebConnector::new(&config);
        assert_eq!(
            web.scopes(&config),
            vec![
                GroupScope::Personal,
                GroupScope::Group(11),
                GroupScope::Group(22),
                GroupScope::Group(33),
            ]
        );
    }

    #[test]
    fn test_scopes_without_credential_are_public_only() {
        // Private groups need the credential just like the personal library
        let config = config_with(None, vec![11], vec![33]);
        let web = WebConnector::new(&config);
        assert_eq!(web.scopes(&config), vec![GroupScope::Group(33)]);
    }

    #[test]
    fn test_key_info_parse() {
        let info: KeyInfo =
            serde_json::from_str(r#"{"userID": 475425, "username": "doe"}"#).unwrap();
        assert_eq!(info.user_id, 475425);
    }
}
