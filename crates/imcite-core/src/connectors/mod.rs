//! Data-source connectors
//!
//! Each connector executes one search against one data source and
//! returns zero or more candidate records. Transport failures are
//! always recoverable: the orchestrator falls through to the next
//! source instead of aborting the run.

pub mod desktop;
pub mod web;

pub use desktop::DesktopConnector;
pub use web::WebConnector;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ConnectorKind, ResolverConfig};
use crate::disambiguate::extract_pinned_key;
use crate::domain::{Candidate, GroupScope};
use crate::error::ConnectorError;
use crate::keys::SearchQuery;

/// Common contract shared by the desktop and web-API connectors
#[async_trait]
pub trait Connector: Send + Sync {
    /// Which configured priority-list entry this connector answers to
    fn kind(&self) -> ConnectorKind;

    /// Whether this connector can be attempted at all under `config`
    fn applicable(&self, config: &ResolverConfig) -> bool;

    /// Library scopes to search, in priority order. Connectors that do
    /// not distinguish scopes return a single `Personal` entry.
    fn scopes(&self, config: &ResolverConfig) -> Vec<GroupScope>;

    /// Execute one search against one scope
    async fn search(
        &self,
        query: &SearchQuery,
        scope: GroupScope,
    ) -> Result<Vec<Candidate>, ConnectorError>;
}

/// Parse a connector response body into candidates.
///
/// Accepts either a JSON array of records or a single record object
/// (item-fetch endpoints return one object). Records without a usable
/// identifier are skipped. The annotation field is only inspected for
/// pinned keys when `inspect_annotations` is set; group libraries never
/// contribute pinned-identifier data.
pub fn parse_candidates(
    body: &str,
    inspect_annotations: bool,
) -> Result<Vec<Candidate>, ConnectorError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ConnectorError::InvalidResponse {
            message: format!("not valid JSON: {}", e),
        })?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => {
            return Err(ConnectorError::InvalidResponse {
                message: format!("expected array or object, got {}", json_type_name(&other)),
            })
        }
    };

    Ok(records
        .into_iter()
        .filter_map(|record| parse_record(record, inspect_annotations))
        .collect())
}

fn parse_record(record: Value, inspect_annotations: bool) -> Option<Candidate> {
    let obj = record.as_object()?;

    let id = obj
        .get("id")
        .or_else(|| obj.get("key"))
        .and_then(record_id)?;

    let pinned_key = if inspect_annotations {
        ["note", "extra"]
            .iter()
            .filter_map(|field| obj.get(*field).and_then(Value::as_str))
            .find_map(extract_pinned_key)
    } else {
        None
    };

    Some(Candidate {
        id,
        pinned_key,
        payload: record,
    })
}

/// Record identifiers arrive as strings or numbers depending on source
fn record_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
