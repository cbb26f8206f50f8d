//! Citation-key classification and tokenization

pub mod classify;
pub mod tokenize;

pub use classify::classify;
pub use tokenize::tokenize;

use serde::{Deserialize, Serialize};

/// Recognized citation-key syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyType {
    /// Source-system item identifier; a direct lookup, not a search
    ItemId,
    /// Camel-case key combining author/title fragments and a year,
    /// e.g. "DoeTitle2020"
    BetterBibTex,
    /// Colon-and-digit-delimited key, e.g. "doe:2020title"
    EasyCitekey,
}

/// Connector-facing query derived from one key interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Exact-identifier lookup
    ItemId(String),
    /// Conjunctive free-text search; order is preserved for connectors
    /// with phrase-position-sensitive queries
    Terms(Vec<String>),
}

impl SearchQuery {
    /// An empty query can never match anything; callers skip it instead
    /// of asking a connector
    pub fn is_empty(&self) -> bool {
        match self {
            SearchQuery::ItemId(id) => id.is_empty(),
            SearchQuery::Terms(terms) => terms.is_empty(),
        }
    }
}
