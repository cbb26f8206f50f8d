//! imcite-core: citation resolution and bibliographic cache engine
//!
//! Resolves author-supplied citation keys into full bibliographic
//! records and persists them so later runs need not refetch:
//! - Citation-key classification and tokenization (Better BibTeX,
//!   Easy Citekey, item-id forms)
//! - Desktop and web-API connectors queried in fallback order
//! - Pinned-key disambiguation of multi-match results
//! - Append-only JSON/YAML bibliography cache with crash-safe atomic
//!   replacement
//!
//! Document parsing, key extraction, and output rendering are owned by
//! the surrounding filter layer; this crate's boundary is
//! [`Resolver::run`].

pub mod cache;
pub mod config;
pub mod connectors;
pub mod disambiguate;
pub mod domain;
pub mod error;
pub mod http;
pub mod keys;
pub mod resolver;

// Re-export main types for convenience
pub use cache::{BibFormat, Bibliography};
pub use config::{ConnectorKind, ResolverConfig};
pub use connectors::{Connector, DesktopConnector, WebConnector};
pub use disambiguate::{disambiguate, extract_pinned_key, Match};
pub use domain::{Candidate, GroupScope, Outcome, Resolution, ResolvedRecord, RunReport};
pub use error::{CacheError, ConnectorError, ImciteError, Result};
pub use keys::{classify, tokenize, KeyType, SearchQuery};
pub use resolver::Resolver;
