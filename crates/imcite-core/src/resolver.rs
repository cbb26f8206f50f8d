//! Fallback orchestrator
//!
//! Drives the nested KeyType × Connector × GroupScope iteration for
//! each citation, short-circuiting at the first resolved record.
//! Independent citations resolve concurrently up to a bounded pool;
//! within one citation, connector calls are sequential because the
//! fallback order is semantically meaningful.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::Bibliography;
use crate::config::{ConnectorKind, ResolverConfig};
use crate::connectors::{Connector, DesktopConnector, WebConnector};
use crate::disambiguate::{disambiguate, Match};
use crate::domain::{Outcome, Resolution, ResolvedRecord, RunReport};
use crate::error::Result;
use crate::keys::{classify, tokenize};

/// Per-attempt outcome of one (interpretation, connector, scope) step
enum Step {
    Resolved(ResolvedRecord),
    /// Recoverable; try the next scope or connector
    Continue,
    /// Something was found but could not be uniquely pinned; advance to
    /// the next key interpretation, never guess
    NextInterpretation,
}

pub struct Resolver {
    config: ResolverConfig,
    connectors: Vec<Arc<dyn Connector>>,
    // contains/append are serialized; nothing is externally visible
    // until flush
    cache: Mutex<Bibliography>,
}

impl Resolver {
    /// Build a resolver with the connectors named by the configured
    /// priority list, loading the bibliography cache if one is
    /// configured. A corrupt cache file fails here, before any network
    /// activity.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let connectors = config
            .connectors
            .iter()
            .map(|kind| -> Arc<dyn Connector> {
                match kind {
                    ConnectorKind::Desktop => Arc::new(DesktopConnector::new(&config)),
                    ConnectorKind::WebApi => Arc::new(WebConnector::new(&config)),
                }
            })
            .collect();
        Self::with_connectors(config, connectors)
    }

    /// Build a resolver over caller-supplied connector implementations.
    /// The configured priority list is honored via each connector's
    /// `kind`.
    pub fn with_connectors(
        config: ResolverConfig,
        connectors: Vec<Arc<dyn Connector>>,
    ) -> Result<Self> {
        let cache = match &config.bibliography_path {
            Some(path) => Bibliography::load(path)?,
            None => Bibliography::in_memory(),
        };
        Ok(Self {
            config,
            connectors,
            cache: Mutex::new(cache),
        })
    }

    /// Resolve every key, append newly resolved records to the
    /// bibliography, flush it once, and report per-key outcomes in
    /// input order.
    pub async fn run(&self, keys: &[String]) -> Result<RunReport> {
        let outcomes: Vec<(String, Outcome)> = stream::iter(keys)
            .map(|key| async move { (key.clone(), self.resolve_one(key).await) })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        self.cache.lock().await.flush()?;
        Ok(RunReport { outcomes })
    }

    /// Resolve one key against the cache and, if absent, the connector
    /// fallback chain
    async fn resolve_one(&self, key: &str) -> Outcome {
        // Coverage check short-circuits before any connector call; the
        // lock is released before network work starts
        if self.cache.lock().await.contains(key) {
            debug!(key, "already covered by bibliography cache");
            return Outcome::Cached;
        }

        match self.resolve(key).await {
            Resolution::Resolved(record) => {
                self.cache.lock().await.append(record);
                Outcome::Resolved
            }
            Resolution::Unresolved => Outcome::Unresolved,
        }
    }

    /// Walk KeyType interpretations in classifier order, connectors in
    /// configured priority order, and scopes in library order, stopping
    /// at the first resolved record
    pub async fn resolve(&self, key: &str) -> Resolution {
        let mut desktop_unreachable = false;
        let mut found_anything = false;

        for key_type in classify(key, &self.config.citekey_types) {
            let query = tokenize(key, key_type);
            if query.is_empty() {
                continue;
            }

            'connectors: for connector in &self.connectors {
                if !connector.applicable(&self.config) {
                    continue;
                }
                // The web API is a fallback: it runs only when the
                // desktop client was unreachable or nothing has been
                // found yet
                if connector.kind() == ConnectorKind::WebApi
                    && found_anything
                    && !desktop_unreachable
                {
                    continue;
                }

                for scope in connector.scopes(&self.config) {
                    let step = match connector.search(&query, scope).await {
                        Err(e) => {
                            warn!(key, ?key_type, ?scope, error = %e, "connector attempt failed");
                            if connector.kind() == ConnectorKind::Desktop {
                                desktop_unreachable = true;
                            }
                            Step::Continue
                        }
                        Ok(candidates) => {
                            if !candidates.is_empty() {
                                found_anything = true;
                            }
                            match disambiguate(key, candidates) {
                                Match::None => Step::Continue,
                                Match::Unique(candidate) => {
                                    Step::Resolved(ResolvedRecord::bind(key, candidate))
                                }
                                Match::Ambiguous => {
                                    debug!(key, ?key_type, ?scope, "ambiguous match");
                                    Step::NextInterpretation
                                }
                            }
                        }
                    };

                    match step {
                        Step::Resolved(record) => return Resolution::Resolved(record),
                        Step::Continue => continue,
                        Step::NextInterpretation => break 'connectors,
                    }
                }
            }
        }

        debug!(key, "all interpretations exhausted, unresolved");
        Resolution::Unresolved
    }

    /// Number of records currently held by the bibliography cache
    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}
