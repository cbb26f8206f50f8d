//! Core data model for citation resolution

use serde_json::Value;

/// A bibliographic record returned by a connector
///
/// The payload is pass-through CSL-style JSON; this engine never
/// validates or normalizes its content.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Source-assigned record identifier
    pub id: String,
    /// Pinned citation key parsed out of the record's free-text
    /// annotation field, when the searched scope exposes it
    pub pinned_key: Option<String>,
    /// Opaque bibliographic payload
    pub payload: Value,
}

/// A candidate bound to the citation key that produced it; this is what
/// gets cached and returned
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub key: String,
    pub record: Value,
}

impl ResolvedRecord {
    /// Bind a candidate to its citation key. The payload's `id` member
    /// is rewritten to the key so the cached record is addressable by
    /// the key that cites it.
    pub fn bind(key: &str, candidate: Candidate) -> Self {
        let mut record = candidate.payload;
        if let Value::Object(ref mut map) = record {
            map.insert("id".to_string(), Value::String(key.to_string()));
        }
        Self {
            key: key.to_string(),
            record,
        }
    }
}

/// A library partition searched in fixed priority order: the personal
/// library first, then explicitly configured groups, then public groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupScope {
    Personal,
    Group(u64),
}

/// Terminal outcome of resolving one citation key
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(ResolvedRecord),
    /// Not an error for the run; reported per citation so the caller
    /// can leave it unresolved in the output
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Per-key outcome reported by a full run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Already covered by the bibliography cache; no connector was asked
    Cached,
    /// Newly resolved this run and appended to the cache
    Resolved,
    /// All interpretations and sources exhausted without a unique match
    Unresolved,
}

/// Summary of one resolution run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Outcome per citation key, in input order
    pub outcomes: Vec<(String, Outcome)>,
}

impl RunReport {
    pub fn resolved_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == Outcome::Resolved)
            .count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == Outcome::Unresolved)
            .count()
    }

    pub fn cached_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == Outcome::Cached)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bind_rewrites_id() {
        let candidate = Candidate {
            id: "ABCD1234".to_string(),
            pinned_key: None,
            payload: json!({"id": "ABCD1234", "title": "A Paper"}),
        };
        let record = ResolvedRecord::bind("doe:2020title", candidate);
        assert_eq!(record.key, "doe:2020title");
        assert_eq!(record.record["id"], "doe:2020title");
        assert_eq!(record.record["title"], "A Paper");
    }

    #[test]
    fn test_run_report_counts() {
        let report = RunReport {
            outcomes: vec![
                ("a".to_string(), Outcome::Cached),
                ("b".to_string(), Outcome::Resolved),
                ("c".to_string(), Outcome::Unresolved),
                ("d".to_string(), Outcome::Resolved),
            ],
        };
        assert_eq!(report.cached_count(), 1);
        assert_eq!(report.resolved_count(), 2);
        assert_eq!(report.unresolved_count(), 1);
    }
}
