//! Multi-match disambiguation via pinned citation keys
//!
//! When a search yields several candidates, the record whose annotation
//! field pins the queried citation key wins. Anything less exact is
//! reported as ambiguity; the orchestrator never guesses.

use crate::domain::Candidate;

/// Field-name aliases under which a pinned key may appear in the
/// free-text annotation field. Name match is case-insensitive; the
/// pinned value itself is compared case-sensitively.
const PINNED_KEY_ALIASES: [&str; 2] = ["citation key", "citekey"];

/// Result of disambiguating one candidate list
#[derive(Debug)]
pub enum Match {
    /// Zero candidates; the caller advances to the next interpretation
    /// or connector
    None,
    /// Exactly one acceptable candidate
    Unique(Candidate),
    /// Multiple candidates and no unique pin; recoverable, the caller
    /// advances to the next interpretation
    Ambiguous,
}

/// Pick the candidate for `key`, if it can be done without guessing.
///
/// One candidate is accepted unconditionally. Among several, exactly
/// one whose pinned key equals `key` is accepted; zero or several
/// matching pins is ambiguity.
pub fn disambiguate(key: &str, mut candidates: Vec<Candidate>) -> Match {
    if candidates.len() > 1 {
        candidates.retain(|c| c.pinned_key.as_deref() == Some(key));
        if candidates.len() != 1 {
            return Match::Ambiguous;
        }
    }
    match candidates.pop() {
        Some(candidate) => Match::Unique(candidate),
        None => Match::None,
    }
}

/// Extract a pinned citation key from a free-text annotation field.
///
/// Scans line by line for `<alias>: <value>` where `<alias>` is one of
/// the accepted field names. The first hit wins.
pub fn extract_pinned_key(annotation: &str) -> Option<String> {
    for line in annotation.lines() {
        let line = line.trim();
        let (name, value) = match line.split_once(':') {
            Some(pair) => pair,
            None => continue,
        };
        let name = name.trim().to_ascii_lowercase();
        if PINNED_KEY_ALIASES.contains(&name.as_str()) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
