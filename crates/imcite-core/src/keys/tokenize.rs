//! Search-term tokenization
//!
//! Converts a classified citation key into connector-specific search
//! terms. Pure and deterministic; a key with no split boundaries yields
//! a single-element term sequence rather than an error.

use super::{KeyType, SearchQuery};

/// Tokenize a citation key under one interpretation
pub fn tokenize(key: &str, key_type: KeyType) -> SearchQuery {
    match key_type {
        KeyType::ItemId => SearchQuery::ItemId(key.to_string()),
        KeyType::BetterBibTex => SearchQuery::Terms(split_camel(key)),
        KeyType::EasyCitekey => SearchQuery::Terms(split_easy(key)),
    }
}

/// Better BibTeX split: a boundary sits before each maximal run of
/// digits and before each uppercase letter that follows a lowercase
/// letter or digit. Consecutive uppercase letters (acronyms) stay
/// together.
fn split_camel(key: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in key.chars() {
        let boundary = match prev {
            Some(p) => {
                (c.is_ascii_digit() && !p.is_ascii_digit())
                    || (c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()))
            }
            None => false,
        };
        if boundary && !current.is_empty() {
            terms.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        terms.push(current);
    }
    terms
}

/// Easy Citekey split: the first colon separates the author fragment,
/// then the remainder splits at its last maximal digit run, with the
/// digit run preserved as its own term.
fn split_easy(key: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let rest = match key.split_once(':') {
        Some((head, rest)) => {
            if !head.is_empty() {
                terms.push(head.to_string());
            }
            rest
        }
        None => key,
    };

    match last_digit_run(rest) {
        Some((start, end)) => {
            if start > 0 {
                terms.push(rest[..start].to_string());
            }
            terms.push(rest[start..end].to_string());
            if end < rest.len() {
                terms.push(rest[end..].to_string());
            }
        }
        None => {
            if !rest.is_empty() {
                terms.push(rest.to_string());
            }
        }
    }
    terms
}

/// Byte range of the last maximal ASCII-digit run in `s`, if any
fn last_digit_run(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && !bytes[end - 1].is_ascii_digit() {
        end -= 1;
    }
    // walk left past any trailing non-digits we just skipped
    let run_end = end;
    if run_end == 0 {
        return None;
    }
    let mut start = run_end;
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    Some((start, run_end))
}
