//! Citation-key classification
//!
//! Given a raw key and the configured allow-list, produce the ordered
//! interpretations worth attempting. Classification never fails: an
//! unparseable key simply tokenizes to nothing downstream and yields
//! zero candidates.

use super::KeyType;

/// Item identifiers are fixed-length tokens over the source system's
/// key alphabet (uppercase letters and digits)
const ITEM_ID_LEN: usize = 8;

/// Classify a citation key into its plausible interpretations, in
/// priority order.
///
/// `ItemId` comes first because it is a direct lookup with no parsing
/// ambiguity, but it is only offered when the key matches the item-id
/// lexical form. The two search-based forms are always offered (a key
/// may legally satisfy both syntaxes) unless the allow-list excludes
/// them. An empty allow-list means all types are allowed.
pub fn classify(key: &str, allowed: &[KeyType]) -> Vec<KeyType> {
    const PRIORITY: [KeyType; 3] = [
        KeyType::ItemId,
        KeyType::BetterBibTex,
        KeyType::EasyCitekey,
    ];

    PRIORITY
        .iter()
        .copied()
        .filter(|t| allowed.is_empty() || allowed.contains(t))
        .filter(|t| *t != KeyType::ItemId || is_item_id(key))
        .collect()
}

/// Check whether a key matches the item-identifier lexical form
pub fn is_item_id(key: &str) -> bool {
    key.len() == ITEM_ID_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
