//! Identity registry: the master original → placeholder mapping
//!
//! The registry is the per-run state object that upholds the consistency
//! invariant: two entries with literally equal originals always carry the
//! same placeholder. It only grows; nothing is ever removed.
//!
//! Iteration order is significant. Exact lookups return the first match in
//! unit insertion order, then field insertion order, so units must be
//! recorded in document order.

use crate::domain::{PiiValue, RedactionEntry, UnitKey};
use crate::redaction::normalizer::tokenize;
use crate::redaction::similarity::similarity;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Field → entry mapping of a single unit
pub type UnitEntries = IndexMap<String, RedactionEntry>;

/// Field → entry mapping flattened across units
pub type CombinedMap = IndexMap<String, RedactionEntry>;

/// Append-only store of redaction decisions, keyed by unit then field
///
/// Serializes to the nested `unit → field → {original, dummy}` structure used
/// by registry snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityRegistry {
    units: IndexMap<UnitKey, UnitEntries>,
}

impl IdentityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `field` within `unit`
    pub fn record(&mut self, unit: &UnitKey, field: impl Into<String>, entry: RedactionEntry) {
        match self.units.get_mut(unit) {
            Some(entries) => {
                entries.insert(field.into(), entry);
            }
            None => {
                let mut entries = UnitEntries::new();
                entries.insert(field.into(), entry);
                self.units.insert(unit.clone(), entries);
            }
        }
    }

    /// Every entry, in unit then field insertion order
    pub fn entries(&self) -> impl Iterator<Item = &RedactionEntry> {
        self.units.values().flat_map(|entries| entries.values())
    }

    /// Every entry with its unit key and field label
    pub fn entries_with_keys(&self) -> impl Iterator<Item = (&UnitKey, &str, &RedactionEntry)> {
        self.units.iter().flat_map(|(unit, entries)| {
            entries
                .iter()
                .map(move |(field, entry)| (unit, field.as_str(), entry))
        })
    }

    /// First entry whose original is literally equal to `value`
    pub fn find_by_exact_value(&self, value: &PiiValue) -> Option<&RedactionEntry> {
        self.entries().find(|entry| &entry.original == value)
    }

    /// Every placeholder assigned so far
    pub fn used_dummies(&self) -> HashSet<&str> {
        self.entries().map(|entry| entry.dummy.as_str()).collect()
    }

    /// Token → placeholder index over all resolver-created entries
    pub fn build_token_index(&self, min_token_length: usize) -> TokenIndex {
        self.build_token_index_where(min_token_length, |_| true)
    }

    /// Token → placeholder index over resolver-created entries whose field
    /// satisfies `include_field`
    ///
    /// Later entries overwrite earlier ones for the same token.
    pub fn build_token_index_where(
        &self,
        min_token_length: usize,
        include_field: impl Fn(&str) -> bool,
    ) -> TokenIndex {
        let mut index = BTreeMap::new();
        for (_, field, entry) in self.entries_with_keys() {
            if entry.synthetic || !include_field(field) {
                continue;
            }
            for token in tokenize(&entry.original) {
                if token.len() >= min_token_length {
                    index.insert(token, entry.dummy.clone());
                }
            }
        }
        TokenIndex(index)
    }

    /// Entries recorded for `unit`
    pub fn unit(&self, unit: &UnitKey) -> Option<&UnitEntries> {
        self.units.get(unit)
    }

    /// Unit keys in insertion order
    pub fn units(&self) -> impl Iterator<Item = &UnitKey> {
        self.units.keys()
    }

    /// Total number of entries across all units
    pub fn len(&self) -> usize {
        self.units.values().map(IndexMap::len).sum()
    }

    /// True when no entry has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten to one entry per field across units
    ///
    /// A field seen again in a later unit overwrites the earlier entry but
    /// keeps its first-seen position. Synthetic entries are left out.
    pub fn combined(&self) -> CombinedMap {
        let mut combined = CombinedMap::new();
        for (_, field, entry) in self.entries_with_keys() {
            if !entry.synthetic {
                combined.insert(field.to_string(), entry.clone());
            }
        }
        combined
    }
}

/// Best token-level match found in a [`TokenIndex`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    /// Index token that matched
    pub token: String,
    /// Placeholder associated with the token
    pub dummy: String,
    /// Similarity score (0-100)
    pub score: u8,
}

/// Derived token → placeholder mapping used for fuzzy fallbacks
///
/// Never the source of truth; rebuild it from the registry whenever needed.
/// Tokens iterate in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenIndex(BTreeMap<String, String>);

impl TokenIndex {
    /// Placeholder for an exact token
    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    /// `(token, placeholder)` pairs in lexicographic token order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(t, d)| (t.as_str(), d.as_str()))
    }

    /// Number of indexed tokens
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest-scoring index token against any of `query`, if it reaches
    /// `threshold`
    ///
    /// Ties keep the lexicographically smallest index token, then the
    /// earliest query token.
    pub fn best_match<'a>(
        &self,
        query: impl IntoIterator<Item = &'a str>,
        threshold: u8,
    ) -> Option<TokenMatch> {
        let mut best: Option<TokenMatch> = None;

        for candidate in query {
            for (token, dummy) in self.iter() {
                let score = similarity(candidate, token);
                if score < threshold {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some(current) => {
                        score > current.score
                            || (score == current.score && token < current.token.as_str())
                    }
                };
                if better {
                    best = Some(TokenMatch {
                        token: token.to_string(),
                        dummy: dummy.to_string(),
                        score,
                    });
                }
            }
        }

        best
    }
}
