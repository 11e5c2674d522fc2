//! Placeholder pools and allocation

use crate::redaction::config::{RedactionConfig, DEFAULT_SENTINEL};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Candidate placeholders per PII category
///
/// Loaded once per run and read-only afterwards. Serialized as a plain JSON
/// object `{"Patient Name": ["Jane Doe", ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DummyPool(IndexMap<String, Vec<String>>);

impl DummyPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Add candidates for a category, replacing any existing list
    pub fn insert(&mut self, category: impl Into<String>, candidates: Vec<String>) {
        self.0.insert(category.into(), candidates);
    }

    /// Candidates configured for `category` (empty when none)
    pub fn candidates(&self, category: &str) -> &[String] {
        self.0.get(category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Configured category labels
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// True when no category has been configured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for DummyPool {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Picks placeholders from a [`DummyPool`]
///
/// Unused candidates are preferred; once a category's pool is exhausted,
/// candidates are reused. A category without candidates yields the sentinel
/// so a missing pool never blocks redaction.
pub struct DummyAllocator {
    rng: StdRng,
    sentinel: String,
}

impl DummyAllocator {
    /// Create an allocator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    /// Create a reproducible allocator
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    /// Create an allocator honoring `config.seed` and `config.sentinel`
    pub fn from_config(config: &RedactionConfig) -> Self {
        let allocator = match config.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        };
        allocator.sentinel(config.sentinel.clone())
    }

    /// Override the sentinel placeholder
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Pick a placeholder for `category`
    ///
    /// Does not mark the result as used; callers track that through the
    /// registry.
    pub fn allocate(&mut self, category: &str, pool: &DummyPool, used: &HashSet<&str>) -> String {
        let candidates = pool.candidates(category);
        if candidates.is_empty() {
            tracing::debug!(category = %category, "No placeholder pool, using sentinel");
            return self.sentinel.clone();
        }

        let unused: Vec<&String> = candidates
            .iter()
            .filter(|c| !used.contains(c.as_str()))
            .collect();

        let picked = if unused.is_empty() {
            tracing::debug!(
                category = %category,
                pool_size = candidates.len(),
                "Placeholder pool exhausted, reusing a candidate"
            );
            candidates.choose(&mut self.rng)
        } else {
            unused.choose(&mut self.rng).copied()
        };

        picked.cloned().unwrap_or_else(|| self.sentinel.clone())
    }
}

impl Default for DummyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> DummyPool {
        [(
            "Patient Name",
            vec!["Jane Doe".to_string(), "John Roe".to_string()],
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_missing_category_returns_sentinel() {
        let mut allocator = DummyAllocator::with_seed(1);
        let result = allocator.allocate("Account Number", &pool(), &HashSet::new());
        assert_eq!(result, "REDACTED");
    }

    #[test]
    fn test_custom_sentinel() {
        let mut allocator = DummyAllocator::with_seed(1).sentinel("[X]");
        let result = allocator.allocate("Account Number", &DummyPool::new(), &HashSet::new());
        assert_eq!(result, "[X]");
    }

    #[test]
    fn test_prefers_unused_candidates() {
        let mut allocator = DummyAllocator::with_seed(42);
        let used: HashSet<&str> = ["Jane Doe"].into_iter().collect();

        for _ in 0..20 {
            assert_eq!(allocator.allocate("Patient Name", &pool(), &used), "John Roe");
        }
    }

    #[test]
    fn test_exhausted_pool_reuses_candidates() {
        let mut allocator = DummyAllocator::with_seed(7);
        let used: HashSet<&str> = ["Jane Doe", "John Roe"].into_iter().collect();

        let result = allocator.allocate("Patient Name", &pool(), &used);
        assert!(result == "Jane Doe" || result == "John Roe");
    }

    #[test]
    fn test_seeded_allocators_agree() {
        let mut first = DummyAllocator::with_seed(99);
        let mut second = DummyAllocator::with_seed(99);
        let none = HashSet::new();

        for _ in 0..10 {
            assert_eq!(
                first.allocate("Patient Name", &pool(), &none),
                second.allocate("Patient Name", &pool(), &none)
            );
        }
    }

    #[test]
    fn test_pool_deserializes_from_json() {
        let pool: DummyPool =
            serde_json::from_str(r#"{"Patient Name": ["Jane Doe"], "MRN": []}"#).unwrap();
        assert_eq!(pool.candidates("Patient Name"), ["Jane Doe".to_string()]);
        assert!(pool.candidates("MRN").is_empty());
        assert!(pool.candidates("Unknown").is_empty());
        assert_eq!(pool.categories().count(), 2);
    }
}
