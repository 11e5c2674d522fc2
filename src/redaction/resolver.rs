//! Redaction resolver: decides the placeholder for each detected value
//!
//! Resolution order, stopping at the first hit:
//! 1. exact reuse of a registered original
//! 2. token-fuzzy reuse through the registry's token index (optional)
//! 3. a new placeholder from the [`DummyAllocator`]
//!
//! Every decision is recorded back into the registry, so resolution for one
//! unit depends on the state left by the previous ones.

use crate::domain::{PiiMap, PiiValue, RedactionEntry, UnitKey};
use crate::redaction::allocator::{DummyAllocator, DummyPool};
use crate::redaction::config::RedactionConfig;
use crate::redaction::normalizer::tokenize;
use crate::redaction::registry::{IdentityRegistry, UnitEntries};
use serde::{Deserialize, Serialize};

/// How a placeholder was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Literal match against a registered original
    Exact,
    /// Fuzzy match of one token against the token index
    TokenFuzzy {
        /// Index token that matched
        token: String,
        /// Similarity score (0-100)
        score: u8,
    },
    /// Fresh placeholder from the pool (or the sentinel)
    Allocated,
}

impl ResolutionSource {
    /// Short label for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::TokenFuzzy { .. } => "token_fuzzy",
            Self::Allocated => "allocated",
        }
    }
}

/// Outcome of resolving one detected value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Field label the value was detected under
    pub field: String,
    /// Placeholder assigned
    pub dummy: String,
    /// How the placeholder was chosen
    pub source: ResolutionSource,
}

/// Resolves detected values against an [`IdentityRegistry`]
pub struct RedactionResolver {
    allocator: DummyAllocator,
    fuzzy_tokens: bool,
    token_threshold: u8,
    min_token_length: usize,
}

impl RedactionResolver {
    /// Create a resolver from configuration
    pub fn new(config: &RedactionConfig) -> Self {
        Self::with_allocator(config, DummyAllocator::from_config(config))
    }

    /// Create a resolver with a specific allocator
    pub fn with_allocator(config: &RedactionConfig, allocator: DummyAllocator) -> Self {
        Self {
            allocator,
            fuzzy_tokens: config.fuzzy_tokens,
            token_threshold: config.token_threshold,
            min_token_length: config.min_token_length,
        }
    }

    /// Resolve one detected value and record the decision under
    /// `(unit, field)`
    pub fn resolve(
        &mut self,
        registry: &mut IdentityRegistry,
        unit: &UnitKey,
        field: &str,
        value: &PiiValue,
        pool: &DummyPool,
    ) -> Resolution {
        let (dummy, source) = self.choose(registry, field, value, pool);

        tracing::debug!(
            unit = %unit,
            field = %field,
            source = source.label(),
            "Resolved PII value"
        );

        registry.record(unit, field, RedactionEntry::new(value.clone(), dummy.clone()));

        Resolution {
            field: field.to_string(),
            dummy,
            source,
        }
    }

    /// Resolve every non-blank pair of `pii` in field order
    ///
    /// Returns the per-unit replacement map together with the individual
    /// decisions. Blank values are dropped and never reach the registry.
    pub fn resolve_unit(
        &mut self,
        registry: &mut IdentityRegistry,
        unit: &UnitKey,
        pii: &PiiMap,
        pool: &DummyPool,
    ) -> (UnitEntries, Vec<Resolution>) {
        let mut replacements = UnitEntries::new();
        let mut resolutions = Vec::with_capacity(pii.len());

        for (field, value) in pii {
            let Some(value) = value.clone().sanitized() else {
                tracing::debug!(unit = %unit, field = %field, "Dropping blank PII value");
                continue;
            };

            let resolution = self.resolve(registry, unit, field, &value, pool);
            replacements.insert(
                field.clone(),
                RedactionEntry::new(value, resolution.dummy.clone()),
            );
            resolutions.push(resolution);
        }

        (replacements, resolutions)
    }

    fn choose(
        &mut self,
        registry: &IdentityRegistry,
        field: &str,
        value: &PiiValue,
        pool: &DummyPool,
    ) -> (String, ResolutionSource) {
        if let Some(entry) = registry.find_by_exact_value(value) {
            return (entry.dummy.clone(), ResolutionSource::Exact);
        }

        if self.fuzzy_tokens {
            let min_len = self.min_token_length;
            let tokens = tokenize(value);
            let query = tokens
                .iter()
                .map(String::as_str)
                .filter(|t| t.len() >= min_len);
            let index = registry.build_token_index(min_len);
            if let Some(found) = index.best_match(query, self.token_threshold) {
                return (
                    found.dummy,
                    ResolutionSource::TokenFuzzy {
                        token: found.token,
                        score: found.score,
                    },
                );
            }
        }

        let used = registry.used_dummies();
        let dummy = self.allocator.allocate(field, pool, &used);
        (dummy, ResolutionSource::Allocated)
    }
}
