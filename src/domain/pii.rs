//! PII values and redaction entries
//!
//! A detected value arrives either as a single string or as an ordered list of
//! OCR variants of the same field. [`PiiValue`] models both shapes so the
//! normalizer, registry and substitution code can consume them uniformly.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from PII field label to detected value
///
/// Field order is declaration order from the detector output and drives the
/// order in which values are resolved.
pub type PiiMap = IndexMap<String, PiiValue>;

/// A detected PII value
///
/// Serialized untagged: a JSON string maps to [`PiiValue::Single`], a JSON
/// array of strings maps to [`PiiValue::Variants`].
///
/// # Examples
///
/// ```
/// use veil::domain::PiiValue;
///
/// let single: PiiValue = serde_json::from_str("\"Begle Peter\"").unwrap();
/// assert_eq!(single, PiiValue::from("Begle Peter"));
///
/// let variants: PiiValue = serde_json::from_str("[\"Begle Peter\", \"Begie Peter\"]").unwrap();
/// assert_eq!(variants.variants().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PiiValue {
    /// One literal value
    Single(String),
    /// Several surface forms of the same value
    Variants(Vec<String>),
}

impl PiiValue {
    /// Iterate over every surface form of the value
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Variants(values) => values.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    /// True when every surface form is empty or whitespace-only
    pub fn is_blank(&self) -> bool {
        self.variants().all(|v| v.trim().is_empty())
    }

    /// Drop blank surface forms, returning `None` if nothing is left
    ///
    /// Kept forms are not trimmed: registry lookups compare originals
    /// literally.
    pub fn sanitized(self) -> Option<Self> {
        match self {
            Self::Single(value) if value.trim().is_empty() => None,
            Self::Single(value) => Some(Self::Single(value)),
            Self::Variants(values) => {
                let kept: Vec<String> = values
                    .into_iter()
                    .filter(|v| !v.trim().is_empty())
                    .collect();
                if kept.is_empty() {
                    None
                } else {
                    Some(Self::Variants(kept))
                }
            }
        }
    }

    /// All surface forms joined by a single space
    pub fn joined(&self) -> String {
        self.variants().collect::<Vec<_>>().join(" ")
    }
}

impl From<&str> for PiiValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for PiiValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for PiiValue {
    fn from(values: Vec<String>) -> Self {
        Self::Variants(values)
    }
}

/// One original → placeholder assignment
///
/// Serialized as `{"original": ..., "dummy": ...}`. Entries created by the
/// variant passes carry `synthetic: true`; they take part in exact lookups and
/// substitution but never feed the token index or the combined mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionEntry {
    /// The real value as detected
    pub original: PiiValue,

    /// Placeholder shown in its place
    pub dummy: String,

    /// Created by a variant pass rather than by the resolver
    #[serde(default, skip_serializing_if = "is_false")]
    pub synthetic: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RedactionEntry {
    /// Create an entry produced by the resolver
    pub fn new(original: impl Into<PiiValue>, dummy: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            dummy: dummy.into(),
            synthetic: false,
        }
    }

    /// Create an entry produced by a variant pass
    pub fn synthetic(original: impl Into<PiiValue>, dummy: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            dummy: dummy.into(),
            synthetic: true,
        }
    }
}
