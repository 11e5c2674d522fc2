//! Processing unit identifiers
//!
//! A unit is one independently extracted block of text, in practice a page.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Processing unit key newtype wrapper
///
/// Page keys render as `page_{n}`, the label used in registry snapshots.
///
/// # Examples
///
/// ```
/// use veil::domain::UnitKey;
///
/// let key = UnitKey::page(7);
/// assert_eq!(key.as_str(), "page_7");
/// assert_eq!(key.ordinal(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitKey(String);

impl UnitKey {
    /// Creates a new UnitKey from a string
    ///
    /// Returns `Err` if the key is empty or whitespace-only.
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Unit key cannot be empty".to_string());
        }
        Ok(Self(key))
    }

    /// Key for the 1-based page number `number`
    pub fn page(number: usize) -> Self {
        Self(format!("page_{number}"))
    }

    /// Trailing number of the key, if any
    pub fn ordinal(&self) -> Option<usize> {
        let digits_start = self
            .0
            .rfind(|c: char| !c.is_ascii_digit())
            .map_or(0, |idx| idx + 1);
        self.0[digits_start..].parse().ok()
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UnitKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for UnitKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UnitKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_key_empty_rejected() {
        assert!(UnitKey::new("").is_err());
        assert!(UnitKey::new("   ").is_err());
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(UnitKey::page(12).ordinal(), Some(12));
        assert_eq!(UnitKey::new("page 3").unwrap().ordinal(), Some(3));
        assert_eq!(UnitKey::new("cover").unwrap().ordinal(), None);
        assert_eq!(UnitKey::new("42").unwrap().ordinal(), Some(42));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let key = UnitKey::page(1);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"page_1\"");
        let back: UnitKey = serde_json::from_str("\"page_1\"").unwrap();
        assert_eq!(back, key);
    }
}
