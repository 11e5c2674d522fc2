//! Substitution engine
//!
//! Applies original → placeholder pairs to text: longest original first,
//! case-insensitive, literal (no pattern meaning), every occurrence.
//!
//! Entries recorded by the variant passes came from whole-word matches and
//! are replayed as whole words, so "Peter" never rewrites "Peterson".
//!
//! Text is held as a sequence of raw and redacted segments. Matching only
//! ever looks inside raw segments, so a placeholder inserted by one pair (or
//! one pass) can never be rewritten by a later one, and no match can straddle
//! a placeholder boundary.

use crate::domain::RedactionEntry;
use regex::{Captures, Regex, RegexBuilder};
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Raw(String),
    Redacted(String),
}

/// One replacement performed on the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Text that was matched
    pub matched: String,
    /// Text it was replaced with
    pub replacement: String,
}

/// Text under redaction, with already-substituted spans protected
///
/// # Examples
///
/// ```
/// use veil::redaction::substitution::RedactedText;
///
/// let mut text = RedactedText::new("John Smith met John");
/// text.replace_literal("John Smith", "Jane Doe");
/// text.replace_literal("John", "Mark");
/// assert_eq!(text.to_string(), "Jane Doe met Mark");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedText {
    segments: Vec<Segment>,
}

impl RedactedText {
    /// Wrap raw text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Raw(text)]
        };
        Self { segments }
    }

    /// Apply every flattened pair of `entries`, longest original first
    ///
    /// Synthetic entries only match as whole words.
    pub fn apply_entries<'a>(
        &mut self,
        entries: impl IntoIterator<Item = &'a RedactionEntry>,
    ) -> Vec<Replacement> {
        let mut applied = Vec::new();
        for (original, dummy, whole_word) in flatten_entries(entries) {
            applied.extend(if whole_word {
                self.replace_word(original, dummy)
            } else {
                self.replace_literal(original, dummy)
            });
        }
        applied
    }

    /// Replace every case-insensitive literal occurrence of `original`
    pub fn replace_literal(&mut self, original: &str, dummy: &str) -> Vec<Replacement> {
        self.replace_escaped(original, dummy, false)
    }

    /// Like [`replace_literal`](Self::replace_literal), but an occurrence
    /// must not be glued to a neighboring letter or digit
    pub fn replace_word(&mut self, original: &str, dummy: &str) -> Vec<Replacement> {
        self.replace_escaped(original, dummy, true)
    }

    fn replace_escaped(
        &mut self,
        original: &str,
        dummy: &str,
        whole_word: bool,
    ) -> Vec<Replacement> {
        if original.trim().is_empty() {
            return Vec::new();
        }

        let mut source = regex::escape(original);
        if whole_word {
            if original.chars().next().is_some_and(char::is_alphanumeric) {
                source.insert_str(0, r"\b");
            }
            if original.chars().last().is_some_and(char::is_alphanumeric) {
                source.push_str(r"\b");
            }
        }

        let pattern = match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping value that cannot be compiled into a matcher");
                return Vec::new();
            }
        };

        self.replace_matches(&pattern, |_| Some(dummy.to_string()))
    }

    /// Replace matches of `pattern` in unprotected text
    ///
    /// `replacement` may decline a match by returning `None`. Empty matches
    /// are ignored.
    pub fn replace_matches<F>(&mut self, pattern: &Regex, mut replacement: F) -> Vec<Replacement>
    where
        F: FnMut(&Captures<'_>) -> Option<String>,
    {
        self.replace_spans(|text| {
            pattern
                .captures_iter(text)
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    if whole.as_str().is_empty() {
                        return None;
                    }
                    replacement(&caps).map(|rep| (whole.range(), rep))
                })
                .collect()
        })
    }

    /// Replace byte spans chosen by `find` in each unprotected segment
    ///
    /// `find` returns spans in ascending order; a span overlapping an earlier
    /// one is skipped.
    pub fn replace_spans<F>(&mut self, mut find: F) -> Vec<Replacement>
    where
        F: FnMut(&str) -> Vec<(Range<usize>, String)>,
    {
        let mut applied = Vec::new();
        let mut segments = Vec::with_capacity(self.segments.len());

        for segment in std::mem::take(&mut self.segments) {
            let text = match segment {
                Segment::Raw(text) => text,
                redacted @ Segment::Redacted(_) => {
                    segments.push(redacted);
                    continue;
                }
            };

            let mut last = 0;
            for (span, replacement) in find(&text) {
                if span.start < last || span.end > text.len() || span.is_empty() {
                    continue;
                }
                if span.start > last {
                    segments.push(Segment::Raw(text[last..span.start].to_string()));
                }
                applied.push(Replacement {
                    matched: text[span.clone()].to_string(),
                    replacement: replacement.clone(),
                });
                segments.push(Segment::Redacted(replacement));
                last = span.end;
            }

            if last < text.len() {
                segments.push(Segment::Raw(text[last..].to_string()));
            }
        }

        self.segments = segments;
        applied
    }

    /// Unprotected text segments, in order
    pub fn raw_segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Raw(text) => Some(text.as_str()),
            Segment::Redacted(_) => None,
        })
    }
}

impl fmt::Display for RedactedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Raw(text) | Segment::Redacted(text) => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

/// Flatten entries into `(original, placeholder)` pairs, longest first
///
/// Variant lists contribute one pair per variant; blank originals are
/// dropped. The sort is stable, so equal-length originals keep entry order.
pub fn replacement_pairs<'a>(
    entries: impl IntoIterator<Item = &'a RedactionEntry>,
) -> Vec<(&'a str, &'a str)> {
    flatten_entries(entries)
        .into_iter()
        .map(|(original, dummy, _)| (original, dummy))
        .collect()
}

/// Pairs plus whether each one only matches whole words
fn flatten_entries<'a>(
    entries: impl IntoIterator<Item = &'a RedactionEntry>,
) -> Vec<(&'a str, &'a str, bool)> {
    let mut pairs: Vec<(&str, &str, bool)> = entries
        .into_iter()
        .flat_map(|entry| {
            entry
                .original
                .variants()
                .map(move |variant| (variant, entry.dummy.as_str(), entry.synthetic))
        })
        .filter(|(original, _, _)| !original.trim().is_empty())
        .collect();

    pairs.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    pairs
}

/// Substitute `entries` into `text` in one pass
///
/// # Examples
///
/// ```
/// use veil::domain::RedactionEntry;
/// use veil::redaction::substitution::substitute;
///
/// let entries = [RedactionEntry::new("John Smith", "Jane Doe")];
/// assert_eq!(substitute("JOHN SMITH arrived", &entries), "Jane Doe arrived");
/// ```
pub fn substitute<'a>(
    text: &str,
    entries: impl IntoIterator<Item = &'a RedactionEntry>,
) -> String {
    let mut redacted = RedactedText::new(text);
    redacted.apply_entries(entries);
    redacted.to_string()
}
