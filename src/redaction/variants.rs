//! Variant expansion and the variant passes
//!
//! Detected values are literal, but documents mention people in many shapes:
//! "Begle Peter", "Peter Begle", "BEGLE, PETER", "BeglePeter", "Mr. Begle".
//! The passes here run after literal substitution and catch those shapes in
//! the text that is still unredacted.
//!
//! Every replacement made here is recorded into the registry as a synthetic
//! entry, and a form already present in the registry reuses its placeholder.

use crate::domain::{RedactionEntry, UnitKey};
use crate::redaction::config::RedactionConfig;
use crate::redaction::normalizer::{normalize, NormalizeInput};
use crate::redaction::registry::IdentityRegistry;
use crate::redaction::similarity::{similarity, token_sort_similarity};
use crate::redaction::substitution::{RedactedText, Replacement};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::ops::Range;

/// Honorifics recognized in front of a name
pub const HONORIFICS: [&str; 4] = ["mr", "mrs", "ms", "dr"];

/// Field prefix of synthetic entries from the title pass
pub const TITLE_FIELD_PREFIX: &str = "title: ";

/// Field prefix of synthetic entries from the phrase pass
pub const PHRASE_FIELD_PREFIX: &str = "phrase: ";

/// Alternate normalized phrasings of a value
///
/// Two words yield both orders, spaced and concatenated. One word yields
/// itself. Longer values yield only their normalized form.
///
/// # Examples
///
/// ```
/// use veil::redaction::variants::expand;
///
/// let variants: Vec<String> = expand("Begle Peter").into_iter().collect();
/// assert_eq!(variants, ["begle peter", "beglepeter", "peter begle", "peterbegle"]);
/// ```
pub fn expand<T: NormalizeInput + ?Sized>(value: &T) -> BTreeSet<String> {
    let normalized = normalize(value);
    let parts: Vec<&str> = normalized.split_whitespace().collect();

    let mut variants = BTreeSet::new();
    match parts.as_slice() {
        [] => {}
        [single] => {
            variants.insert((*single).to_string());
        }
        [first, last] => {
            variants.insert(format!("{first} {last}"));
            variants.insert(format!("{last} {first}"));
            variants.insert(format!("{first}{last}"));
            variants.insert(format!("{last}{first}"));
        }
        _ => {
            variants.insert(normalized.clone());
        }
    }
    variants
}

/// Whether a field label denotes a person's name
pub fn is_name_field(field: &str) -> bool {
    field.to_lowercase().contains("name")
}

/// The phrase and title passes, configured once per run
#[derive(Debug, Clone)]
pub struct VariantPasses {
    phrase_threshold: u8,
    token_threshold: u8,
    min_token_length: usize,
    title_all_fields: bool,
}

impl VariantPasses {
    /// Create the passes from configuration
    pub fn new(config: &RedactionConfig) -> Self {
        Self {
            phrase_threshold: config.phrase_threshold,
            token_threshold: config.token_threshold,
            min_token_length: config.min_token_length,
            title_all_fields: config.title_pass_all_fields,
        }
    }

    /// Whole-phrase fuzzy pass over name fields
    ///
    /// Windows of consecutive words, separated only by whitespace, commas,
    /// periods or hyphens, are compared with each expanded name variant. A
    /// window at or above the phrase threshold, whose every word is also
    /// within the token threshold of one of the variant's words, is replaced
    /// together with a preceding honorific if there is one.
    pub fn phrase_pass(
        &self,
        text: &mut RedactedText,
        registry: &mut IdentityRegistry,
        unit: &UnitKey,
    ) -> Vec<Replacement> {
        let targets = phrase_targets(registry);
        if targets.is_empty() {
            return Vec::new();
        }

        let known: &IdentityRegistry = registry;
        let applied = text.replace_spans(|segment| {
            self.find_phrase_spans(segment, &targets)
                .into_iter()
                .map(|(span, dummy)| {
                    let replacement = reuse_or(known, &segment[span.clone()], dummy);
                    (span, replacement)
                })
                .collect()
        });

        record_synthetic(registry, unit, PHRASE_FIELD_PREFIX, &applied);
        applied
    }

    /// Honorific/title pass
    ///
    /// Every indexed name token is matched as a whole word, optionally after
    /// "Mr", "Mrs", "Ms" or "Dr" (with or without a period). The match becomes
    /// the honorific, a period and a space, then the second word of the
    /// placeholder (the whole placeholder when it has one word).
    pub fn title_pass(
        &self,
        text: &mut RedactedText,
        registry: &mut IdentityRegistry,
        unit: &UnitKey,
    ) -> Vec<Replacement> {
        let all_fields = self.title_all_fields;
        let index =
            registry.build_token_index_where(self.min_token_length, |f| all_fields || is_name_field(f));

        let mut applied = Vec::new();
        for (token, dummy) in index.iter() {
            let pattern = match title_pattern(token) {
                Ok(pattern) => pattern,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping token that cannot be compiled into a matcher");
                    continue;
                }
            };
            let surname = dummy.split_whitespace().nth(1).unwrap_or(dummy);

            let known: &IdentityRegistry = registry;
            applied.extend(text.replace_matches(&pattern, |caps| {
                let matched = caps.get(0)?.as_str();
                let proposed = match caps.get(1) {
                    Some(honorific) => format!("{}. {surname}", honorific.as_str()),
                    None => surname.to_string(),
                };
                Some(reuse_or(known, matched, proposed))
            }));
        }

        record_synthetic(registry, unit, TITLE_FIELD_PREFIX, &applied);
        applied
    }

    fn find_phrase_spans(
        &self,
        segment: &str,
        targets: &[(String, String)],
    ) -> Vec<(Range<usize>, String)> {
        let words = word_spans(segment);
        let lowered: Vec<String> = words
            .iter()
            .map(|w| segment[w.clone()].to_ascii_lowercase())
            .collect();
        let mut taken = vec![false; words.len()];
        let mut spans = Vec::new();

        for (target, dummy) in targets {
            let width = target.split_whitespace().count();
            if width == 0 || width > words.len() || target.len() < self.min_token_length {
                continue;
            }

            for start in 0..=(words.len() - width) {
                let end = start + width;
                if taken[start..end].iter().any(|t| *t) {
                    continue;
                }
                let separated = (start..end - 1)
                    .all(|i| is_name_separator(&segment[words[i].end..words[i + 1].start]));
                if !separated {
                    continue;
                }

                let window = lowered[start..end].join(" ");
                if token_sort_similarity(&window, target) < self.phrase_threshold {
                    continue;
                }
                if !self.words_match(&lowered[start..end], target) {
                    continue;
                }

                let mut span = words[start].start..words[end - 1].end;
                let mut replacement = dummy.clone();
                if start > 0 && !taken[start - 1] {
                    let previous = &words[start - 1];
                    let gap = &segment[previous.end..words[start].start];
                    if HONORIFICS.contains(&lowered[start - 1].as_str()) && is_honorific_gap(gap) {
                        replacement = format!("{}. {dummy}", &segment[previous.clone()]);
                        span.start = previous.start;
                        taken[start - 1] = true;
                    }
                }

                taken[start..end].iter_mut().for_each(|t| *t = true);
                spans.push((span, replacement));
            }
        }

        spans.sort_by_key(|(span, _)| span.start);
        spans
    }

    /// Every window word is close to some word of `target` on its own
    fn words_match(&self, window: &[String], target: &str) -> bool {
        window.iter().all(|word| {
            target
                .split_whitespace()
                .any(|token| similarity(word, token) >= self.token_threshold)
        })
    }
}

/// Expanded name variants with their placeholders, widest first
fn phrase_targets(registry: &IdentityRegistry) -> Vec<(String, String)> {
    let mut targets: IndexMap<String, String> = IndexMap::new();
    for (_, field, entry) in registry.entries_with_keys() {
        if entry.synthetic || !is_name_field(field) {
            continue;
        }
        for original in entry.original.variants() {
            for variant in expand(original) {
                targets.entry(variant).or_insert_with(|| entry.dummy.clone());
            }
        }
    }

    let mut targets: Vec<(String, String)> = targets.into_iter().collect();
    targets.sort_by(|a, b| {
        let width = |t: &str| t.split_whitespace().count();
        width(&b.0)
            .cmp(&width(&a.0))
            .then_with(|| b.0.len().cmp(&a.0.len()))
    });
    targets
}

/// Byte spans of ASCII letter runs
fn word_spans(segment: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in segment.char_indices() {
        match (c.is_ascii_alphabetic(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..segment.len());
    }
    spans
}

fn title_pattern(token: &str) -> Result<Regex, regex::Error> {
    let alternatives = HONORIFICS.join("|");
    RegexBuilder::new(&format!(
        r"(?:\b({alternatives})\.?\s+)?\b{}\b",
        regex::escape(token)
    ))
    .case_insensitive(true)
    .build()
}

fn is_name_separator(gap: &str) -> bool {
    gap.chars()
        .all(|c| c.is_whitespace() || matches!(c, ',' | '.' | '-'))
}

fn is_honorific_gap(gap: &str) -> bool {
    let rest = gap.strip_prefix('.').unwrap_or(gap);
    !rest.is_empty() && rest.chars().all(char::is_whitespace)
}

/// Placeholder already registered for `matched`, else `proposed`
fn reuse_or(registry: &IdentityRegistry, matched: &str, proposed: String) -> String {
    registry
        .find_by_exact_value(&matched.into())
        .map(|entry| entry.dummy.clone())
        .unwrap_or(proposed)
}

fn record_synthetic(
    registry: &mut IdentityRegistry,
    unit: &UnitKey,
    prefix: &str,
    applied: &[Replacement],
) {
    for replacement in applied {
        registry.record(
            unit,
            format!("{prefix}{}", replacement.matched),
            RedactionEntry::synthetic(replacement.matched.as_str(), replacement.replacement.clone()),
        );
    }
    if !applied.is_empty() {
        tracing::debug!(
            unit = %unit,
            pass = prefix.trim_end_matches([':', ' ']),
            count = applied.len(),
            "Variant pass replacements recorded"
        );
    }
}
