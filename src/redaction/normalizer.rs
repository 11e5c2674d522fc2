//! Canonical comparable forms of PII values and extracted text
//!
//! Matching across OCR noise works on a reduced alphabet: lower-case ASCII
//! letters separated by single spaces. Everything else (digits, punctuation,
//! accents) becomes a word boundary.

use crate::domain::PiiValue;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Anything that can be normalized
///
/// Implemented for plain strings and for [`PiiValue`], whose variants are
/// joined with a space first.
pub trait NormalizeInput {
    /// The raw text to normalize
    fn raw_text(&self) -> Cow<'_, str>;
}

impl NormalizeInput for str {
    fn raw_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl NormalizeInput for String {
    fn raw_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl NormalizeInput for PiiValue {
    fn raw_text(&self) -> Cow<'_, str> {
        match self {
            PiiValue::Single(value) => Cow::Borrowed(value.as_str()),
            PiiValue::Variants(_) => Cow::Owned(self.joined()),
        }
    }
}

/// Lower-case, map every non `[a-z]` char to a space, collapse and trim
///
/// # Examples
///
/// ```
/// use veil::redaction::normalizer::normalize;
///
/// assert_eq!(normalize("  BEGLE, Peter-J. "), "begle peter j");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize<T: NormalizeInput + ?Sized>(input: &T) -> String {
    let lowered = input.raw_text().to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if c.is_ascii_lowercase() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct normalized tokens of `input`
pub fn tokenize<T: NormalizeInput + ?Sized>(input: &T) -> BTreeSet<String> {
    normalize(input)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Clean whitespace noise left by OCR
///
/// Tabs become spaces, runs of spaces collapse to one, runs of three or more
/// newlines collapse to two, and the result is trimmed.
pub fn clean_extracted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newline_run = 0usize;

    for ch in text.chars() {
        let ch = if ch == '\t' { ' ' } else { ch };
        match ch {
            ' ' if out.ends_with(' ') => continue,
            '\n' => {
                newline_run += 1;
                if newline_run > 2 {
                    continue;
                }
            }
            _ => newline_run = 0,
        }
        out.push(ch);
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("John Smith", "john smith" ; "plain")]
    #[test_case("SMITH,  John", "smith john" ; "comma and case")]
    #[test_case("O'Neil-3rd", "o neil rd" ; "punctuation and digits")]
    #[test_case("\t\n", "" ; "whitespace only")]
    #[test_case("José", "jos" ; "non ascii letters dropped")]
    fn test_normalize(input: &str, expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_normalize_variants_are_joined() {
        let value = PiiValue::Variants(vec!["Begle".to_string(), "PETER".to_string()]);
        assert_eq!(normalize(&value), "begle peter");
    }

    #[test]
    fn test_tokenize_deduplicates() {
        let tokens = tokenize("Smith smith SMITH, John");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("smith"));
        assert!(tokens.contains("john"));
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("1234 ---").is_empty());
    }

    #[test]
    fn test_clean_extracted() {
        let raw = "  Patient:\tBegle   Peter\n\n\n\nVisit  date\n\nend  ";
        assert_eq!(
            clean_extracted(raw),
            "Patient: Begle Peter\n\nVisit date\n\nend"
        );
    }

    #[test]
    fn test_clean_extracted_keeps_double_newline() {
        assert_eq!(clean_extracted("a\n\nb"), "a\n\nb");
        assert_eq!(clean_extracted(""), "");
    }
}
