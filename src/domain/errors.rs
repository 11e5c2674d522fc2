//! Domain error types
//!
//! This module defines the error hierarchy for Veil. Errors are domain-specific
//! and don't expose third-party types to callers.

use thiserror::Error;

/// Main Veil error type
///
/// Most redaction paths degrade instead of failing (sentinel placeholders,
/// skipped units). The variants here cover what cannot be recovered locally:
/// bad configuration, unreadable inputs and fatal run preconditions.
#[derive(Debug, Error)]
pub enum VeilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A document-wide PII source was required but is missing or empty
    #[error("PII source is empty or missing: {0}")]
    MissingPiiSource(String),

    /// The run was aborted before completion (e.g. shutdown signal)
    #[error("Run aborted: {0}")]
    Aborted(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VeilError {
    fn from(err: serde_json::Error) -> Self {
        VeilError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_veil_error_display() {
        let err = VeilError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_missing_pii_source_display() {
        let err = VeilError::MissingPiiSource("combined_pii.json".to_string());
        assert_eq!(
            err.to_string(),
            "PII source is empty or missing: combined_pii.json"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let veil_err: VeilError = io_err.into();
        assert!(matches!(veil_err, VeilError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let veil_err: VeilError = json_err.into();
        assert!(matches!(veil_err, VeilError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let veil_err: VeilError = toml_err.into();
        assert!(matches!(veil_err, VeilError::Configuration(_)));
        assert!(veil_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_veil_error_implements_std_error() {
        let err = VeilError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
