//! Redaction engine configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder used when no pool is configured for a field
pub const DEFAULT_SENTINEL: &str = "REDACTED";

/// Redaction engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Placeholder returned when a field has no configured pool
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    /// Reuse placeholders through token-level fuzzy matching
    #[serde(default = "default_true")]
    pub fuzzy_tokens: bool,

    /// Minimum similarity (0-100) for a token-fuzzy reuse
    #[serde(default = "default_token_threshold")]
    pub token_threshold: u8,

    /// Minimum similarity (0-100) for the whole-phrase name pass
    #[serde(default = "default_phrase_threshold")]
    pub phrase_threshold: u8,

    /// Shortest token that takes part in fuzzy and title matching
    #[serde(default = "default_min_token_length")]
    pub min_token_length: usize,

    /// Seed for placeholder selection (entropy when unset)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Clean OCR whitespace noise before substitution
    #[serde(default = "default_true")]
    pub clean_text: bool,

    /// Run the whole-phrase fuzzy name pass
    #[serde(default = "default_true")]
    pub phrase_pass: bool,

    /// Run the honorific/title pass
    #[serde(default = "default_true")]
    pub title_pass: bool,

    /// Let the title pass use tokens from every field, not just name fields
    #[serde(default)]
    pub title_pass_all_fields: bool,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_token_threshold() -> u8 {
    80
}

fn default_phrase_threshold() -> u8 {
    82
}

fn default_min_token_length() -> usize {
    3
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            fuzzy_tokens: true,
            token_threshold: default_token_threshold(),
            phrase_threshold: default_phrase_threshold(),
            min_token_length: default_min_token_length(),
            seed: None,
            clean_text: true,
            phrase_pass: true,
            title_pass: true,
            title_pass_all_fields: false,
            audit: AuditConfig::default(),
        }
    }
}

impl RedactionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sentinel.trim().is_empty() {
            anyhow::bail!("redaction.sentinel cannot be empty");
        }
        if self.token_threshold == 0 || self.token_threshold > 100 {
            anyhow::bail!(
                "redaction.token_threshold must be in 1..=100, got {}",
                self.token_threshold
            );
        }
        if self.phrase_threshold == 0 || self.phrase_threshold > 100 {
            anyhow::bail!(
                "redaction.phrase_threshold must be in 1..=100, got {}",
                self.phrase_threshold
            );
        }
        if self.min_token_length == 0 {
            anyhow::bail!("redaction.min_token_length must be > 0");
        }

        self.audit.validate().context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_REDACTION_SENTINEL") {
            self.sentinel = val;
        }

        if let Ok(val) = std::env::var("VEIL_REDACTION_FUZZY_TOKENS") {
            self.fuzzy_tokens = val
                .parse()
                .context("Invalid VEIL_REDACTION_FUZZY_TOKENS value")?;
        }

        if let Ok(val) = std::env::var("VEIL_REDACTION_TOKEN_THRESHOLD") {
            self.token_threshold = val
                .parse()
                .context("Invalid VEIL_REDACTION_TOKEN_THRESHOLD value")?;
        }

        if let Ok(val) = std::env::var("VEIL_REDACTION_PHRASE_THRESHOLD") {
            self.phrase_threshold = val
                .parse()
                .context("Invalid VEIL_REDACTION_PHRASE_THRESHOLD value")?;
        }

        if let Ok(val) = std::env::var("VEIL_REDACTION_SEED") {
            self.seed = Some(val.parse().context("Invalid VEIL_REDACTION_SEED value")?);
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/redaction.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("audit.log_path cannot be empty when audit is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_AUDIT_ENABLED") {
            self.enabled = val.parse().context("Invalid VEIL_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("VEIL_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("VEIL_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid VEIL_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}
