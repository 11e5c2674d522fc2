//! Configuration management for Veil.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Veil uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VEIL_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run mode
//! - [`RedactionConfig`](crate::redaction::RedactionConfig) - Thresholds, passes, seed, audit
//! - [`InputConfig`] - Page/PII directory, dummy pool, snapshot
//! - [`OutputConfig`] - Output directory
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [redaction]
//! token_threshold = 80
//! phrase_threshold = 82
//!
//! [redaction.audit]
//! log_path = "./audit/redaction.log"
//!
//! [input]
//! dir = "${VEIL_INPUT_ROOT}/scan_001"
//! pool_path = "./dummy_pool.json"
//! pii_mode = "per_page"
//!
//! [output]
//! dir = "./redacted"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{ApplicationConfig, InputConfig, LoggingConfig, OutputConfig, PiiMode, VeilConfig};
