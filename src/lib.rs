// Veil - Consistent PII redaction for extracted document text
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - Consistent PII redaction
//!
//! Veil replaces personally identifiable information in scanned or extracted
//! document text with placeholder values, and keeps those placeholders
//! consistent: the same real value gets the same placeholder on every page,
//! even when it reappears with different casing, punctuation, word order,
//! OCR noise, or an honorific in front.
//!
//! ## Overview
//!
//! Veil consumes already-extracted page text and already-detected
//! `(field, value)` pairs. It does not perform OCR or PII detection.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`redaction`] - Resolution, substitution and the variant passes
//! - [`store`] - Page, PII and output files
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veil::config::load_config;
//! use veil::redaction::RedactionEngine;
//! use veil::store::{load_pool, InputStore, OutputStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("veil.toml")?;
//!
//!     let input = InputStore::new(&config.input.dir);
//!     let (units, source) = input.load_units(config.input.pii_mode).await?;
//!     let pool = load_pool(config.input.pool_path.as_deref()).await?;
//!
//!     let engine = RedactionEngine::new(config.redaction.clone(), pool)?;
//!     let output = engine.process_document(units, source)?;
//!
//!     let store = OutputStore::create(&config.output.dir, true).await?;
//!     store.write_run(&output, false).await?;
//!     println!("{}", output.report.format_console());
//!     Ok(())
//! }
//! ```
//!
//! ## Consistency
//!
//! Each detected value is resolved in priority order:
//!
//! 1. **Exact**: a literally equal value seen earlier keeps its placeholder
//! 2. **Token-fuzzy**: a token close enough to a known token ("Smyth" and
//!    "Smith") reuses that token's placeholder
//! 3. **Allocated**: an unused candidate from the field's dummy pool
//!
//! After substitution, every value known so far is enforced on the page, and
//! the variant passes catch reordered names ("Peter Begle"), punctuated or
//! concatenated names ("BEGLE, PETER", "BeglePeter") and title forms
//! ("Mr. Begle").
//!
//! ## Error Handling
//!
//! Veil uses the [`domain::VeilError`] type for library errors. Most
//! conditions degrade instead of failing: a field without a pool gets the
//! sentinel placeholder, and a page without detected values is still
//! enforced against what earlier pages revealed.
//!
//! ## Logging
//!
//! Veil uses structured logging with the `tracing` crate. Detected values
//! never appear in logs; the audit log stores SHA-256 hashes only.

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod redaction;
pub mod store;
