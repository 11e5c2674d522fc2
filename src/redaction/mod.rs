//! Consistent redaction of detected PII in extracted text
//!
//! Every detected value is replaced by a placeholder, and the same real value
//! gets the same placeholder across the whole document set, including when it
//! reappears with different casing, punctuation, word order, OCR noise or an
//! honorific in front.
//!
//! # Architecture
//!
//! - **Normalizer**: canonical comparable form and tokens
//! - **Allocator**: picks placeholders from category pools
//! - **Registry**: append-only record of every decision
//! - **Resolver**: exact reuse, token-fuzzy reuse, then allocation
//! - **Substitution**: longest-first, case-insensitive, span-protected
//! - **Variants**: reordered/concatenated names and title forms
//! - **Engine**: per-unit orchestration, audit and reporting
//!
//! # Usage
//!
//! ```rust,ignore
//! use veil::redaction::{PiiSource, RedactionConfig, RedactionEngine};
//!
//! let engine = RedactionEngine::new(RedactionConfig::default(), pool)?;
//! let output = engine.process_document(units, PiiSource::PerUnit)?;
//! println!("{}", output.report.format_console());
//! ```

pub mod allocator;
pub mod audit;
pub mod config;
pub mod engine;
pub mod normalizer;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod similarity;
pub mod substitution;
pub mod variants;

pub use allocator::{DummyAllocator, DummyPool};
pub use config::RedactionConfig;
pub use engine::{PiiSource, RedactionEngine, RunOutput, SourceUnit, UnitOutcome};
pub use registry::IdentityRegistry;
pub use report::RunReport;
pub use resolver::{RedactionResolver, Resolution, ResolutionSource};
