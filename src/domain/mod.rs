//! Domain models and types for Veil.
//!
//! The domain layer provides:
//! - **Detected values** ([`PiiValue`], [`PiiMap`])
//! - **Assignments** ([`RedactionEntry`])
//! - **Unit identifiers** ([`UnitKey`])
//! - **Error types** ([`VeilError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, VeilError>`]:
//!
//! ```rust
//! use veil::domain::{Result, UnitKey, VeilError};
//!
//! fn parse_unit(raw: &str) -> Result<UnitKey> {
//!     UnitKey::new(raw).map_err(VeilError::Validation)
//! }
//! # assert!(parse_unit("page_1").is_ok());
//! ```

pub mod errors;
pub mod pii;
pub mod result;
pub mod unit;

// Re-export commonly used types for convenience
pub use errors::VeilError;
pub use pii::{PiiMap, PiiValue, RedactionEntry};
pub use result::Result;
pub use unit::UnitKey;
