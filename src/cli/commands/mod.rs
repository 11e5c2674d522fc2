//! CLI command implementations
//!
//! Every command returns its process exit code: 0 on success, 2 for
//! configuration errors, 5 for fatal errors.

pub mod combine;
pub mod init;
pub mod redact;
pub mod validate;
