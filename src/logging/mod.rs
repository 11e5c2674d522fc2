//! Logging and observability
//!
//! Structured logging with:
//! - Console output
//! - JSON-formatted local file logs with rotation
//! - Configurable log levels (`RUST_LOG` wins when set)
//!
//! Log fields carry unit keys, field labels, resolution sources and counts.
//! Detected values themselves are never logged.
//!
//! # Example
//!
//! ```no_run
//! use veil::logging::init_logging;
//! use veil::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(unit = "page_1", "Unit redacted");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log progress through the units of a document
///
/// # Example
///
/// ```no_run
/// use veil::log_unit_progress;
///
/// log_unit_progress!(3, 12);
/// ```
#[macro_export]
macro_rules! log_unit_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Loading units"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use veil::log_error_with_context;
/// use veil::domain::VeilError;
///
/// let error = VeilError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
