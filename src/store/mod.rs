//! File store for pages, detected values and run outputs
//!
//! Input directory layout:
//!
//! | File | Content |
//! |---|---|
//! | `page_{n}.txt` | extracted text of page `n` |
//! | `pii_page_{n}.json` | `field → string \| [string]` detected on page `n` |
//! | `combined_pii.json` | document-wide detected values |
//! | pool file (configured) | `field → [placeholder]` |
//! | `master_pii.json` | prior registry snapshot |
//!
//! Output directory layout:
//!
//! | File | Content |
//! |---|---|
//! | `master_pii.json` | final registry |
//! | `combined_pii_map.json` | field → entry flattened across pages |
//! | `replace_page_{n}.json` | per-page replacement map |
//! | `page_{n}_sanitized.txt` | per-page redacted text |
//! | `combine_sanitized.txt` | document text with page separators |
//! | `run_report.json` | run statistics |

pub mod input;
pub mod output;

pub use input::{combine_pii_pages, load_pool, load_snapshot, InputStore};
pub use output::OutputStore;

use crate::domain::{Result, VeilError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;

/// Registry snapshot file name
pub const MASTER_MAP_FILE: &str = "master_pii.json";

/// Document-wide detected values file name
pub const COMBINED_PII_FILE: &str = "combined_pii.json";

/// Flattened replacement map file name
pub const COMBINED_MAP_FILE: &str = "combined_pii_map.json";

/// Concatenated redacted document file name
pub const DOCUMENT_TEXT_FILE: &str = "combine_sanitized.txt";

/// Run report file name
pub const REPORT_FILE: &str = "run_report.json";

/// Extracted text file of page `n`
pub fn page_text_file(n: usize) -> String {
    format!("page_{n}.txt")
}

/// Detected values file of page `n`
pub fn page_pii_file(n: usize) -> String {
    format!("pii_page_{n}.json")
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|e| VeilError::Io(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&contents).map_err(|e| {
        VeilError::Serialization(format!("Failed to parse {}: {e}", path.display()))
    })
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        VeilError::Serialization(format!("Failed to serialize {}: {e}", path.display()))
    })?;
    fs::write(path, json)
        .await
        .map_err(|e| VeilError::Io(format!("Failed to write {}: {e}", path.display())))
}
