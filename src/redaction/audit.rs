//! Audit logger for redaction runs
//!
//! One entry per processed unit. Originals are only ever written as SHA-256
//! hashes; placeholders and field labels are written as-is.

use crate::domain::PiiValue;
use crate::redaction::config::AuditConfig;
use crate::redaction::engine::UnitOutcome;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    run_id: String,
    unit: String,
    skipped: bool,
    dry_run: bool,
    decisions_count: usize,
    phrase_replacements: usize,
    title_replacements: usize,
    decisions: Vec<AuditDecision>,
}

/// One resolution decision (with hashed original)
#[derive(Debug, Serialize)]
struct AuditDecision {
    field: String,
    source: &'static str,
    dummy: String,
    /// SHA-256 hash of the original value
    value_hash: String,
}

/// Audit logger for redaction runs
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
    run_id: Uuid,
}

impl AuditLogger {
    /// Create a new audit logger with a fresh run id
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
            run_id: Uuid::new_v4(),
        })
    }

    /// Create a logger from configuration, `None` when auditing is disabled
    pub fn from_config(config: &AuditConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(config.log_path.clone(), config.json_format, true).map(Some)
    }

    /// Identifier shared by every entry of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Log the decisions made for one unit
    pub fn log_unit(&self, outcome: &UnitOutcome, dry_run: bool) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let decisions = outcome
            .resolutions
            .iter()
            .map(|resolution| AuditDecision {
                field: resolution.field.clone(),
                source: resolution.source.label(),
                dummy: resolution.dummy.clone(),
                value_hash: outcome
                    .replacements
                    .get(&resolution.field)
                    .map(|entry| hash_pii_value(&entry.original))
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id: self.run_id.to_string(),
            unit: outcome.unit.to_string(),
            skipped: outcome.skipped,
            dry_run,
            decisions_count: decisions.len(),
            phrase_replacements: outcome.phrase_replacements.len(),
            title_replacements: outcome.title_replacements.len(),
            decisions,
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Run: {} | Unit: {} | Decisions: {} | Phrase: {} | Title: {} | Skipped: {}",
                entry.timestamp,
                entry.run_id,
                entry.unit,
                entry.decisions_count,
                entry.phrase_replacements,
                entry.title_replacements,
                entry.skipped
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hash a detected value using SHA-256
///
/// Variant lists are hashed over their newline-joined variants.
pub fn hash_pii_value(value: &PiiValue) -> String {
    let mut hasher = Sha256::new();
    for (i, variant) in value.variants().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(variant.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
