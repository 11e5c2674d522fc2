//! Run reporting for redaction
//!
//! Summarizes what a run decided without repeating any original value:
//! counts per resolution source, replacement counts per pass, skipped units
//! and warnings.

use crate::redaction::engine::UnitOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics for one redaction run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier (matches the audit log)
    pub run_id: Option<String>,

    /// Whether text was left unchanged
    pub dry_run: bool,

    /// Units processed (skipped ones included)
    pub units_processed: usize,

    /// Units without detected PII
    pub units_skipped: usize,

    /// Detected values resolved
    pub values_resolved: usize,

    /// Resolutions per source label
    pub resolutions_by_source: BTreeMap<String, usize>,

    /// Occurrences replaced by the literal and enforcement passes
    pub literal_replacements: usize,

    /// Occurrences replaced by the whole-phrase pass
    pub phrase_replacements: usize,

    /// Occurrences replaced by the title pass
    pub title_replacements: usize,

    /// Registry size at the end of the run
    pub registry_entries: usize,

    /// Per-unit summaries in document order
    pub units: Vec<UnitSummary>,

    /// Conditions worth a second look
    pub warnings: Vec<String>,

    /// Processing statistics
    pub stats: ProcessingStats,
}

/// Counts for one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    /// Unit key
    pub unit: String,
    /// Values resolved
    pub resolved: usize,
    /// Replacements across all passes
    pub replacements: usize,
    /// No detected PII for this unit
    pub skipped: bool,
}

/// Processing statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Average processing time per unit (ms)
    pub avg_processing_time_ms: u64,

    /// Total processing time (ms)
    pub total_processing_time_ms: u64,
}

impl RunReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the outcome of one unit
    pub fn add_unit(&mut self, outcome: &UnitOutcome, processing_time_ms: u64) {
        self.units_processed += 1;
        self.stats.total_processing_time_ms += processing_time_ms;
        self.stats.avg_processing_time_ms =
            self.stats.total_processing_time_ms / self.units_processed as u64;

        if outcome.skipped {
            self.units_skipped += 1;
            self.add_warning(format!(
                "{}: no detected PII, resolution skipped",
                outcome.unit
            ));
        }

        self.values_resolved += outcome.resolutions.len();
        for resolution in &outcome.resolutions {
            *self
                .resolutions_by_source
                .entry(resolution.source.label().to_string())
                .or_insert(0) += 1;
        }

        self.literal_replacements += outcome.literal_replacements;
        self.phrase_replacements += outcome.phrase_replacements.len();
        self.title_replacements += outcome.title_replacements.len();

        self.units.push(UnitSummary {
            unit: outcome.unit.to_string(),
            resolved: outcome.resolutions.len(),
            replacements: outcome.total_replacements(),
            skipped: outcome.skipped,
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Total replacements across all passes
    pub fn total_replacements(&self) -> usize {
        self.literal_replacements + self.phrase_replacements + self.title_replacements
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();
        let rule = "───────────────────────────────────────────────────────────────\n";

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        if self.dry_run {
            output.push_str("                  REDACTION DRY-RUN REPORT                     \n");
        } else {
            output.push_str("                    REDACTION RUN REPORT                       \n");
        }
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str(rule);
        if let Some(run_id) = &self.run_id {
            output.push_str(&format!("  Run ID:                      {run_id}\n"));
        }
        output.push_str(&format!(
            "  Units Processed:             {}\n",
            self.units_processed
        ));
        output.push_str(&format!(
            "  Units Skipped (no PII):      {}\n",
            self.units_skipped
        ));
        output.push_str(&format!(
            "  Values Resolved:             {}\n",
            self.values_resolved
        ));
        output.push_str(&format!(
            "  Total Replacements:          {}\n",
            self.total_replacements()
        ));
        output.push_str(&format!(
            "  Registry Entries:            {}\n",
            self.registry_entries
        ));
        output.push_str(&format!(
            "  Avg Processing Time:         {} ms\n",
            self.stats.avg_processing_time_ms
        ));
        output.push('\n');

        if !self.resolutions_by_source.is_empty() {
            output.push_str("🔍 RESOLUTIONS BY SOURCE\n");
            output.push_str(rule);
            let mut sources: Vec<_> = self.resolutions_by_source.iter().collect();
            sources.sort_by(|a, b| b.1.cmp(a.1));
            for (source, count) in sources {
                output.push_str(&format!("  {source:30} {count:>5}\n"));
            }
            output.push('\n');
        }

        output.push_str("📝 REPLACEMENTS BY PASS\n");
        output.push_str(rule);
        output.push_str(&format!(
            "  {:30} {:>5}\n",
            "literal + enforcement", self.literal_replacements
        ));
        output.push_str(&format!("  {:30} {:>5}\n", "phrase", self.phrase_replacements));
        output.push_str(&format!("  {:30} {:>5}\n", "title", self.title_replacements));
        output.push('\n');

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str(rule);
            for warning in &self.warnings {
                output.push_str(&format!("  • {warning}\n"));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write report to file
    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.format_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitKey;
    use crate::redaction::resolver::{Resolution, ResolutionSource};

    fn resolved_outcome() -> UnitOutcome {
        let mut outcome = UnitOutcome::new(UnitKey::page(1), String::new());
        outcome.resolutions = vec![
            Resolution {
                field: "Patient Name".to_string(),
                dummy: "Jane Doe".to_string(),
                source: ResolutionSource::Allocated,
            },
            Resolution {
                field: "Name".to_string(),
                dummy: "Jane Doe".to_string(),
                source: ResolutionSource::Exact,
            },
        ];
        outcome.literal_replacements = 3;
        outcome
    }

    #[test]
    fn test_report_creation() {
        let report = RunReport::new();
        assert_eq!(report.units_processed, 0);
        assert!(report.resolutions_by_source.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_add_unit() {
        let mut report = RunReport::new();
        report.add_unit(&resolved_outcome(), 10);

        assert_eq!(report.units_processed, 1);
        assert_eq!(report.values_resolved, 2);
        assert_eq!(report.resolutions_by_source.get("exact"), Some(&1));
        assert_eq!(report.resolutions_by_source.get("allocated"), Some(&1));
        assert_eq!(report.total_replacements(), 3);
        assert_eq!(report.stats.avg_processing_time_ms, 10);
        assert_eq!(report.units[0].replacements, 3);
    }

    #[test]
    fn test_skipped_unit_adds_warning() {
        let mut report = RunReport::new();
        let mut outcome = UnitOutcome::new(UnitKey::page(4), String::new());
        outcome.skipped = true;

        report.add_unit(&outcome, 0);

        assert_eq!(report.units_skipped, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("page_4"));
    }

    #[test]
    fn test_format_console() {
        let mut report = RunReport::new();
        report.add_unit(&resolved_outcome(), 4);
        report.dry_run = true;

        let output = report.format_console();
        assert!(output.contains("REDACTION DRY-RUN REPORT"));
        assert!(output.contains("Units Processed:             1"));
        assert!(output.contains("allocated"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_report.json");
        let mut report = RunReport::new();
        report.add_unit(&resolved_outcome(), 1);

        report.write_to_file(&path).unwrap();

        let restored: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored.values_resolved, 2);
    }
}
