//! Redaction engine
//!
//! This module provides the [`RedactionEngine`] that runs the redaction
//! pipeline over the units of a document, in document order.
//!
//! # Pipeline
//!
//! For every unit:
//! 1. **Clean** OCR whitespace noise (optional)
//! 2. **Resolve** each detected value to a placeholder, recording it in the
//!    identity registry
//! 3. **Substitute** the unit's own replacement map
//! 4. **Enforce** every value the registry knows so far, from any unit
//! 5. **Variant passes**: whole-phrase fuzzy names, then honorific/title forms
//!
//! Placeholders inserted by any step are protected from every later step.
//!
//! # Examples
//!
//! ```
//! use veil::domain::{PiiMap, PiiValue, UnitKey};
//! use veil::redaction::{DummyPool, RedactionConfig, RedactionEngine};
//!
//! # fn example() -> veil::domain::Result<()> {
//! let mut config = RedactionConfig::default();
//! config.audit.enabled = false;
//!
//! let pool: DummyPool = [("Patient Name", vec!["Jane Doe".to_string()])]
//!     .into_iter()
//!     .collect();
//! let mut engine = RedactionEngine::new(config, pool)?;
//!
//! let mut pii = PiiMap::new();
//! pii.insert("Patient Name".to_string(), PiiValue::from("Begle Peter"));
//!
//! let outcome = engine.process_unit(
//!     &UnitKey::page(1),
//!     "Patient: Begle Peter. Mr. Begle returned.",
//!     &pii,
//! )?;
//! assert_eq!(outcome.text, "Patient: Jane Doe. Mr. Doe returned.");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::domain::{PiiMap, PiiValue, Result, UnitKey, VeilError};
use crate::redaction::allocator::DummyPool;
use crate::redaction::audit::AuditLogger;
use crate::redaction::config::RedactionConfig;
use crate::redaction::normalizer::clean_extracted;
use crate::redaction::registry::{CombinedMap, IdentityRegistry, UnitEntries};
use crate::redaction::report::RunReport;
use crate::redaction::resolver::{RedactionResolver, Resolution};
use crate::redaction::substitution::{RedactedText, Replacement};
use crate::redaction::variants::VariantPasses;
use std::time::Instant;
use tokio::sync::watch;

/// One unit of extracted text with the values detected in it
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Unit key (`page_{n}`)
    pub key: UnitKey,
    /// Extracted text
    pub text: String,
    /// Values detected in this unit
    pub pii: PiiMap,
}

/// Where detected values come from
#[derive(Debug, Clone)]
pub enum PiiSource {
    /// Each unit carries its own map
    PerUnit,
    /// One map applies to every unit
    DocumentWide(PiiMap),
}

/// Result of processing one unit
#[derive(Debug, Clone)]
pub struct UnitOutcome {
    /// Unit key
    pub unit: UnitKey,
    /// Redacted text (unchanged input in dry-run mode)
    pub text: String,
    /// Field → entry map resolved for this unit
    pub replacements: UnitEntries,
    /// Individual resolution decisions, in field order
    pub resolutions: Vec<Resolution>,
    /// Occurrences replaced by the unit map and the enforcement pass
    pub literal_replacements: usize,
    /// Replacements made by the whole-phrase pass
    pub phrase_replacements: Vec<Replacement>,
    /// Replacements made by the title pass
    pub title_replacements: Vec<Replacement>,
    /// No detected PII, resolution was skipped
    pub skipped: bool,
}

impl UnitOutcome {
    /// Empty outcome carrying `text` unchanged
    pub fn new(unit: UnitKey, text: String) -> Self {
        Self {
            unit,
            text,
            replacements: UnitEntries::new(),
            resolutions: Vec::new(),
            literal_replacements: 0,
            phrase_replacements: Vec::new(),
            title_replacements: Vec::new(),
            skipped: false,
        }
    }

    /// Replacements across all passes
    pub fn total_replacements(&self) -> usize {
        self.literal_replacements + self.phrase_replacements.len() + self.title_replacements.len()
    }
}

/// Everything a document run produces
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Final registry (the master mapping)
    pub registry: IdentityRegistry,
    /// Field → entry mapping flattened across units
    pub combined: CombinedMap,
    /// Per-unit outcomes in document order
    pub outcomes: Vec<UnitOutcome>,
    /// Redacted units joined with page separators
    pub document_text: String,
    /// Run statistics
    pub report: RunReport,
}

/// Separator written before each unit of the document text
pub fn page_separator(number: usize) -> String {
    format!("\n\n===== PAGE {number} =====\n\n")
}

/// Redaction engine
///
/// Owns the identity registry for the duration of one run. Units must be
/// processed in document order: exact lookups favor the earliest entry.
pub struct RedactionEngine {
    config: RedactionConfig,
    pool: DummyPool,
    registry: IdentityRegistry,
    resolver: RedactionResolver,
    passes: VariantPasses,
    audit_logger: Option<AuditLogger>,
    report: RunReport,
    dry_run: bool,
    shutdown_signal: Option<watch::Receiver<bool>>,
}

impl RedactionEngine {
    /// Create a new engine with an empty registry
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the audit log
    /// cannot be prepared.
    pub fn new(config: RedactionConfig, pool: DummyPool) -> Result<Self> {
        config
            .validate()
            .map_err(|e| VeilError::Configuration(format!("{e:#}")))?;

        let audit_logger = AuditLogger::from_config(&config.audit)
            .map_err(|e| VeilError::Io(format!("{e:#}")))?;

        let report = RunReport {
            run_id: audit_logger.as_ref().map(|l| l.run_id().to_string()),
            ..RunReport::default()
        };

        if pool.is_empty() {
            tracing::warn!(
                sentinel = %config.sentinel,
                "Dummy pool is empty; every new value will get the sentinel"
            );
        }

        Ok(Self {
            resolver: RedactionResolver::new(&config),
            passes: VariantPasses::new(&config),
            config,
            pool,
            registry: IdentityRegistry::new(),
            audit_logger,
            report,
            dry_run: false,
            shutdown_signal: None,
        })
    }

    /// Resume from a prior registry snapshot
    pub fn with_registry(mut self, registry: IdentityRegistry) -> Self {
        tracing::info!(entries = registry.len(), "Resuming from registry snapshot");
        self.registry = registry;
        self
    }

    /// Compute and report decisions without changing any text
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self.report.dry_run = dry_run;
        self
    }

    /// Abort between units once `signal` turns true
    pub fn with_shutdown(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Registry state so far
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Report so far
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Redact one unit
    ///
    /// A unit without any non-blank detected value skips resolution, but the
    /// enforcement and variant passes still run against what the registry
    /// already knows.
    pub fn process_unit(&mut self, unit: &UnitKey, text: &str, pii: &PiiMap) -> Result<UnitOutcome> {
        let start = Instant::now();

        let cleaned = if self.config.clean_text {
            clean_extracted(text)
        } else {
            text.to_string()
        };

        let mut outcome = UnitOutcome::new(unit.clone(), String::new());
        outcome.skipped = pii.values().all(PiiValue::is_blank);

        if outcome.skipped {
            tracing::warn!(unit = %unit, "No detected PII for unit, skipping resolution");
        } else {
            let (replacements, resolutions) =
                self.resolver
                    .resolve_unit(&mut self.registry, unit, pii, &self.pool);
            outcome.replacements = replacements;
            outcome.resolutions = resolutions;
        }

        let mut redacted = RedactedText::new(cleaned);
        outcome.literal_replacements += redacted.apply_entries(outcome.replacements.values()).len();
        outcome.literal_replacements += redacted.apply_entries(self.registry.entries()).len();

        if self.config.phrase_pass {
            outcome.phrase_replacements =
                self.passes
                    .phrase_pass(&mut redacted, &mut self.registry, unit);
        }
        if self.config.title_pass {
            outcome.title_replacements =
                self.passes
                    .title_pass(&mut redacted, &mut self.registry, unit);
        }

        outcome.text = if self.dry_run {
            text.to_string()
        } else {
            redacted.to_string()
        };

        tracing::info!(
            unit = %unit,
            resolved = outcome.resolutions.len(),
            replacements = outcome.total_replacements(),
            skipped = outcome.skipped,
            "Unit redacted"
        );

        if let Some(ref logger) = self.audit_logger {
            logger
                .log_unit(&outcome, self.dry_run)
                .map_err(|e| VeilError::Io(format!("{e:#}")))?;
        }

        self.report
            .add_unit(&outcome, start.elapsed().as_millis() as u64);

        Ok(outcome)
    }

    /// Redact every unit of a document and assemble the run output
    ///
    /// # Errors
    ///
    /// - [`VeilError::MissingPiiSource`] when a document-wide map has no
    ///   usable value; nothing is processed
    /// - [`VeilError::Aborted`] when the shutdown signal fires between units
    pub fn process_document(
        mut self,
        units: Vec<SourceUnit>,
        source: PiiSource,
    ) -> Result<RunOutput> {
        if let PiiSource::DocumentWide(ref pii) = source {
            if pii.values().all(PiiValue::is_blank) {
                return Err(VeilError::MissingPiiSource(
                    "document-wide PII map has no values".to_string(),
                ));
            }
        }

        tracing::info!(units = units.len(), dry_run = self.dry_run, "Starting redaction run");

        let mut outcomes = Vec::with_capacity(units.len());
        let mut document_text = String::new();

        for (index, unit) in units.into_iter().enumerate() {
            if self.shutdown_requested() {
                tracing::warn!(unit = %unit.key, "Shutdown requested, aborting run");
                return Err(VeilError::Aborted(format!(
                    "shutdown requested before {}",
                    unit.key
                )));
            }

            let pii = match &source {
                PiiSource::PerUnit => &unit.pii,
                PiiSource::DocumentWide(pii) => pii,
            };
            let outcome = self.process_unit(&unit.key, &unit.text, pii)?;

            let number = unit.key.ordinal().unwrap_or(index + 1);
            document_text.push_str(&page_separator(number));
            document_text.push_str(&outcome.text);
            outcomes.push(outcome);
        }

        Ok(self.finish(outcomes, document_text))
    }

    fn finish(mut self, outcomes: Vec<UnitOutcome>, document_text: String) -> RunOutput {
        self.report.registry_entries = self.registry.len();

        tracing::info!(
            units = self.report.units_processed,
            skipped = self.report.units_skipped,
            replacements = self.report.total_replacements(),
            registry_entries = self.report.registry_entries,
            "Redaction run complete"
        );

        RunOutput {
            combined: self.registry.combined(),
            registry: self.registry,
            outcomes,
            document_text,
            report: self.report,
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }
}
