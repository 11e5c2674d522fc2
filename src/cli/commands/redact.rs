//! Redact command implementation
//!
//! This module implements the `redact` command: load pages and detected
//! values, run the redaction engine, and write the outputs.

use crate::config::{load_config, PiiMode, VeilConfig};
use crate::domain::VeilError;
use crate::redaction::{RedactionEngine, RunOutput};
use crate::store::{load_pool, load_snapshot, InputStore, OutputStore};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Override the input directory
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the dummy pool file
    #[arg(long)]
    pub pool: Option<PathBuf>,

    /// Override where detected values come from (per_page or document)
    #[arg(long, value_name = "MODE")]
    pub pii_mode: Option<String>,

    /// Resume from a registry snapshot (master_pii.json)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Seed placeholder selection for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Dry run mode - report decisions without writing redacted text
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RedactArgs {
    /// Execute the redact command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting redact command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            eprintln!("{e}");
            return Ok(2);
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no redacted text will be written");
            println!("🔍 DRY RUN MODE - No redacted text will be written");
            println!();
        }

        println!("📂 Loading pages from {}", config.input.dir.display());
        let input = InputStore::new(&config.input.dir);
        let (units, source) = match input.load_units(config.input.pii_mode).await {
            Ok(loaded) => loaded,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to load input");
                eprintln!("Failed to load input: {e}");
                return Ok(5);
            }
        };

        let pool = match load_pool(config.input.pool_path.as_deref()).await {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Failed to load dummy pool: {e}");
                return Ok(5);
            }
        };

        let mut engine = match RedactionEngine::new(config.redaction.clone(), pool) {
            Ok(engine) => engine,
            Err(e @ VeilError::Configuration(_)) => {
                eprintln!("{e}");
                return Ok(2);
            }
            Err(e) => {
                eprintln!("Failed to initialize redaction: {e}");
                return Ok(5);
            }
        };

        if let Some(ref snapshot) = config.input.snapshot {
            match load_snapshot(snapshot).await {
                Ok(registry) => engine = engine.with_registry(registry),
                Err(e) => {
                    eprintln!("Failed to load snapshot {}: {e}", snapshot.display());
                    return Ok(5);
                }
            }
        }

        let engine = engine.dry_run(dry_run).with_shutdown(shutdown_signal);

        println!("🚀 Redacting {} page(s)...", units.len());
        let output: RunOutput =
            match tokio::task::spawn_blocking(move || engine.process_document(units, source))
                .await?
            {
                Ok(output) => output,
                Err(VeilError::Aborted(reason)) => {
                    tracing::warn!(reason = %reason, "Run aborted, no outputs written");
                    println!("⚠️  Run aborted ({reason}); no outputs written");
                    return Ok(5);
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, "Redaction failed");
                    eprintln!("Redaction failed: {e}");
                    return Ok(5);
                }
            };

        let store = OutputStore::create(&config.output.dir, config.output.per_unit_files).await?;
        let written = store.write_run(&output, dry_run).await?;

        if self.json {
            println!("{}", output.report.format_json()?);
        } else {
            print!("{}", output.report.format_console());
            println!("✅ Wrote {} file(s) to {}", written.len(), store.dir().display());
        }

        Ok(0)
    }

    fn apply_overrides(&self, config: &mut VeilConfig) -> Result<(), String> {
        if let Some(ref input) = self.input {
            tracing::info!(input = %input.display(), "Overriding input directory from CLI");
            config.input.dir = input.clone();
        }
        if let Some(ref output) = self.output {
            tracing::info!(output = %output.display(), "Overriding output directory from CLI");
            config.output.dir = output.clone();
        }
        if let Some(ref pool) = self.pool {
            config.input.pool_path = Some(pool.clone());
        }
        if let Some(ref mode) = self.pii_mode {
            tracing::info!(mode = %mode, "Overriding PII mode from CLI");
            config.input.pii_mode = mode.parse::<PiiMode>()?;
        }
        if let Some(ref snapshot) = self.snapshot {
            config.input.snapshot = Some(snapshot.clone());
        }
        if let Some(seed) = self.seed {
            config.redaction.seed = Some(seed);
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RedactArgs {
        RedactArgs {
            input: Some(PathBuf::from("./scans")),
            output: None,
            pool: Some(PathBuf::from("./pool.json")),
            pii_mode: Some("document".to_string()),
            snapshot: None,
            seed: Some(3),
            dry_run: true,
            json: false,
        }
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = VeilConfig::default();
        args().apply_overrides(&mut config).unwrap();

        assert_eq!(config.input.dir, PathBuf::from("./scans"));
        assert_eq!(config.input.pool_path, Some(PathBuf::from("./pool.json")));
        assert_eq!(config.input.pii_mode, PiiMode::Document);
        assert_eq!(config.redaction.seed, Some(3));
        assert!(config.application.dry_run);
        assert_eq!(config.output.dir, PathBuf::from("./output"));
    }

    #[test]
    fn test_apply_overrides_rejects_unknown_mode() {
        let mut config = VeilConfig::default();
        let mut args = args();
        args.pii_mode = Some("everything".to_string());
        assert!(args.apply_overrides(&mut config).is_err());
    }
}
