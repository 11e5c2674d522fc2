//! Combine command implementation
//!
//! Merges every `pii_page_{n}.json` of the input directory into
//! `combined_pii.json`, ready for a document-wide run.

use crate::config::load_config;
use crate::store::{combine_pii_pages, InputStore};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the combine command
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Input directory (defaults to input.dir from the configuration)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

impl CombineArgs {
    /// Execute the combine command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let dir = match &self.input {
            Some(dir) => dir.clone(),
            None => match load_config(config_path) {
                Ok(config) => config.input.dir,
                Err(e) => {
                    eprintln!("Failed to load configuration: {e}");
                    eprintln!("   Pass --input to combine without a configuration file");
                    return Ok(2);
                }
            },
        };

        tracing::info!(dir = %dir.display(), "Combining per-page PII");
        println!("🔗 Combining per-page PII in {}", dir.display());

        let store = InputStore::new(dir);
        match combine_pii_pages(&store).await {
            Ok(combined) => {
                println!("✅ Wrote combined_pii.json with {} field(s)", combined.len());
                Ok(0)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to combine PII files");
                eprintln!("Failed to combine PII files: {e}");
                Ok(5)
            }
        }
    }
}
