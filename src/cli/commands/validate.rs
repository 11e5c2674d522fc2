//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Veil configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let redaction = &config.redaction;
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Input Directory: {}", config.input.dir.display());
        println!("  PII Mode: {}", config.input.pii_mode);
        println!(
            "  Dummy Pool: {}",
            config
                .input
                .pool_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| format!("none (sentinel '{}')", redaction.sentinel))
        );
        println!("  Output Directory: {}", config.output.dir.display());
        println!(
            "  Token Fuzzy Matching: {} (threshold {})",
            redaction.fuzzy_tokens, redaction.token_threshold
        );
        println!(
            "  Phrase Pass: {} (threshold {})",
            redaction.phrase_pass, redaction.phrase_threshold
        );
        println!("  Title Pass: {}", redaction.title_pass);
        println!(
            "  Audit Log: {}",
            if redaction.audit.enabled {
                redaction.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[redaction]\nseed = 1\n").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[application]\nlog_level = \"loud\"\n").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
