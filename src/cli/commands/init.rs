//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "veil.toml")]
    pub output: String,

    /// Include every setting with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Veil configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your input and output directories", self.output);
                println!("  2. Put page_{{n}}.txt and pii_page_{{n}}.json files in the input directory");
                println!("  3. Point input.pool_path at a JSON file of placeholder candidates");
                println!("  4. Validate configuration: veil validate-config");
                println!("  5. Run: veil redact");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Veil Configuration File
# Consistent PII redaction for extracted document text

[application]
log_level = "info"
dry_run = false

[input]
dir = "./input"
pool_path = "./dummy_pool.json"
pii_mode = "per_page"

[output]
dir = "./output"
"#
        .to_string()
    }

    /// Generate configuration with every setting documented
    fn generate_config_with_examples() -> String {
        r#"# Veil Configuration File
# Consistent PII redaction for extracted document text
#
# Values may reference environment variables with ${VAR_NAME}.
# Any setting can be overridden with VEIL_<SECTION>_<KEY>,
# for example VEIL_INPUT_DIR or VEIL_REDACTION_SEED.

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"
# Compute and report decisions without writing redacted text
dry_run = false

[redaction]
# Placeholder used for fields without a dummy pool
sentinel = "REDACTED"
# Reuse placeholders when a token is close to a known one ("Smyth" ~ "Smith")
fuzzy_tokens = true
# Minimum similarity (1-100) for token reuse
token_threshold = 80
# Minimum similarity (1-100) for whole-name matches ("Begle, Petr")
phrase_threshold = 82
# Shortest token considered by fuzzy and title matching
min_token_length = 3
# Fixed seed for reproducible placeholder selection
# seed = 42
# Collapse OCR whitespace noise before redacting
clean_text = true
# Whole-name fuzzy pass (reordered, punctuated, concatenated names)
phrase_pass = true
# Honorific/title pass ("Mr. Begle" -> "Mr. Doe")
title_pass = true
# Let the title pass use tokens from every field, not only name fields
title_pass_all_fields = false

[redaction.audit]
enabled = true
log_path = "./audit/redaction.log"
json_format = true

[input]
# Directory with page_{n}.txt and pii_page_{n}.json files
dir = "./input"
# JSON object: field label -> list of placeholder candidates
pool_path = "./dummy_pool.json"
# per_page: pii_page_{n}.json per page; document: combined_pii.json for all pages
pii_mode = "per_page"
# Resume from a previous run's registry
# snapshot = "./output/master_pii.json"

[output]
dir = "./output"
# Write replace_page_{n}.json and page_{n}_sanitized.txt
per_unit_files = true

[logging]
local_enabled = false
local_path = "./logs"
# daily, hourly or never
local_rotation = "daily"
local_max_size_mb = 100
"#
        .to_string()
    }
}
