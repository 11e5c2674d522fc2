//! End-to-end tests over the input/output directory layout
//!
//! Pages and detected values are written to a temp directory, redacted
//! through the stores or the `redact` command, and the written artifacts
//! are checked.

use std::path::Path;
use tempfile::TempDir;
use tokio::sync::watch;
use veil::cli::commands::combine::CombineArgs;
use veil::cli::commands::redact::RedactArgs;
use veil::config::PiiMode;
use veil::redaction::{RedactionConfig, RedactionEngine};
use veil::store::{combine_pii_pages, load_pool, InputStore, OutputStore};

async fn write(dir: &Path, name: &str, contents: &str) {
    tokio::fs::write(dir.join(name), contents).await.unwrap();
}

/// Two pages: the second has no detections of its own
async fn seed_input(dir: &Path) {
    write(dir, "page_1.txt", "Patient: Begle Peter\nMRN: 12345").await;
    write(
        dir,
        "pii_page_1.json",
        r#"{"Patient Name": "Begle Peter", "MRN": "12345", "Phone": ""}"#,
    )
    .await;
    write(dir, "page_2.txt", "Follow-up for Mr. Begle (MRN 12345).").await;
    write(
        dir,
        "pool.json",
        r#"{"Patient Name": ["Jane Doe"], "MRN": ["99999"]}"#,
    )
    .await;
}

fn redact_args(input: &Path, output: &Path) -> RedactArgs {
    RedactArgs {
        input: Some(input.to_path_buf()),
        output: Some(output.to_path_buf()),
        pool: Some(input.join("pool.json")),
        pii_mode: None,
        snapshot: None,
        seed: Some(42),
        dry_run: false,
        json: false,
    }
}

async fn write_config(dir: &Path) -> String {
    let audit = dir.join("audit").join("redaction.log");
    let contents = format!(
        "[redaction.audit]\nenabled = true\nlog_path = \"{}\"\n",
        audit.display()
    );
    let path = dir.join("veil.toml");
    tokio::fs::write(&path, contents).await.unwrap();
    path.to_string_lossy().to_string()
}

fn no_shutdown() -> watch::Receiver<bool> {
    watch::channel(false).1
}

#[tokio::test]
async fn test_full_run_through_stores() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("output");
    tokio::fs::create_dir_all(&input_dir).await.unwrap();
    seed_input(&input_dir).await;

    let input = InputStore::new(&input_dir);
    let (units, source) = input.load_units(PiiMode::PerPage).await.unwrap();
    assert_eq!(units.len(), 2);
    assert!(units[1].pii.is_empty());

    let pool = load_pool(Some(&input_dir.join("pool.json"))).await.unwrap();
    let mut config = RedactionConfig {
        seed: Some(1),
        ..RedactionConfig::default()
    };
    config.audit.enabled = false;
    let output = RedactionEngine::new(config, pool)
        .unwrap()
        .process_document(units, source)
        .unwrap();

    let store = OutputStore::create(&output_dir, true).await.unwrap();
    store.write_run(&output, false).await.unwrap();

    let page_2 = tokio::fs::read_to_string(output_dir.join("page_2_sanitized.txt"))
        .await
        .unwrap();
    assert_eq!(page_2, "Follow-up for Mr. Doe (MRN 99999).");

    let document = tokio::fs::read_to_string(output_dir.join("combine_sanitized.txt"))
        .await
        .unwrap();
    assert!(document.starts_with("\n\n===== PAGE 1 =====\n\nPatient: Jane Doe\nMRN: 99999"));
    assert!(document.contains("\n\n===== PAGE 2 =====\n\n"));
    assert!(!document.contains("Begle"));

    let replacements: serde_json::Value = serde_json::from_str(
        &tokio::fs::read_to_string(output_dir.join("replace_page_1.json"))
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(replacements["Patient Name"]["dummy"], "Jane Doe");
    assert!(replacements.get("Phone").is_none());

    assert!(output_dir.join("master_pii.json").exists());
    assert!(output_dir.join("combined_pii_map.json").exists());
    assert!(output_dir.join("run_report.json").exists());
}

#[tokio::test]
async fn test_redact_command_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("output");
    tokio::fs::create_dir_all(&input_dir).await.unwrap();
    seed_input(&input_dir).await;
    let config_path = write_config(dir.path()).await;

    let code = redact_args(&input_dir, &output_dir)
        .execute(&config_path, no_shutdown())
        .await
        .unwrap();
    assert_eq!(code, 0);

    let page_1 = tokio::fs::read_to_string(output_dir.join("page_1_sanitized.txt"))
        .await
        .unwrap();
    assert_eq!(page_1, "Patient: Jane Doe\nMRN: 99999");

    let audit = tokio::fs::read_to_string(dir.path().join("audit").join("redaction.log"))
        .await
        .unwrap();
    assert_eq!(audit.lines().count(), 2);
    assert!(!audit.contains("Begle"));
    assert!(!audit.contains("12345"));
}

#[tokio::test]
async fn test_redact_command_resumes_from_snapshot() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let first_out = dir.path().join("first");
    let second_out = dir.path().join("second");
    tokio::fs::create_dir_all(&input_dir).await.unwrap();
    seed_input(&input_dir).await;
    write(
        &input_dir,
        "pool.json",
        r#"{"Patient Name": ["Jane Doe", "Mary Major", "Ann Lee"], "MRN": ["99999", "88888"]}"#,
    )
    .await;
    let config_path = write_config(dir.path()).await;

    let code = redact_args(&input_dir, &first_out)
        .execute(&config_path, no_shutdown())
        .await
        .unwrap();
    assert_eq!(code, 0);

    let mut resumed = redact_args(&input_dir, &second_out);
    resumed.seed = Some(1234);
    resumed.snapshot = Some(first_out.join("master_pii.json"));
    let code = resumed.execute(&config_path, no_shutdown()).await.unwrap();
    assert_eq!(code, 0);

    for name in ["page_1_sanitized.txt", "page_2_sanitized.txt"] {
        let first = tokio::fs::read_to_string(first_out.join(name)).await.unwrap();
        let second = tokio::fs::read_to_string(second_out.join(name)).await.unwrap();
        assert_eq!(first, second, "{name} differs after resume");
    }
}

#[tokio::test]
async fn test_redact_command_dry_run_writes_no_text() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("output");
    tokio::fs::create_dir_all(&input_dir).await.unwrap();
    seed_input(&input_dir).await;
    let config_path = write_config(dir.path()).await;

    let mut args = redact_args(&input_dir, &output_dir);
    args.dry_run = true;
    let code = args.execute(&config_path, no_shutdown()).await.unwrap();
    assert_eq!(code, 0);

    assert!(output_dir.join("master_pii.json").exists());
    assert!(output_dir.join("run_report.json").exists());
    assert!(!output_dir.join("page_1_sanitized.txt").exists());
    assert!(!output_dir.join("combine_sanitized.txt").exists());
}

#[tokio::test]
async fn test_redact_command_aborts_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("output");
    tokio::fs::create_dir_all(&input_dir).await.unwrap();
    seed_input(&input_dir).await;
    let config_path = write_config(dir.path()).await;

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let code = redact_args(&input_dir, &output_dir)
        .execute(&config_path, rx)
        .await
        .unwrap();
    assert_eq!(code, 5);
    assert!(!output_dir.join("master_pii.json").exists());
}

#[tokio::test]
async fn test_redact_command_without_pages_fails() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    tokio::fs::create_dir_all(&input_dir).await.unwrap();
    let config_path = write_config(dir.path()).await;

    let mut args = redact_args(&input_dir, &dir.path().join("output"));
    args.pool = None;
    let code = args.execute(&config_path, no_shutdown()).await.unwrap();
    assert_eq!(code, 5);
}

#[tokio::test]
async fn test_combine_then_document_mode() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    tokio::fs::create_dir_all(&input_dir).await.unwrap();
    seed_input(&input_dir).await;
    write(&input_dir, "pii_page_2.json", r#"{"MRN": "12345"}"#).await;

    let code = CombineArgs {
        input: Some(input_dir.clone()),
    }
    .execute(dir.path().join("missing.toml").to_str().unwrap())
    .await
    .unwrap();
    assert_eq!(code, 0);

    let store = InputStore::new(&input_dir);
    let combined = store.load_combined_pii().await.unwrap();
    assert_eq!(combined.len(), 2);
    assert!(!combined.contains_key("Phone"));

    let (units, source) = store.load_units(PiiMode::Document).await.unwrap();
    let mut config = RedactionConfig {
        seed: Some(3),
        ..RedactionConfig::default()
    };
    config.audit.enabled = false;
    let pool = load_pool(Some(&input_dir.join("pool.json"))).await.unwrap();
    let output = RedactionEngine::new(config, pool)
        .unwrap()
        .process_document(units, source)
        .unwrap();

    assert_eq!(output.outcomes[0].text, "Patient: Jane Doe\nMRN: 99999");
    assert_eq!(output.outcomes[1].text, "Follow-up for Mr. Doe (MRN 99999).");

    assert_eq!(combine_pii_pages(&store).await.unwrap(), combined);
}
