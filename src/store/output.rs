//! Output side of the file store

use super::{write_json, COMBINED_MAP_FILE, DOCUMENT_TEXT_FILE, MASTER_MAP_FILE, REPORT_FILE};
use crate::domain::{Result, VeilError};
use crate::redaction::RunOutput;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory receiving the results of a run
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
    per_unit_files: bool,
}

impl OutputStore {
    /// Open (and create) an output directory
    pub async fn create(dir: impl Into<PathBuf>, per_unit_files: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| {
            VeilError::Io(format!(
                "Failed to create output directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self {
            dir,
            per_unit_files,
        })
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every artifact of a run, returning the written paths
    ///
    /// With `dry_run`, only the registry, the combined map and the report
    /// are written.
    pub async fn write_run(&self, output: &RunOutput, dry_run: bool) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let path = self.dir.join(MASTER_MAP_FILE);
        write_json(&path, &output.registry).await?;
        written.push(path);

        let path = self.dir.join(COMBINED_MAP_FILE);
        write_json(&path, &output.combined).await?;
        written.push(path);

        if !dry_run {
            if self.per_unit_files {
                for outcome in &output.outcomes {
                    let path = self.dir.join(format!("replace_{}.json", outcome.unit));
                    write_json(&path, &outcome.replacements).await?;
                    written.push(path);

                    let path = self.dir.join(format!("{}_sanitized.txt", outcome.unit));
                    self.write_text(&path, &outcome.text).await?;
                    written.push(path);
                }
            }

            let path = self.dir.join(DOCUMENT_TEXT_FILE);
            self.write_text(&path, &output.document_text).await?;
            written.push(path);
        }

        let path = self.dir.join(REPORT_FILE);
        write_json(&path, &output.report).await?;
        written.push(path);

        tracing::info!(
            files = written.len(),
            dir = %self.dir.display(),
            "Run outputs written"
        );
        Ok(written)
    }

    async fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        fs::write(path, text)
            .await
            .map_err(|e| VeilError::Io(format!("Failed to write {}: {e}", path.display())))
    }
}
