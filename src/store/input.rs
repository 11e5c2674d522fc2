//! Input side of the file store

use super::{page_pii_file, page_text_file, read_json, write_json, COMBINED_PII_FILE};
use crate::config::PiiMode;
use crate::domain::{PiiMap, Result, UnitKey, VeilError};
use crate::redaction::{DummyPool, IdentityRegistry, PiiSource, SourceUnit};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory of extracted pages and detected values
#[derive(Debug, Clone)]
pub struct InputStore {
    dir: PathBuf,
}

impl InputStore {
    /// Open an input directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Input directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Page numbers that have a `page_{n}.txt`, ascending
    pub async fn discover_pages(&self) -> Result<Vec<usize>> {
        self.numbered_files(r"^page_(\d+)\.txt$").await
    }

    /// Page numbers that have a `pii_page_{n}.json`, ascending
    pub async fn discover_pii_pages(&self) -> Result<Vec<usize>> {
        self.numbered_files(r"^pii_page_(\d+)\.json$").await
    }

    /// Detected values of page `n`; a missing file yields an empty map
    pub async fn load_page_pii(&self, n: usize) -> Result<PiiMap> {
        let path = self.dir.join(page_pii_file(n));
        if !fs::try_exists(&path).await.unwrap_or(false) {
            tracing::warn!(page = n, path = %path.display(), "No PII file for page");
            return Ok(PiiMap::new());
        }
        read_json(&path).await
    }

    /// Document-wide detected values
    ///
    /// # Errors
    ///
    /// [`VeilError::MissingPiiSource`] when `combined_pii.json` does not exist
    pub async fn load_combined_pii(&self) -> Result<PiiMap> {
        let path = self.dir.join(COMBINED_PII_FILE);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(VeilError::MissingPiiSource(path.display().to_string()));
        }
        read_json(&path).await
    }

    /// Load every page in order, with detected values per `mode`
    pub async fn load_units(&self, mode: PiiMode) -> Result<(Vec<SourceUnit>, PiiSource)> {
        let pages = self.discover_pages().await?;
        if pages.is_empty() {
            return Err(VeilError::Validation(format!(
                "No page_{{n}}.txt files found in {}",
                self.dir.display()
            )));
        }

        let source = match mode {
            PiiMode::PerPage => PiiSource::PerUnit,
            PiiMode::Document => PiiSource::DocumentWide(self.load_combined_pii().await?),
        };

        let total = pages.len();
        let mut units = Vec::with_capacity(total);
        for (i, n) in pages.into_iter().enumerate() {
            crate::log_unit_progress!(i + 1, total);

            let path = self.dir.join(page_text_file(n));
            let text = fs::read_to_string(&path)
                .await
                .map_err(|e| VeilError::Io(format!("Failed to read {}: {e}", path.display())))?;
            let pii = match mode {
                PiiMode::PerPage => self.load_page_pii(n).await?,
                PiiMode::Document => PiiMap::new(),
            };
            units.push(SourceUnit {
                key: UnitKey::page(n),
                text,
                pii,
            });
        }

        tracing::info!(pages = units.len(), mode = %mode, dir = %self.dir.display(), "Input loaded");
        Ok((units, source))
    }

    async fn numbered_files(&self, pattern: &str) -> Result<Vec<usize>> {
        let re = Regex::new(pattern)
            .map_err(|e| VeilError::Other(format!("Invalid file pattern: {e}")))?;

        let mut entries = fs::read_dir(&self.dir).await.map_err(|e| {
            VeilError::Io(format!("Failed to read directory {}: {e}", self.dir.display()))
        })?;

        let mut numbers = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(n) = re
                .captures(name)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<usize>().ok())
            {
                numbers.push(n);
            }
        }

        numbers.sort_unstable();
        Ok(numbers)
    }
}

/// Merge every `pii_page_{n}.json` into one map and write `combined_pii.json`
///
/// Pages are merged in ascending order; a field seen again on a later page
/// takes the later value. Blank values are skipped.
pub async fn combine_pii_pages(store: &InputStore) -> Result<PiiMap> {
    let pages = store.discover_pii_pages().await?;
    let mut combined = PiiMap::new();

    for n in &pages {
        for (field, value) in store.load_page_pii(*n).await? {
            if let Some(value) = value.sanitized() {
                combined.insert(field, value);
            }
        }
    }

    let path = store.dir().join(COMBINED_PII_FILE);
    write_json(&path, &combined).await?;

    tracing::info!(
        pages = pages.len(),
        fields = combined.len(),
        path = %path.display(),
        "Combined per-page PII"
    );
    Ok(combined)
}

/// Load a dummy pool; no path yields an empty pool
pub async fn load_pool(path: Option<&Path>) -> Result<DummyPool> {
    match path {
        Some(path) => {
            let pool: DummyPool = read_json(path).await?;
            tracing::info!(categories = pool.categories().count(), "Dummy pool loaded");
            Ok(pool)
        }
        None => Ok(DummyPool::new()),
    }
}

/// Load a prior registry snapshot
pub async fn load_snapshot(path: &Path) -> Result<IdentityRegistry> {
    read_json(path).await
}
