// file: src/scanner/pdf_scanner.rs
// description: Recursive directory walking with case-insensitive pdf suffix filtering
// reference: https://docs.rs/walkdir

use crate::config::ScannerConfig;
use crate::error::{Result, ScoutError};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct PdfScanner {
    config: ScannerConfig,
    show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct ScannedPdf {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl PdfScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Shows a spinner on stderr while the walk runs.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Walks `root` and returns every matching entry in traversal order.
    ///
    /// The first walk error aborts the scan; there is no skip-and-continue.
    pub fn scan(&self, root: &Path) -> Result<Vec<ScannedPdf>> {
        info!("Scanning directory: {}", root.display());
        let spinner = self.create_spinner();
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(self.config.follow_links) {
            let entry = entry.map_err(|source| ScoutError::Scan {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source,
            })?;

            if let Some(spinner) = &spinner {
                spinner.set_message(entry.path().display().to_string());
                spinner.tick();
            }

            if entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !self.is_match(&name) {
                continue;
            }

            let path = entry.path();
            debug!("Matched: {}", path.display());

            // metadata is informational only, a failed stat does not drop the match
            let metadata = entry.metadata().ok();
            let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
            let modified = metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from);

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            files.push(ScannedPdf {
                path: path.to_path_buf(),
                relative_path,
                size,
                modified,
            });
        }

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        info!("Found {} PDF files", files.len());
        Ok(files)
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        has_suffix_ignore_case(file_name, &self.config.suffix)
    }

    fn create_spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    }
}

fn has_suffix_ignore_case(file_name: &str, suffix: &str) -> bool {
    file_name
        .to_lowercase()
        .ends_with(&suffix.to_lowercase())
}
