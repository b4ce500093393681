//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche della conversione.
//!
//! ## Componenti principali:
//! - `ProgressState`: totale file + indice corrente, creato una volta per run
//! - `ProgressReporter`: log testuale per ogni file, barra `indicatif`, eventi JSON
//! - `ConversionOutcome`: esito per singolo file (convertito, copiato, fallito)
//! - `ConversionStats`: statistiche cumulative per il riepilogo finale
//!
//! ## Formato del messaggio:
//! ```text
//! Processed 2/3 files (66.67% complete)
//! ```
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 2/3 (66%) sub/c.HEIC
//! ```

use crate::config::Config;
use crate::file_manager::FileManager;
use crate::json_output::JsonMessage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Running position within a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub total_files: u64,
    pub current_index: u64,
}

impl ProgressState {
    pub fn new(total_files: u64) -> Self {
        Self {
            total_files,
            current_index: 0,
        }
    }

    /// Mark one more regular file as processed, returning the new index
    pub fn advance(&mut self) -> u64 {
        self.current_index += 1;
        if self.current_index > self.total_files {
            warn!(
                "Processed more files ({}) than counted ({}); was the source tree modified?",
                self.current_index, self.total_files
            );
        }
        self.current_index
    }

    pub fn percent(&self) -> f64 {
        percent_complete(self.current_index, self.total_files)
    }
}

/// `current / total` as a percentage; an empty run counts as complete
pub fn percent_complete(current: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        (current as f64 / total as f64) * 100.0
    }
}

/// Human readable progress line
pub fn format_progress(current: u64, total: u64) -> String {
    format!(
        "Processed {}/{} files ({:.2}% complete)",
        current,
        total,
        percent_complete(current, total)
    )
}

/// Emits one progress report per processed file
pub struct ProgressReporter {
    bar: ProgressBar,
    json_output: bool,
}

impl ProgressReporter {
    /// Create a reporter for `total_files`, drawing a bar only if configured
    pub fn new(total_files: u64, config: &Config) -> Self {
        let bar = if config.progress_bar && !config.json_output {
            let bar = ProgressBar::new(total_files);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            json_output: config.json_output,
        }
    }

    /// A reporter that only logs
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            json_output: false,
        }
    }

    /// Report the state after `file` has been processed
    pub fn report(&self, state: &ProgressState, file: &Path) {
        let message = format_progress(state.current_index, state.total_files);

        self.bar.set_position(state.current_index);
        self.bar
            .set_message(file.file_name().unwrap_or_default().to_string_lossy().to_string());
        self.bar.suspend(|| info!("{}", message));

        if self.json_output {
            JsonMessage::progress(state.current_index, state.total_files).emit();
        }
    }

    /// Log an error line without tearing the bar
    pub fn error(&self, line: &str) {
        self.bar.suspend(|| error!("{}", line));
    }

    /// Emit the per-file JSON event, if enabled
    pub fn file_complete(&self, source: &Path, outcome: &ConversionOutcome) {
        if self.json_output {
            JsonMessage::file_complete(source, outcome).emit();
        }
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Result of processing one regular file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted(PathBuf),
    Copied(PathBuf),
    Failed(String),
}

impl ConversionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Converted(_) => "converted",
            Self::Copied(_) => "copied",
            Self::Failed(_) => "failed",
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::Converted(path) | Self::Copied(path) => Some(path.as_path()),
            Self::Failed(_) => None,
        }
    }
}

/// Statistics tracker for a conversion run
#[derive(Debug, Default, Clone)]
pub struct ConversionStats {
    pub files_converted: usize,
    pub files_copied: usize,
    pub files_failed: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub failures: Vec<(PathBuf, String)>,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file outcome into the totals
    pub fn record(&mut self, source: &Path, outcome: &ConversionOutcome) {
        let source_size = std::fs::metadata(source).map(|m| m.len()).unwrap_or(0);

        match outcome {
            ConversionOutcome::Converted(destination) | ConversionOutcome::Copied(destination) => {
                if matches!(outcome, ConversionOutcome::Converted(_)) {
                    self.files_converted += 1;
                } else {
                    self.files_copied += 1;
                }
                self.bytes_read += source_size;
                self.bytes_written += std::fs::metadata(destination).map(|m| m.len()).unwrap_or(0);
            }
            ConversionOutcome::Failed(reason) => {
                self.files_failed += 1;
                self.failures.push((source.to_path_buf(), reason.clone()));
            }
        }
    }

    pub fn files_processed(&self) -> usize {
        self.files_converted + self.files_copied + self.files_failed
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Converted: {} | Copied: {} | Failed: {} | Read: {} | Written: {}",
            self.files_converted,
            self.files_copied,
            self.files_failed,
            FileManager::format_size(self.bytes_read),
            FileManager::format_size(self.bytes_written),
        )
    }
}
