//! # Tree Walker Module
//!
//! Attraversa ricorsivamente l'albero sorgente e lo rispecchia nella destinazione.
//!
//! ## Per ogni entry:
//! - **Directory**: crea la directory corrispondente (idempotente) e ci scende dentro
//! - **File regolare**: HEIC → `ImageTranscoder`, altro → copia verbatim;
//!   poi l'indice avanza di uno e parte il report di progresso
//! - **Link/file speciali**: ignorati
//!
//! ## Ordine:
//! Depth-first, entry di ogni directory in ordine lessicografico per nome.
//! File e sottodirectory sono interlacciati secondo quell'ordine.
//!
//! ## Errori:
//! Gli errori su singolo file diventano `ConversionOutcome::Failed` e vengono loggati;
//! un errore di lettura o creazione di directory interrompe la traversata.

use crate::codec::ImageCodec;
use crate::converter::path_resolver::PathResolver;
use crate::error::ConvertError;
use crate::file_manager::FileManager;
use crate::image_processor::ImageTranscoder;
use crate::progress::{ConversionOutcome, ConversionStats, ProgressReporter, ProgressState};
use std::path::Path;
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Mirrors a source tree into a destination tree, one file at a time
pub struct TreeWalker<C> {
    transcoder: ImageTranscoder<C>,
}

impl<C: ImageCodec> TreeWalker<C> {
    pub fn new(transcoder: ImageTranscoder<C>) -> Self {
        Self { transcoder }
    }

    /// Mirror `source_dir` into `dest_dir`, advancing `progress` once per regular file
    pub async fn walk(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        progress: &mut ProgressState,
        reporter: &ProgressReporter,
    ) -> Result<ConversionStats, ConvertError> {
        let mut stats = ConversionStats::new();

        for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let destination = PathResolver::mirror(entry.path(), source_dir, dest_dir)?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&destination)
                    .await
                    .map_err(|e| ConvertError::filesystem(&destination, e))?;
                debug!("Mirrored directory {}", destination.display());
            } else if file_type.is_file() {
                let target_dir = destination.parent().unwrap_or(dest_dir);
                let outcome = self.process_file(entry.path(), target_dir, reporter).await;

                stats.record(entry.path(), &outcome);
                reporter.file_complete(entry.path(), &outcome);

                progress.advance();
                reporter.report(progress, entry.path());
            } else {
                debug!("Skipping special file: {}", entry.path().display());
            }
        }

        Ok(stats)
    }

    /// Convert or copy a single regular file; never fails the run
    pub async fn process_file(
        &self,
        source: &Path,
        dest_dir: &Path,
        reporter: &ProgressReporter,
    ) -> ConversionOutcome {
        if FileManager::is_heic(source) {
            match self.transcoder.transcode(source, dest_dir).await {
                Ok(destination) => ConversionOutcome::Converted(destination),
                Err(e) => {
                    reporter.error(&format!("Error converting HEIC to JPEG: {}", e));
                    ConversionOutcome::Failed(e.to_string())
                }
            }
        } else {
            match FileManager::copy_file(source, dest_dir).await {
                Ok(destination) => ConversionOutcome::Copied(destination),
                Err(e) => {
                    reporter.error(&format!("Error copying file: {}", e));
                    ConversionOutcome::Failed(e.to_string())
                }
            }
        }
    }
}
