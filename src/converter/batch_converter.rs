//! # Batch Converter Orchestrator
//!
//! Orchestratore principale: una run per invocazione del processo.
//!
//! ## Flusso di esecuzione:
//! 1. **Destinazione**: crea la root di destinazione se assente
//! 2. **Conteggio**: `FileManager::count_files` sulla root sorgente (fatale se fallisce)
//! 3. **Traversata**: `TreeWalker` con indice iniziale 0
//! 4. **Completamento**: messaggio finale e riepilogo convertiti/copiati/falliti
//!
//! ## Esempio:
//! ```ignore
//! let converter = BatchConverter::with_external_tools(Config::default()).await?;
//! let summary = converter.run().await?;
//! ```

use crate::codec::{ExternalToolCodec, ImageCodec};
use crate::config::Config;
use crate::converter::tree_walker::TreeWalker;
use crate::error::ConvertError;
use crate::file_manager::FileManager;
use crate::image_processor::ImageTranscoder;
use crate::json_output::JsonMessage;
use crate::progress::{ConversionStats, ProgressReporter, ProgressState};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Message logged once the whole tree has been processed
pub const COMPLETION_MESSAGE: &str = "Compression and renaming completed.";

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_files: u64,
    pub stats: ConversionStats,
    pub duration: Duration,
}

/// Top-level entry: count, walk, report
pub struct BatchConverter<C> {
    config: Config,
    walker: TreeWalker<C>,
}

impl BatchConverter<ExternalToolCodec> {
    /// Converter backed by libheif/ImageMagick command line tools
    pub async fn with_external_tools(config: Config) -> Result<Self, ConvertError> {
        let codec = ExternalToolCodec::new(config.heic_quality_percent());

        // Passthrough copies still work without a decoder, so only warn
        if let Err(e) = codec.check_dependencies().await {
            warn!("HEIC files will fail to convert: {}", e);
        }

        Self::new(config, codec)
    }
}

impl<C: ImageCodec> BatchConverter<C> {
    pub fn new(config: Config, codec: C) -> Result<Self, ConvertError> {
        config.validate()?;
        let walker = TreeWalker::new(ImageTranscoder::new(codec, &config));
        Ok(Self { config, walker })
    }

    /// Run the whole conversion once
    pub async fn run(&self) -> Result<RunSummary, ConvertError> {
        let start_time = Instant::now();
        self.log_configuration();

        let result = self.run_inner(start_time).await;
        if let Err(ref e) = result {
            if self.config.json_output {
                JsonMessage::error(e.to_string(), Some(format!("{:?}", e))).emit();
            }
        }
        result
    }

    async fn run_inner(&self, start_time: Instant) -> Result<RunSummary, ConvertError> {
        self.ensure_dest_root().await?;

        let total_files = FileManager::count_files(&self.config.source_root)?;
        info!("Total files found: {}", total_files);
        if self.config.json_output {
            JsonMessage::start(&self.config, total_files).emit();
        }

        let reporter = ProgressReporter::new(total_files, &self.config);
        let mut progress = ProgressState::new(total_files);

        let stats = match self
            .walker
            .walk(
                &self.config.source_root,
                &self.config.dest_root,
                &mut progress,
                &reporter,
            )
            .await
        {
            Ok(stats) => stats,
            Err(e) => {
                reporter.finish("aborted");
                return Err(e);
            }
        };

        reporter.finish(&stats.format_summary());
        info!("{}", COMPLETION_MESSAGE);
        self.print_final_stats(&stats);

        let duration = start_time.elapsed();
        if self.config.json_output {
            JsonMessage::complete(&stats, duration.as_secs_f64()).emit();
        }

        Ok(RunSummary {
            total_files,
            stats,
            duration,
        })
    }

    /// Create the destination root if it is missing; anything else there is fatal
    async fn ensure_dest_root(&self) -> Result<(), ConvertError> {
        let dest_root = &self.config.dest_root;
        match tokio::fs::metadata(dest_root).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(ConvertError::filesystem(
                dest_root,
                std::io::Error::new(std::io::ErrorKind::Other, "Output path is not a directory"),
            )),
            Err(_) => {
                tokio::fs::create_dir_all(dest_root)
                    .await
                    .map_err(|e| ConvertError::filesystem(dest_root, e))?;
                info!("Created output directory: {}", dest_root.display());
                Ok(())
            }
        }
    }

    /// Logga configurazione (solo se non JSON mode)
    fn log_configuration(&self) {
        if self.config.json_output {
            return;
        }

        info!("Source: {}", self.config.source_root.display());
        info!("Destination: {}", self.config.dest_root.display());
        debug!(
            "Target width: {}px, HEIC quality: {}, JPEG quality: {}",
            self.config.target_width, self.config.heic_quality, self.config.jpeg_quality
        );
    }

    fn print_final_stats(&self, stats: &ConversionStats) {
        info!("{}", stats.format_summary());
        for (path, reason) in &stats.failures {
            warn!("Not converted: {} ({})", path.display(), reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::test_support::{fixture_bytes, MemoryCodec};
    use crate::progress::test_support::CapturedLogs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn config_for(root: &Path) -> Config {
        Config {
            source_root: root.join("from_heics"),
            dest_root: root.join("to_jpeg"),
            progress_bar: false,
            ..Default::default()
        }
    }

    fn relative_files(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_scenario_three_files() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        let src = config.source_root.clone();
        std::fs::create_dir_all(src.join("sub")).unwrap();
        std::fs::write(src.join("a.heic"), fixture_bytes(2100, 1400)).unwrap();
        std::fs::write(src.join("b.png"), fixture_bytes(64, 64)).unwrap();
        std::fs::write(src.join("sub/c.HEIC"), fixture_bytes(2100, 1400)).unwrap();

        let converter = BatchConverter::new(config.clone(), MemoryCodec).unwrap();
        let summary = converter.run().await.unwrap();

        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.stats.files_converted, 2);
        assert_eq!(summary.stats.files_copied, 1);
        assert_eq!(
            relative_files(&config.dest_root),
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("b.png"),
                PathBuf::from("sub/c.jpg")
            ]
        );
        assert_eq!(
            std::fs::read(config.dest_root.join("b.png")).unwrap(),
            std::fs::read(src.join("b.png")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_scenario_progress_lines() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        let src = config.source_root.clone();
        std::fs::create_dir_all(src.join("sub")).unwrap();
        std::fs::write(src.join("a.heic"), fixture_bytes(2100, 1400)).unwrap();
        std::fs::write(src.join("b.png"), fixture_bytes(64, 64)).unwrap();
        std::fs::write(src.join("sub/c.HEIC"), fixture_bytes(2100, 1400)).unwrap();

        let logs = CapturedLogs::default();
        let guard = logs.install();
        let converter = BatchConverter::new(config, MemoryCodec).unwrap();
        assert_ok!(converter.run().await);
        drop(guard);

        let lines = logs.lines();
        let progress: Vec<&str> = lines
            .iter()
            .map(String::as_str)
            .filter(|l| l.starts_with("Processed"))
            .collect();
        assert_eq!(
            progress,
            vec![
                "Processed 1/3 files (33.33% complete)",
                "Processed 2/3 files (66.67% complete)",
                "Processed 3/3 files (100.00% complete)",
            ]
        );
        assert!(!lines.iter().any(|l| l.starts_with("Error")));

        let total = lines.iter().position(|l| l == "Total files found: 3").unwrap();
        let first = lines.iter().position(|l| l.starts_with("Processed 1/3")).unwrap();
        let last = lines.iter().position(|l| l.starts_with("Processed 3/3")).unwrap();
        let done = lines.iter().position(|l| l == COMPLETION_MESSAGE).unwrap();
        assert!(total < first && last < done);
    }

    #[tokio::test]
    async fn test_rerun_overwrites_silently() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        std::fs::create_dir_all(&config.source_root).unwrap();
        std::fs::write(config.source_root.join("a.heic"), fixture_bytes(2100, 1400)).unwrap();
        std::fs::write(config.source_root.join("notes.txt"), b"v2").unwrap();
        std::fs::create_dir_all(&config.dest_root).unwrap();
        std::fs::write(config.dest_root.join("a.jpg"), b"old").unwrap();
        std::fs::write(config.dest_root.join("notes.txt"), b"v1").unwrap();

        let converter = BatchConverter::new(config.clone(), MemoryCodec).unwrap();
        assert_ok!(converter.run().await);
        let second = converter.run().await.unwrap();

        assert_eq!(second.stats.files_failed, 0);
        assert_eq!(std::fs::read(config.dest_root.join("notes.txt")).unwrap(), b"v2");
        assert_eq!(
            image::image_dimensions(config.dest_root.join("a.jpg")).unwrap(),
            (1050, 700)
        );
    }

    #[tokio::test]
    async fn test_missing_source_is_fatal() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());

        let converter = BatchConverter::new(config.clone(), MemoryCodec).unwrap();
        let err = converter.run().await.unwrap_err();

        assert!(matches!(err, ConvertError::Filesystem { .. }));
        // The destination root is created before counting
        assert!(config.dest_root.is_dir());
    }

    #[tokio::test]
    async fn test_dest_root_that_is_a_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        std::fs::create_dir_all(&config.source_root).unwrap();
        std::fs::write(config.source_root.join("a.heic"), fixture_bytes(40, 20)).unwrap();
        std::fs::write(config.source_root.join("b.png"), b"png").unwrap();
        std::fs::write(&config.dest_root, b"not a directory").unwrap();

        let err = BatchConverter::new(config.clone(), MemoryCodec)
            .unwrap()
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::Filesystem { .. }));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Output path is not a directory"));
        assert_eq!(std::fs::read(&config.dest_root).unwrap(), b"not a directory");
    }

    #[tokio::test]
    async fn test_empty_source_completes() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        std::fs::create_dir_all(config.source_root.join("only/dirs")).unwrap();

        let summary = BatchConverter::new(config.clone(), MemoryCodec)
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(summary.total_files, 0);
        assert_eq!(summary.stats.files_processed(), 0);
        assert!(config.dest_root.join("only/dirs").is_dir());
    }

    #[tokio::test]
    async fn test_failed_decode_is_counted() {
        let temp = TempDir::new().unwrap();
        let config = config_for(temp.path());
        std::fs::create_dir_all(&config.source_root).unwrap();
        std::fs::write(config.source_root.join("bad.heic"), b"").unwrap();
        std::fs::write(config.source_root.join("good.heic"), fixture_bytes(40, 20)).unwrap();

        let summary = BatchConverter::new(config.clone(), MemoryCodec)
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.stats.files_failed, 1);
        assert_eq!(summary.stats.failures[0].1, "Output is undefined");
        assert!(!config.dest_root.join("bad.jpg").exists());
        assert!(config.dest_root.join("good.jpg").exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            target_width: 0,
            ..Default::default()
        };
        assert!(BatchConverter::new(config, MemoryCodec).is_err());
    }
}
