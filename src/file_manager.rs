//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file dell'albero sorgente.
//!
//! ## Responsabilità:
//! - Classificazione formato file (HEIC vs tutto il resto)
//! - Conteggio ricorsivo dei file regolari per il calcolo del progresso
//! - Copia byte-per-byte dei file non HEIC nella destinazione speculare
//! - Formattazione human-readable delle dimensioni
//!
//! ## Operazioni sui file:
//! - `is_heic()`: `.heic` case-insensitive, nessun I/O
//! - `count_files()`: conta i file regolari, le directory valgono zero
//! - `copy_file()`: copia in `dest_dir/<basename>`, sovrascrive senza avvisi
//!
//! ## Esempio:
//! ```ignore
//! let total = FileManager::count_files(Path::new("from_heics"))?;
//! if FileManager::is_heic(&path) {
//!     // transcode
//! }
//! ```

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Check if a file is a HEIC image, by extension only
    pub fn is_heic(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("heic"))
            .unwrap_or(false)
    }

    /// Count all regular files below `root`.
    ///
    /// Any unreadable directory aborts the count: a partial total would make
    /// every progress percentage wrong.
    pub fn count_files(root: &Path) -> Result<u64, ConvertError> {
        let metadata =
            std::fs::metadata(root).map_err(|e| ConvertError::filesystem(root, e))?;
        if !metadata.is_dir() {
            return Err(ConvertError::filesystem(
                root,
                std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
            ));
        }

        let mut count = 0;
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() {
                count += 1;
            } else if !entry.file_type().is_dir() {
                debug!("Not counting special file: {}", entry.path().display());
            }
        }

        Ok(count)
    }

    /// Copy a file verbatim into `dest_dir`, keeping its name
    pub async fn copy_file(source: &Path, dest_dir: &Path) -> Result<PathBuf, ConvertError> {
        let file_name = source.file_name().ok_or_else(|| ConvertError::Copy {
            path: source.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let destination = dest_dir.join(file_name);

        fs::copy(source, &destination)
            .await
            .map_err(|e| ConvertError::Copy {
                path: source.to_path_buf(),
                source: e,
            })?;

        debug!("Copied {} -> {}", source.display(), destination.display());
        Ok(destination)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_heic_case_insensitive() {
        assert!(FileManager::is_heic(Path::new("a.heic")));
        assert!(FileManager::is_heic(Path::new("sub/c.HEIC")));
        assert!(FileManager::is_heic(Path::new("IMG_0001.HeIc")));
        assert!(!FileManager::is_heic(Path::new("b.png")));
        assert!(!FileManager::is_heic(Path::new("heic")));
        assert!(!FileManager::is_heic(Path::new(".heic")));
        assert!(!FileManager::is_heic(Path::new("archive.heic.zip")));
        assert!(!FileManager::is_heic(Path::new("")));
    }

    #[test]
    fn test_count_files_nested() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::write(root.join("a.heic"), b"x").unwrap();
        std::fs::write(root.join("b.png"), b"x").unwrap();
        std::fs::create_dir_all(root.join("sub/deeper/deepest")).unwrap();
        std::fs::create_dir_all(root.join("empty")).unwrap();
        std::fs::write(root.join("sub/c.HEIC"), b"x").unwrap();
        std::fs::write(root.join("sub/deeper/deepest/d.txt"), b"x").unwrap();

        assert_eq!(FileManager::count_files(root).unwrap(), 4);
    }

    #[test]
    fn test_count_files_empty_tree() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("a/b/c")).unwrap();
        assert_eq!(FileManager::count_files(temp.path()).unwrap(), 0);
    }

    #[test]
    fn test_count_files_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = FileManager::count_files(&temp.path().join("from_heics")).unwrap_err();
        assert!(matches!(err, ConvertError::Filesystem { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_count_files_root_is_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not_a_dir.png");
        std::fs::write(&file, b"x").unwrap();
        assert!(FileManager::count_files(&file).is_err());
    }

    #[tokio::test]
    async fn test_copy_file_byte_for_byte() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("photo.png");
        let dest_dir = temp.path().join("out");
        std::fs::create_dir(&dest_dir).unwrap();
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        std::fs::write(&source, &payload).unwrap();

        let copied = FileManager::copy_file(&source, &dest_dir).await.unwrap();

        assert_eq!(copied, dest_dir.join("photo.png"));
        assert_eq!(std::fs::read(&copied).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_copy_file_overwrites() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.txt");
        let dest_dir = temp.path().join("out");
        std::fs::create_dir(&dest_dir).unwrap();
        std::fs::write(&source, b"fresh").unwrap();
        std::fs::write(dest_dir.join("notes.txt"), b"stale content").unwrap();

        FileManager::copy_file(&source, &dest_dir).await.unwrap();

        assert_eq!(std::fs::read(dest_dir.join("notes.txt")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_copy_into_missing_dir_is_copy_error() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("b.png");
        std::fs::write(&source, b"x").unwrap();

        let err = FileManager::copy_file(&source, &temp.path().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Copy { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
