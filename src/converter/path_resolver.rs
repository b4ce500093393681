//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di destinazione nell'albero speculare.
//! I file HEIC diventano `<stem>.jpg`; gli altri mantengono il nome (vedi `FileManager::copy_file`).

use crate::error::ConvertError;
use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Rewrite the `source_root` prefix of `path` to `dest_root`
    pub fn mirror(path: &Path, source_root: &Path, dest_root: &Path) -> Result<PathBuf, ConvertError> {
        let relative = path.strip_prefix(source_root).map_err(|_| {
            ConvertError::filesystem(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not under {}", source_root.display()),
                ),
            )
        })?;
        Ok(dest_root.join(relative))
    }

    /// `dest_dir/<stem>.jpg` for a HEIC source
    pub fn jpeg_destination(source: &Path, dest_dir: &Path) -> Result<PathBuf, ConvertError> {
        let file_stem = source
            .file_stem()
            .ok_or_else(|| ConvertError::Decode(format!("Invalid file name: {}", source.display())))?;

        let mut file_name = file_stem.to_os_string();
        file_name.push(".jpg");
        Ok(dest_dir.join(file_name))
    }
}
