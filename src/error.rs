//! # Error Types Module
//!
//! Questo modulo definisce la tassonomia degli errori della conversione.
//!
//! ## Categorie di errori:
//! - `Filesystem`: root mancante o non leggibile durante conteggio/attraversamento (fatale)
//! - `Decode`: decodifica HEIC fallita o output vuoto (recuperabile, file saltato)
//! - `EncodeWrite`: resize/scrittura JPEG fallita (recuperabile, file saltato)
//! - `Copy`: copia passthrough fallita (recuperabile, file saltato)
//! - `Validation`: parametri di configurazione non validi
//! - `MissingDependency`: nessun decoder HEIC esterno disponibile
//!
//! ## Politica di propagazione:
//! Gli errori fatali interrompono la run; gli errori per singolo file vengono
//! loggati e la traversata continua. Vedi `ConvertError::is_fatal()`.
//!
//! ## Esempio:
//! ```ignore
//! if output.is_empty() {
//!     return Err(ConvertError::Decode("Output is undefined".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for tree conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Decode(String),

    #[error("Failed to write {}: {reason}", .path.display())]
    EncodeWrite { path: PathBuf, reason: String },

    #[error("Failed to copy {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration error: {0}")]
    Validation(String),
}

impl ConvertError {
    /// Wrap an I/O error raised while reading or creating part of the tree
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the whole run instead of a single file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Filesystem { .. } | Self::Validation(_) | Self::MissingDependency(_)
        )
    }
}

impl From<walkdir::Error> for ConvertError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop detected"));
        Self::Filesystem { path, source }
    }
}
