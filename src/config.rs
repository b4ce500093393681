//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della conversione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con radici sorgente/destinazione e parametri immagine
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `source_root`: Albero da convertire (default: "from_heics")
//! - `dest_root`: Albero di output speculare (default: "to_jpeg")
//! - `target_width`: Larghezza output in pixel (default: 1050)
//! - `heic_quality`: Qualità in fase di decodifica HEIC, scala 0-1 (default: 0.6)
//! - `jpeg_quality`: Qualità dell'encoding JPEG finale (1-100, default: 80)
//! - `json_output`: Eventi JSON su stdout (default: false)
//! - `progress_bar`: Barra di progresso indicatif (default: true)
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     target_width: 1600,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the tree to convert
    pub source_root: PathBuf,
    /// Root of the mirrored output tree
    pub dest_root: PathBuf,
    /// Output width in pixels, height follows the aspect ratio
    pub target_width: u32,
    /// HEIC decode quality (0.0-1.0]
    pub heic_quality: f32,
    /// JPEG encode quality (1-100)
    pub jpeg_quality: u8,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// Draw a progress bar on the terminal
    pub progress_bar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("from_heics"),
            dest_root: PathBuf::from("to_jpeg"),
            target_width: 1050,
            heic_quality: 0.6,
            jpeg_quality: 80,
            json_output: false,
            progress_bar: true,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.target_width == 0 {
            return Err(ConvertError::Validation(
                "Target width must be greater than 0".to_string(),
            ));
        }

        if !(self.heic_quality > 0.0 && self.heic_quality <= 1.0) {
            return Err(ConvertError::Validation(
                "HEIC quality must be in (0.0, 1.0]".to_string(),
            ));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConvertError::Validation(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        let source = normalize(&self.source_root);
        let dest = normalize(&self.dest_root);
        if dest.starts_with(&source) {
            return Err(ConvertError::Validation(format!(
                "Destination {} must not be inside source {}",
                self.dest_root.display(),
                self.source_root.display()
            )));
        }

        Ok(())
    }

    /// Decode quality as the 0-100 integer external decoders expect
    pub fn heic_quality_percent(&self) -> u8 {
        (self.heic_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Lexical normalization, enough to compare two user-supplied roots
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
