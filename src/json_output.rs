//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso da altri programmi.
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout, con tag `type`
//! - Riusa `ConversionOutcome` e `Config` esistenti
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio conversione con totale file e configurazione
//! - `file_complete`: Esito di un singolo file
//! - `progress`: Progresso corrente
//! - `complete`: Fine run con statistiche finali
//! - `error`: Errore fatale

use crate::config::Config;
use crate::progress::{percent_complete, ConversionOutcome, ConversionStats};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio della conversione
    #[serde(rename = "start")]
    Start {
        source_root: PathBuf,
        dest_root: PathBuf,
        total_files: u64,
        config: JsonConfig,
    },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        source: PathBuf,
        destination: Option<PathBuf>,
        outcome: String,
        error: Option<String>,
    },

    /// Progresso corrente
    #[serde(rename = "progress")]
    Progress {
        current: u64,
        total: u64,
        percentage: f64,
    },

    /// Conversione completata
    #[serde(rename = "complete")]
    Complete {
        converted: usize,
        copied: usize,
        failed: usize,
        duration_seconds: f64,
    },

    /// Errore fatale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JsonConfig {
    pub target_width: u32,
    pub heic_quality: f32,
    pub jpeg_quality: u8,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(config: &Config, total_files: u64) -> Self {
        Self::Start {
            source_root: config.source_root.clone(),
            dest_root: config.dest_root.clone(),
            total_files,
            config: JsonConfig::from(config),
        }
    }

    pub fn file_complete(source: &Path, outcome: &ConversionOutcome) -> Self {
        Self::FileComplete {
            source: source.to_path_buf(),
            destination: outcome.destination().map(Path::to_path_buf),
            outcome: outcome.label().to_string(),
            error: match outcome {
                ConversionOutcome::Failed(reason) => Some(reason.clone()),
                _ => None,
            },
        }
    }

    pub fn progress(current: u64, total: u64) -> Self {
        Self::Progress {
            current,
            total,
            percentage: (percent_complete(current, total) * 100.0).round() / 100.0,
        }
    }

    pub fn complete(stats: &ConversionStats, duration_seconds: f64) -> Self {
        Self::Complete {
            converted: stats.files_converted,
            copied: stats.files_copied,
            failed: stats.files_failed,
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            target_width: config.target_width,
            heic_quality: config.heic_quality,
            jpeg_quality: config.jpeg_quality,
        }
    }
}
