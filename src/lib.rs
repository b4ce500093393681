//! # HEIC Mirror Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore (fatali vs per-file)
//! - `file_manager`: Classificazione, conteggio e copia dei file
//! - `platform`: Ricerca dei decoder HEIC esterni
//! - `codec`: Interfaccia decode/encode e backend a tool esterni
//! - `image_processor`: Conversione HEIC → JPEG ridimensionato
//! - `progress`: Stato di avanzamento, report e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//! - `converter`: Traversata dell'albero e orchestrazione
//!
//! ## Utilizzo:
//! ```ignore
//! use heic_mirror::{BatchConverter, Config};
//!
//! let converter = BatchConverter::with_external_tools(Config::default()).await?;
//! let summary = converter.run().await?;
//! ```

pub mod codec;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod platform;
pub mod progress;

pub use codec::{ExternalToolCodec, ImageCodec};
pub use config::Config;
pub use converter::{BatchConverter, RunSummary};
pub use error::ConvertError;
pub use progress::{ConversionOutcome, ConversionStats, ProgressState};
