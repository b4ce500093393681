//! # HEIC Mirror - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Composizione della configurazione (default → file JSON → flag CLI)
//! - Avvio della conversione
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging su stderr (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica il file di configurazione, se indicato, e applica gli override
//! 4. Istanzia BatchConverter e avvia la run
//!
//! ## Esempio di utilizzo:
//! ```bash
//! heic-mirror --source from_heics --dest to_jpeg --width 1050 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use heic_mirror::{BatchConverter, Config};

#[derive(Parser)]
#[command(name = "heic-mirror")]
#[command(about = "Mirror a directory tree, converting HEIC photos to resized JPEGs")]
struct Args {
    /// Directory containing the photos to convert [default: from_heics]
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output directory mirroring the source tree [default: to_jpeg]
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Output width in pixels [default: 1050]
    #[arg(short, long)]
    width: Option<u32>,

    /// HEIC decode quality, 0-1 [default: 0.6]
    #[arg(long)]
    heic_quality: Option<f32>,

    /// JPEG quality (1-100) [default: 80]
    #[arg(short = 'q', long)]
    jpeg_quality: Option<u8>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit one JSON event per line on stdout
    #[arg(long)]
    json: bool,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress_bar: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply command line overrides on top of `config`
    fn apply(self, mut config: Config) -> Config {
        if let Some(source) = self.source {
            config.source_root = source;
        }
        if let Some(dest) = self.dest {
            config.dest_root = dest;
        }
        if let Some(width) = self.width {
            config.target_width = width;
        }
        if let Some(quality) = self.heic_quality {
            config.heic_quality = quality;
        }
        if let Some(quality) = self.jpeg_quality {
            config.jpeg_quality = quality;
        }
        if self.json {
            config.json_output = true;
        }
        if self.no_progress_bar {
            config.progress_bar = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let base = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    let config = args.apply(base);

    let converter = BatchConverter::with_external_tools(config).await?;
    converter.run().await?;

    Ok(())
}
