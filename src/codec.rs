//! # Codec Backend Module
//!
//! Interfaccia di capacità per decodifica HEIC ed encoding JPEG, così il
//! backend può essere sostituito senza toccare la logica di attraversamento.
//!
//! ## Architettura
//!
//! - `ImageCodec`: trait con `decode(buffer) -> pixel` e `encode(pixel, path, width)`
//! - `ExternalToolCodec`: backend di produzione, decodifica HEIC con tool esterni
//!   e riusa l'encoder JPEG in-memory di default
//!
//! ## Tool Strategy
//! **Priorità Tool (decrescente):**
//! 1. **heif-dec** (libheif >= 1.17)
//! 2. **heif-convert** (libheif, nome storico)
//! 3. **magick** (ImageMagick 7.x)
//! 4. **convert** (ImageMagick 6.x/legacy)
//!
//! Il buffer HEIC viene scritto in una directory temporanea, il tool produce un
//! JPEG intermedio alla qualità di decodifica configurata, che viene poi caricato
//! in memoria con `image`.

use crate::error::ConvertError;
use crate::image_processor::{resize_to_width, write_jpeg};
use crate::platform::PlatformCommands;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Message used when a decoder runs but leaves nothing behind
pub const EMPTY_OUTPUT: &str = "Output is undefined";

/// Decode/encode capability used by the transcoder
#[allow(async_fn_in_trait)]
pub trait ImageCodec {
    /// Decode a full HEIC buffer into pixels
    async fn decode(&self, buffer: &[u8]) -> Result<DynamicImage, ConvertError>;

    /// Resize `image` to `width` (height follows the aspect ratio) and write it as JPEG
    async fn encode(
        &self,
        image: &DynamicImage,
        destination: &Path,
        width: u32,
        quality: u8,
    ) -> Result<(), ConvertError> {
        let resized = resize_to_width(image, width)?;
        write_jpeg(&resized, destination, quality)
    }
}

/// HEIC decoding through libheif or ImageMagick command line tools
pub struct ExternalToolCodec {
    /// Quality of the intermediate JPEG (1-100)
    quality: u8,
    /// Cache del tool risolto per evitare lookup ripetuti
    tool: OnceCell<Option<&'static str>>,
}

impl ExternalToolCodec {
    pub fn new(quality: u8) -> Self {
        Self {
            quality,
            tool: OnceCell::new(),
        }
    }

    /// Resolve (once) the decoder to use
    async fn tool(&self) -> Option<&'static str> {
        *self
            .tool
            .get_or_init(|| async { PlatformCommands::instance().find_heic_decoder().await })
            .await
    }

    /// Controlla che almeno un decoder HEIC sia disponibile
    pub async fn check_dependencies(&self) -> Result<&'static str, ConvertError> {
        info!("Checking HEIC decoder dependencies...");
        match self.tool().await {
            Some(tool) => {
                info!("Using HEIC decoder: {}", tool);
                Ok(tool)
            }
            None => {
                let message = format!(
                    "no HEIC decoder found (tried {}); install libheif or ImageMagick",
                    PlatformCommands::instance().heic_decoders().join(", ")
                );
                warn!("{}", message);
                Err(ConvertError::MissingDependency(message))
            }
        }
    }

    /// Build the command line for a given tool
    fn build_command(&self, tool: &str, input: &Path, output: &Path) -> Command {
        let platform = PlatformCommands::instance();
        let mut command = Command::new(platform.get_command(tool));

        match tool {
            "heif-dec" | "heif-convert" => {
                command
                    .arg("-q")
                    .arg(self.quality.to_string())
                    .arg(input)
                    .arg(output);
            }
            _ => {
                command
                    .arg(input)
                    .arg("-quality")
                    .arg(self.quality.to_string())
                    .arg(output);
            }
        }

        command
    }

    /// libheif names the primary image `output-1.jpg` when a file holds several
    async fn locate_output(dir: &Path, expected: &Path) -> Option<PathBuf> {
        if tokio::fs::metadata(expected).await.is_ok() {
            return Some(expected.to_path_buf());
        }

        let mut candidates = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("output") {
                candidates.push(entry.path());
            }
        }
        candidates.sort();
        candidates.into_iter().next()
    }
}

impl ImageCodec for ExternalToolCodec {
    async fn decode(&self, buffer: &[u8]) -> Result<DynamicImage, ConvertError> {
        let tool = self.tool().await.ok_or_else(|| {
            ConvertError::Decode("no HEIC decoder available (install libheif or ImageMagick)".to_string())
        })?;

        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("input.heic");
        let output = workdir.path().join("output.jpg");
        tokio::fs::write(&input, buffer).await?;

        let mut command = self.build_command(tool, &input, &output);
        debug!("Command: {:?}", command);

        let result = command
            .output()
            .await
            .map_err(|e| ConvertError::Decode(format!("failed to run {}: {}", tool, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let reason = stderr.trim();
            return Err(ConvertError::Decode(if reason.is_empty() {
                format!("{} exited with {}", tool, result.status)
            } else {
                reason.to_string()
            }));
        }

        let produced = Self::locate_output(workdir.path(), &output)
            .await
            .ok_or_else(|| ConvertError::Decode(EMPTY_OUTPUT.to_string()))?;
        let bytes = tokio::fs::read(&produced).await?;
        if bytes.is_empty() {
            return Err(ConvertError::Decode(EMPTY_OUTPUT.to_string()));
        }

        image::load_from_memory(&bytes).map_err(|e| ConvertError::Decode(e.to_string()))
    }
}
