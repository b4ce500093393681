//! # Image Processing Module
//!
//! Questo modulo converte un singolo file HEIC in un JPEG ridimensionato.
//!
//! ## Pipeline di conversione
//!
//! 1. **Lettura**: l'intero file HEIC viene letto in memoria
//! 2. **Decodifica**: il buffer passa al backend `ImageCodec` (qualità di decodifica configurata)
//! 3. **Resize**: larghezza = `target_width`, altezza proporzionale all'originale
//! 4. **Scrittura**: `<nome senza estensione>.jpg` nella directory di destinazione corrente
//!
//! ## Gestione Path Output
//!
//! ```text
//! Input:  from_heics/2023/vacation/IMG_001.HEIC
//! Dest:   to_jpeg/2023/vacation/
//! Output: to_jpeg/2023/vacation/IMG_001.jpg
//! ```
//!
//! ## Error Handling
//!
//! Tutti gli errori qui sono per-file: il chiamante li logga e passa al file
//! successivo. Nessun file di destinazione resta su disco se la scrittura fallisce.
//!
//! ## Nessuna protezione contro l'upscaling
//!
//! Una sorgente più stretta di `target_width` viene ingrandita.

use crate::codec::ImageCodec;
use crate::config::Config;
use crate::converter::path_resolver::PathResolver;
use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Height that keeps the aspect ratio of `width`×`height` at `target_width`
pub fn proportional_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (height as f64 * target_width as f64 / width as f64).round();
    (scaled as u32).max(1)
}

/// Resize to exactly `target_width` pixels wide
pub fn resize_to_width(image: &DynamicImage, target_width: u32) -> Result<DynamicImage, ConvertError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ConvertError::Decode("decoded image has no pixels".to_string()));
    }

    let target_height = proportional_height(image.width(), image.height(), target_width);
    debug!(
        "Resizing {}x{} -> {}x{}",
        image.width(),
        image.height(),
        target_width,
        target_height
    );

    Ok(image.resize_exact(target_width, target_height, FilterType::Lanczos3))
}

/// Encode `image` as JPEG at `destination`, overwriting any existing file
pub fn write_jpeg(image: &DynamicImage, destination: &Path, quality: u8) -> Result<(), ConvertError> {
    let encode_error = |reason: String| ConvertError::EncodeWrite {
        path: destination.to_path_buf(),
        reason,
    };

    let result = (|| {
        let rgb = image.to_rgb8();
        let file = File::create(destination).map_err(|e| encode_error(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| encode_error(e.to_string()))?;
        writer.flush().map_err(|e| encode_error(e.to_string()))
    })();

    if result.is_err() {
        if let Err(e) = std::fs::remove_file(destination) {
            debug!("Could not remove partial output {}: {}", destination.display(), e);
        }
    }
    result
}

/// Converts HEIC files into resized JPEGs through a codec backend
pub struct ImageTranscoder<C> {
    codec: C,
    target_width: u32,
    jpeg_quality: u8,
}

impl<C: ImageCodec> ImageTranscoder<C> {
    pub fn new(codec: C, config: &Config) -> Self {
        Self {
            codec,
            target_width: config.target_width,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Convert `source` into `dest_dir/<stem>.jpg`, returning the written path
    pub async fn transcode(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf, ConvertError> {
        let destination = PathResolver::jpeg_destination(source, dest_dir)?;

        let buffer = fs::read(source).await?;
        debug!("Decoding {} ({} bytes)", source.display(), buffer.len());

        let decoded = self.codec.decode(&buffer).await?;
        self.codec
            .encode(&decoded, &destination, self.target_width, self.jpeg_quality)
            .await?;

        debug!("Wrote {}", destination.display());
        Ok(destination)
    }
}
