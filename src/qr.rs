//! QR code encoding for share links.

use base64::Engine;
use image::{ImageEncoder, Luma};
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("Failed to generate QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("Failed to encode PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// Turns a URL into image bytes that a phone camera can scan.
pub trait QrEncoder: Send + Sync {
    fn encode(&self, url: &str) -> Result<Vec<u8>, QrError>;

    /// Encoded image as standard base64, ready for a `data:` URL.
    fn encode_base64(&self, url: &str) -> Result<String, QrError> {
        let bytes = self.encode(url)?;
        Ok(base64::prelude::BASE64_STANDARD.encode(bytes))
    }
}

/// Square PNG renderer with medium error correction.
#[derive(Debug, Clone)]
pub struct PngQrEncoder {
    size: u32,
}

impl PngQrEncoder {
    pub fn new(size: u32) -> Self {
        Self { size }
    }
}

impl Default for PngQrEncoder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl QrEncoder for PngQrEncoder {
    fn encode(&self, url: &str) -> Result<Vec<u8>, QrError> {
        let code = QrCode::with_error_correction_level(url, EcLevel::M)?;
        let modules = code.render::<Luma<u8>>().build();
        let scaled = image::imageops::resize(
            &modules,
            self.size,
            self.size,
            image::imageops::FilterType::Nearest,
        );

        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png).write_image(
            &scaled,
            self.size,
            self.size,
            image::ExtendedColorType::L8,
        )?;
        Ok(png)
    }
}
