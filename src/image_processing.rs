use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, GenericImageView, ImageFormat};

/// An image returned by the generation service: the decoded image plus the
/// exact bytes that were received, which are what gets uploaded.
#[derive(Clone, Debug)]
pub struct GeneratedImage {
    pub image: DynamicImage,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl GeneratedImage {
    pub fn from_base64(payload: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|err| anyhow!("invalid base64 image payload: {err}"))?;
        Self::from_bytes(bytes)
    }

    /// Unrecognised payloads are decoded as PNG so the decoder reports the error.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = detect_format(&bytes).unwrap_or(ImageFormat::Png);
        let image = image::load_from_memory_with_format(&bytes, format)
            .map_err(|err| anyhow!("decode {} image failed: {err}", format.to_mime_type()))?;
        Ok(Self {
            image,
            bytes,
            mime_type: format.to_mime_type(),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

const SUPPORTED_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// Sniffs the container format, limited to the decoders this crate enables.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .filter(|format| SUPPORTED_FORMATS.contains(format))
}
