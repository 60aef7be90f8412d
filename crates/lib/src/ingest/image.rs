//! Image acquisition: sniffs the format from the bytes and checks that they decode.

use super::types::{ImageInput, RawInput};
use crate::errors::AcquisitionError;
use image::{GenericImageView, ImageFormat};
use tracing::info;

/// Raster formats accepted for image extraction.
pub const ACCEPTED_IMAGE_FORMATS: [ImageFormat; 3] =
    [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Validates an uploaded image and wraps it as a `RawInput::Image`.
///
/// The original bytes are passed through untouched.
pub fn load_image(bytes: Vec<u8>) -> Result<RawInput, AcquisitionError> {
    let format = image::guess_format(&bytes)
        .map_err(|e| AcquisitionError::UndecodableImage(e.to_string()))?;
    if !ACCEPTED_IMAGE_FORMATS.contains(&format) {
        return Err(AcquisitionError::UnsupportedFormat(format!(
            "{format:?} images are not supported; use JPEG, PNG or WebP"
        )));
    }

    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| AcquisitionError::UndecodableImage(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    info!("Accepted {format:?} image ({width}x{height}, {} bytes)", bytes.len());

    Ok(RawInput::Image(ImageInput {
        mime_type: format.to_mime_type().to_string(),
        data: bytes,
        width,
        height,
    }))
}
