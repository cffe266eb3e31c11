//! Image normalization: downscale and re-encode before storage.

use std::io::Cursor;

use image::imageops::FilterType;
use image::GenericImageView;
use log::debug;

use crate::catalog::model::ImagePayload;
use crate::error::ImagingError;

/// Default longer-side bound applied before images enter storage.
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

/// JPEG quality used when re-encoding lossy formats.
const JPEG_QUALITY: u8 = 90;

/// Bounds an image's longer side to `max_dimension`.
///
/// Images already within the bound are returned unchanged. Larger images
/// are scaled proportionally so the longer side equals `max_dimension`,
/// then re-encoded: PNG stays PNG to preserve transparency, everything
/// else becomes JPEG at a fixed quality. Deterministic for identical
/// input and bound.
pub fn normalize(payload: &ImagePayload, max_dimension: u32) -> Result<ImagePayload, ImagingError> {
    let _span = tracing::info_span!("imaging.normalize").entered();

    let img = image::load_from_memory(&payload.data)
        .map_err(|e| ImagingError::Decode(e.to_string()))?;

    let (width, height) = img.dimensions();
    if width.max(height) <= max_dimension {
        debug!(
            "Image {}x{} within bound {}, returning unchanged",
            width, height, max_dimension
        );
        return Ok(payload.clone());
    }

    // `resize` preserves aspect ratio while fitting within the bounds, so
    // the longer side lands exactly on max_dimension.
    let resized = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    let (new_width, new_height) = resized.dimensions();
    debug!(
        "Resized image {}x{} -> {}x{}",
        width, height, new_width, new_height
    );

    if payload.is_png() {
        let mut buf = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| ImagingError::Encode(e.to_string()))?;
        Ok(ImagePayload::png(buf))
    } else {
        let rgb = resized.to_rgb8();
        let mut buf = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
        encoder
            .encode_image(&rgb)
            .map_err(|e| ImagingError::Encode(e.to_string()))?;
        Ok(ImagePayload::new(buf, "image/jpeg"))
    }
}
