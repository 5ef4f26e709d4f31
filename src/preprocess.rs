use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::{ForgeError, Result};
use crate::models::ImageAsset;

/// Max edge length for general production assets.
pub const PRODUCTION_MAX_DIMENSION: u32 = 2048;
/// Max edge length for higher-volume thumbnail assets.
pub const THUMBNAIL_MAX_DIMENSION: u32 = 1280;

/// Fixed re-encode quality factor (0.9).
const JPEG_QUALITY: u8 = 90;

/// Normalize an input image into a bounded-size, transport-ready form.
///
/// Downsizes the longer edge to `max_dimension` preserving aspect ratio,
/// re-encodes as JPEG at the fixed quality factor, and re-derives the MIME
/// type from the re-encoded header rather than trusting the caller's claim.
///
/// Preprocessing is a best-effort optimization, never a hard dependency:
/// a corrupt or unsupported input is returned unmodified instead of
/// failing the request.
pub fn optimize(asset: &ImageAsset, max_dimension: u32) -> ImageAsset {
    match try_optimize(asset, max_dimension) {
        Ok(optimized) => optimized,
        Err(e) => {
            log::debug!("image optimization skipped, using original asset: {}", e);
            asset.clone()
        }
    }
}

fn try_optimize(asset: &ImageAsset, max_dimension: u32) -> Result<ImageAsset> {
    let bytes = BASE64
        .decode(&asset.data)
        .map_err(|e| ForgeError::RequestError(format!("invalid base64 image data: {}", e)))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| ForgeError::RequestError(format!("undecodable image: {}", e)))?;

    let (width, height) = img.dimensions();
    let img = if width.max(height) > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = img.to_rgb8();
    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| ForgeError::RequestError(format!("re-encode failed: {}", e)))?;

    let format = image::guess_format(&encoded)
        .map_err(|e| ForgeError::ResponseError(format!("unrecognized re-encoded header: {}", e)))?;

    Ok(ImageAsset {
        data: BASE64.encode(&encoded),
        mime_type: format.to_mime_type().to_string(),
    })
}
