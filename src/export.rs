//! Canvas export: encode a finished collage to an image container selected
//! by MIME type.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, RgbaImage};

use crate::error::CollageError;

const DEFAULT_JPEG_QUALITY: f32 = 0.9;

/// Encode `canvas` to the container named by `mime` (`image/png`,
/// `image/jpeg`, or `image/webp`). `quality` in `[0, 1]` applies to JPEG
/// only; PNG and WebP are lossless here.
pub fn encode_canvas(
    canvas: &RgbaImage,
    mime: &str,
    quality: Option<f32>,
) -> Result<Vec<u8>, CollageError> {
    let mut buf = Cursor::new(Vec::new());
    match mime {
        "image/png" => canvas
            .write_with_encoder(PngEncoder::new(&mut buf))
            .map_err(|err| CollageError::Encode(err.to_string()))?,
        "image/jpeg" => {
            let q = quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(0.0, 1.0);
            // JPEG carries no alpha channel
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(
                &mut buf,
                (q * 100.0).round().clamp(1.0, 100.0) as u8,
            ))
            .map_err(|err| CollageError::Encode(err.to_string()))?;
        }
        "image/webp" => canvas
            .write_with_encoder(WebPEncoder::new_lossless(&mut buf))
            .map_err(|err| CollageError::Encode(err.to_string()))?,
        other => {
            return Err(CollageError::Encode(format!(
                "unsupported image type: {other}"
            )));
        }
    }

    let bytes = buf.into_inner();
    if bytes.is_empty() {
        return Err(CollageError::Encode(format!(
            "{mime} encoder produced no output"
        )));
    }
    Ok(bytes)
}

/// File extension for a supported export MIME type.
pub fn extension_for(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
