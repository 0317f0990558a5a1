use std::io::Cursor;

use anyhow::anyhow;
use image::RgbaImage;
use tracing::debug;

use super::CollageImageItem;
use crate::error::CollageError;

/// A decoded raster, scoped to the draw call that requested it. The pixel
/// buffer is owned and dropped immediately after its single use, on both the
/// success and the failure path.
#[derive(Debug)]
pub struct DecodedImage {
    image: RgbaImage,
}

impl DecodedImage {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.image
    }
}

/// Decodes an opaque binary image handle into pixels. Failure aborts the
/// whole render pass; there is no per-image skip.
pub trait ImageDecoder {
    fn decode(&self, item: &CollageImageItem) -> Result<DecodedImage, CollageError>;
}

/// Default decoder: sniffs the container format from the bytes and applies
/// EXIF orientation when the metadata carries one.
#[derive(Debug, Default)]
pub struct BytesDecoder;

impl ImageDecoder for BytesDecoder {
    fn decode(&self, item: &CollageImageItem) -> Result<DecodedImage, CollageError> {
        let reader = image::ImageReader::new(Cursor::new(&item.data))
            .with_guessed_format()
            .map_err(|err| CollageError::Decode {
                id: item.id.clone(),
                cause: anyhow!(err),
            })?;
        let img = reader.decode().map_err(|err| CollageError::Decode {
            id: item.id.clone(),
            cause: anyhow!(err),
        })?;

        let mut img = img.to_rgba8();
        let orientation = read_orientation(&item.data).unwrap_or(1);
        // Map common EXIF orientations; unsupported cases fall through as-is.
        match orientation {
            1 => {}
            2 => img = image::imageops::flip_horizontal(&img),
            3 => img = image::imageops::rotate180(&img),
            4 => img = image::imageops::flip_vertical(&img),
            5 => {
                img = image::imageops::rotate90(&img);
                img = image::imageops::flip_horizontal(&img);
            }
            6 => img = image::imageops::rotate90(&img),
            7 => {
                img = image::imageops::rotate270(&img);
                img = image::imageops::flip_horizontal(&img);
            }
            8 => img = image::imageops::rotate270(&img),
            _ => {}
        }

        Ok(DecodedImage::new(img))
    }
}

fn read_orientation(data: &[u8]) -> Option<u16> {
    let mut cursor = Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    debug!(orientation = value, "exif orientation found");
    Some(value as u16)
}
