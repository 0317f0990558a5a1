use anyhow::Context;
use fast_image_resize as fir;
use image::{Rgba, RgbaImage, imageops};

use super::decode::DecodedImage;
use crate::error::CollageError;
use crate::layout::Rect;

/// Pixel destination for the render pipeline: background fills and
/// source-subrect to destination-rect draws.
pub trait DrawSurface {
    /// Resize the surface to exact pixel dimensions before any draw.
    fn prepare(&mut self, width: u32, height: u32) -> Result<(), CollageError>;

    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]);

    /// Draw the `src_rect` window of a decoded image into `dest`, scaling as
    /// needed. The source window is expected to match the destination
    /// aspect already (see [`cover_crop`]).
    fn draw_image(
        &mut self,
        src: &DecodedImage,
        src_rect: Rect,
        dest: Rect,
    ) -> Result<(), CollageError>;
}

/// Center-cropped source window for cover fit: scale by
/// `max(dest_w / src_w, dest_h / src_h)` so the destination is filled
/// completely, cropping source edges symmetrically. No letterboxing.
pub fn cover_crop(src_w: u32, src_h: u32, dest_w: u32, dest_h: u32) -> Rect {
    let sw = f64::from(src_w.max(1));
    let sh = f64::from(src_h.max(1));
    let dw = f64::from(dest_w.max(1));
    let dh = f64::from(dest_h.max(1));

    let scale = (dw / sw).max(dh / sh);
    let visible_w = ((dw / scale).round() as u32).clamp(1, src_w.max(1));
    let visible_h = ((dh / scale).round() as u32).clamp(1, src_h.max(1));

    let x = (src_w.saturating_sub(visible_w)) / 2;
    let y = (src_h.saturating_sub(visible_h)) / 2;
    Rect::new(x, y, visible_w, visible_h)
}

/// CPU canvas backed by an `RgbaImage`.
#[derive(Debug, Default)]
pub struct CanvasSurface {
    canvas: RgbaImage,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }
}

impl DrawSurface for CanvasSurface {
    fn prepare(&mut self, width: u32, height: u32) -> Result<(), CollageError> {
        if width == 0 || height == 0 {
            return Err(CollageError::SurfaceUnavailable(format!(
                "canvas dimensions must be positive, got {width}x{height}"
            )));
        }
        self.canvas = RgbaImage::new(width, height);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let x1 = rect.right().min(self.canvas.width());
        let y1 = rect.bottom().min(self.canvas.height());
        for y in rect.y..y1 {
            for x in rect.x..x1 {
                self.canvas.put_pixel(x, y, Rgba(color));
            }
        }
    }

    fn draw_image(
        &mut self,
        src: &DecodedImage,
        src_rect: Rect,
        dest: Rect,
    ) -> Result<(), CollageError> {
        if dest.area() == 0 || src_rect.area() == 0 {
            return Ok(());
        }
        let window =
            imageops::crop_imm(src.pixels(), src_rect.x, src_rect.y, src_rect.width, src_rect.height)
                .to_image();
        let scaled = resize_rgba(&window, dest.width, dest.height)
            .map_err(|err| CollageError::SurfaceUnavailable(format!("resize failed: {err:#}")))?;
        imageops::overlay(&mut self.canvas, &scaled, i64::from(dest.x), i64::from(dest.y));
        Ok(())
    }
}

fn resize_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> anyhow::Result<RgbaImage> {
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("failed to create source view for cell resize")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .context("cell resize failed")?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .context("failed to construct resized RGBA image")
}
