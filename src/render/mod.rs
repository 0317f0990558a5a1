//! Render pipeline: decoding, cover-fit compositing, progress reporting,
//! and cooperative cancellation.

pub mod decode;
pub mod pipeline;
pub mod surface;

pub use decode::{BytesDecoder, DecodedImage, ImageDecoder};
pub use pipeline::{RenderRequest, render_collage};
pub use surface::{CanvasSurface, DrawSurface, cover_crop};

/// One source image with a stable identity; `data` is an opaque encoded
/// container (any raster format the decoder can sniff).
#[derive(Debug, Clone)]
pub struct CollageImageItem {
    pub id: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Layout,
    Decode,
    Render,
    Export,
}

/// Progress checkpoint. Within one render invocation `done` only increases
/// and `total` is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageProgress {
    pub phase: RenderPhase,
    pub done: usize,
    pub total: usize,
    pub message: Option<String>,
}

/// Callback surface for progress checkpoints. The pipeline never depends on
/// a sink being present; pass [`NoopProgress`] to ignore reports.
pub trait ProgressSink {
    fn report(&mut self, progress: CollageProgress);
}

impl<F: FnMut(CollageProgress)> ProgressSink for F {
    fn report(&mut self, progress: CollageProgress) {
        self(progress);
    }
}

#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&mut self, _progress: CollageProgress) {}
}
