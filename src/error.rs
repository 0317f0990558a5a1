use thiserror::Error;

/// Library error type for collage layout and rendering.
#[derive(Debug, Error)]
pub enum CollageError {
    /// No images were supplied to the render pass.
    #[error("no images supplied")]
    EmptyInput,

    /// The drawing surface could not be acquired or resized.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The packer produced fewer cells than required. This indicates a logic
    /// defect in the rectangle/count relationship, not a recoverable
    /// runtime condition.
    #[error("layout produced {produced} cells, expected {expected}")]
    LayoutShortfall { expected: usize, produced: usize },

    /// A single image failed to decode; the whole render pass aborts.
    #[error("failed to decode image {id}: {cause}")]
    Decode { id: String, cause: anyhow::Error },

    /// The requested main image id is not present in the item list.
    #[error("main image {0} not found in item list")]
    UnknownMainImage(String),

    /// Cooperative cancellation was observed.
    #[error("render canceled")]
    Canceled,

    /// Export encoding produced no output.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl CollageError {
    /// `true` for intentional cancellation, so callers can suppress error UI.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
