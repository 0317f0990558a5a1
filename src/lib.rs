pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod render;
pub mod scan;

pub use error::CollageError;
pub use layout::{CollageLayout, CollageLayoutOptions, Rect, compute_collage_layout};
pub use render::{CollageImageItem, CollageProgress, RenderPhase, RenderRequest, render_collage};
