//! Collage layout computation: region partitioning, proportional count
//! allocation, and near-square grid packing.

pub mod allocate;
pub mod grid;
pub mod region;

use crate::error::CollageError;

/// Smallest canvas edge the layout will operate on.
pub const MIN_CANVAS_SIZE: u32 = 64;

/// Axis-aligned rectangle in canvas pixels, origin top-left.
///
/// A zero-area rect is valid and means "no cell drawn here".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Pixel area shared with `other`. Zero for touching edges.
    pub fn intersection_area(&self, other: &Rect) -> u64 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        u64::from(x1 - x0) * u64::from(y1 - y0)
    }
}

/// The four ring regions surrounding the centered main square, in the fixed
/// order consumers rely on when zipping cells against an image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionName {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub name: RegionName,
    pub rect: Rect,
}

impl Region {
    pub fn area(&self) -> u64 {
        self.rect.area()
    }
}

/// Pure input to the layout computation; no hidden state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollageLayoutOptions {
    /// Canvas edge in pixels. Values below [`MIN_CANVAS_SIZE`] are clamped up.
    pub size: u32,
    /// Fraction of the canvas edge occupied by the main square, clamped to
    /// `[0.05, 0.95]`.
    pub main_ratio: f64,
    /// Inter-cell gap in pixels, clamped to `[0, size / 8]`.
    pub gap: u32,
    /// Number of ring images to place around the main square.
    pub others_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageLayout {
    pub size: u32,
    pub gap: u32,
    pub main_rect: Rect,
    /// Ring cells concatenated in region order top, right, bottom, left;
    /// row-major within each region. Always exactly `others_count` long.
    pub ring_cells: Vec<Rect>,
}

/// Compute the full collage layout: main rect plus exactly
/// `opts.others_count` ring cells.
pub fn compute_collage_layout(opts: &CollageLayoutOptions) -> Result<CollageLayout, CollageError> {
    let size = opts.size.max(MIN_CANVAS_SIZE);
    let gap = opts.gap.min(size / 8);

    let (main_rect, regions) = region::partition(size, opts.main_ratio);
    let counts = allocate::allocate_counts(opts.others_count, &regions);

    let mut ring_cells = Vec::with_capacity(opts.others_count);
    for (region, count) in regions.iter().zip(counts) {
        ring_cells.extend(grid::pack_grid(region.rect, count, gap));
    }

    if ring_cells.len() != opts.others_count {
        return Err(CollageError::LayoutShortfall {
            expected: opts.others_count,
            produced: ring_cells.len(),
        });
    }

    Ok(CollageLayout {
        size,
        gap,
        main_rect,
        ring_cells,
    })
}

/// Flat-mode layout: every image goes into one full-canvas grid, no main
/// square.
pub fn compute_flat_layout(size: u32, gap: u32, count: usize) -> Result<Vec<Rect>, CollageError> {
    let size = size.max(MIN_CANVAS_SIZE);
    let gap = gap.min(size / 8);
    let cells = grid::pack_grid(Rect::new(0, 0, size, size), count, gap);
    if cells.len() != count {
        return Err(CollageError::LayoutShortfall {
            expected: count,
            produced: cells.len(),
        });
    }
    Ok(cells)
}
