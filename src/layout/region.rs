//! Region partitioning: one centered main square plus four ring strips.

use super::{Rect, Region, RegionName};

/// Split a square canvas into the centered main rect and the four ring
/// regions. All inputs are pre-clamped here; there are no failure modes, and
/// zero-area regions are valid output.
///
/// Top and bottom strips span the full canvas width; left and right span
/// only the main square's height, so the corners are counted once.
pub fn partition(size: u32, main_ratio: f64) -> (Rect, [Region; 4]) {
    let ratio = main_ratio.clamp(0.05, 0.95);
    let mut main_size = ((f64::from(size) * ratio).round() as u32).clamp(1, size);

    // Keep (size - main_size) even so the ring thickness is a whole pixel
    // and main/ring placement share exact integer coordinates.
    if (size - main_size) % 2 == 1 {
        main_size += 1;
    }

    let ring = (size - main_size) / 2;
    let main_rect = Rect::new(ring, ring, main_size, main_size);

    let regions = [
        Region {
            name: RegionName::Top,
            rect: Rect::new(0, 0, size, ring),
        },
        Region {
            name: RegionName::Right,
            rect: Rect::new(ring + main_size, ring, ring, main_size),
        },
        Region {
            name: RegionName::Bottom,
            rect: Rect::new(0, ring + main_size, size, ring),
        },
        Region {
            name: RegionName::Left,
            rect: Rect::new(0, ring, ring, main_size),
        },
    ];

    (main_rect, regions)
}
