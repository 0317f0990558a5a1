//! Proportional count allocation across ring regions using
//! largest-remainder rounding.

use super::Region;

/// Distribute `total` items across the four regions weighted by pixel area.
///
/// Floor each exact share, then award the rounding shortfall to the regions
/// with the largest fractional remainders (ties keep input order). The
/// returned counts always sum to exactly `total`; a zero combined area
/// yields all zeros rather than fabricated cells.
pub fn allocate_counts(total: usize, regions: &[Region; 4]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    if total == 0 {
        return counts;
    }
    let sum_area: u64 = regions.iter().map(Region::area).sum();
    if sum_area == 0 {
        return counts;
    }

    let mut remainders = [0f64; 4];
    let mut assigned = 0usize;
    for (i, region) in regions.iter().enumerate() {
        let share = total as f64 * region.area() as f64 / sum_area as f64;
        counts[i] = share.floor() as usize;
        remainders[i] = share - share.floor();
        assigned += counts[i];
    }

    let mut order = [0usize, 1, 2, 3];
    order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]));

    let shortfall = total.saturating_sub(assigned);
    for &i in order.iter().take(shortfall.min(4)) {
        counts[i] += 1;
        assigned += 1;
    }

    // Floor plus remainder arithmetic cannot leave a residual, but if it
    // ever did the top region absorbs it so the sum stays exact.
    if assigned != total {
        counts[0] = counts[0].saturating_add(total).saturating_sub(assigned);
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::region::partition;
    use crate::layout::{Rect, RegionName};

    fn regions_with_areas(areas: [(u32, u32); 4]) -> [Region; 4] {
        let names = [
            RegionName::Top,
            RegionName::Right,
            RegionName::Bottom,
            RegionName::Left,
        ];
        let mut out = [Region {
            name: RegionName::Top,
            rect: Rect::new(0, 0, 0, 0),
        }; 4];
        for (i, ((w, h), name)) in areas.into_iter().zip(names).enumerate() {
            out[i] = Region {
                name,
                rect: Rect::new(0, 0, w, h),
            };
        }
        out
    }

    #[test]
    fn counts_always_sum_to_total() {
        let (_, regions) = partition(500, 0.6);
        for total in 0..200 {
            let counts = allocate_counts(total, &regions);
            assert_eq!(counts.iter().sum::<usize>(), total, "total = {total}");
        }
    }

    #[test]
    fn allocation_is_proportional_to_area() {
        // top/bottom strips carry twice the area of the sides.
        let regions = regions_with_areas([(100, 25), (25, 50), (100, 25), (25, 50)]);
        let counts = allocate_counts(12, &regions);
        assert_eq!(counts, [4, 2, 4, 2]);
    }

    #[test]
    fn largest_remainder_breaks_toward_bigger_fraction() {
        // shares: 7 * [0.5, 0.25, 0.125, 0.125] = [3.5, 1.75, 0.875, 0.875]
        // floors sum to 4; the three extras go to remainders 0.875, 0.875
        // (ties in input order) and 0.75.
        let regions = regions_with_areas([(40, 10), (20, 10), (10, 10), (10, 10)]);
        let counts = allocate_counts(7, &regions);
        assert_eq!(counts, [3, 2, 1, 1]);
    }

    #[test]
    fn zero_total_allocates_nothing() {
        let (_, regions) = partition(300, 0.5);
        assert_eq!(allocate_counts(0, &regions), [0; 4]);
    }

    #[test]
    fn zero_area_allocates_nothing() {
        let regions = regions_with_areas([(0, 0); 4]);
        assert_eq!(allocate_counts(10, &regions), [0; 4]);
    }
}
