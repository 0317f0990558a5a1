//! Near-square grid packing: searches row counts for the best exact-fill
//! decomposition of `n` cells inside a rectangle.

use super::Rect;

/// Pack exactly `n` non-overlapping cells into `rect`, honoring `gap`
/// between cells where geometry allows.
///
/// The search tries every row count, scores feasible candidates by a
/// squareness penalty, and emits the winner's cells row-major. If the
/// requested gap makes every candidate infeasible the gap is halved and the
/// search retried, ending with a forced zero gap. The result is empty only
/// when `n == 0`, the rectangle has no area, or the rectangle cannot hold
/// `n` one-pixel cells even gapless; callers treat that as a fatal
/// shortfall.
pub fn pack_grid(rect: Rect, n: usize, gap: u32) -> Vec<Rect> {
    if n == 0 || rect.area() == 0 {
        return Vec::new();
    }

    let mut gap = gap;
    for _ in 0..4 {
        if let Some(cells) = try_pack(rect, n, gap) {
            return cells;
        }
        if gap == 0 {
            return Vec::new();
        }
        gap /= 2;
    }
    try_pack(rect, n, 0).unwrap_or_default()
}

/// Split `total` pixels into `parts` integer spans that sum exactly to
/// `total`; the first `total % parts` spans take the extra pixel.
pub fn distribute(total: u32, parts: usize) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts as u32;
    let extra = (total % parts as u32) as usize;
    (0..parts)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Items per row for an exact fill: `floor(n / rows)` with the first
/// `n % rows` rows taking one more.
fn row_counts(n: usize, rows: usize) -> impl Iterator<Item = usize> {
    let base = n / rows;
    let extra = n % rows;
    (0..rows).map(move |i| if i < extra { base + 1 } else { base })
}

fn try_pack(rect: Rect, n: usize, gap: u32) -> Option<Vec<Rect>> {
    let max_rows = n.min(rect.height as usize);
    let mut best: Option<(f64, usize)> = None;

    for rows in 1..=max_rows {
        if let Some(score) = score_candidate(rect, n, rows, gap) {
            // strict less-than keeps the first-found row count on ties
            if best.is_none_or(|(s, _)| score < s) {
                best = Some((score, rows));
            }
        }
    }

    let (_, rows) = best?;
    Some(emit_cells(rect, n, rows, gap))
}

/// Squareness penalty for a candidate row count, or `None` when any row
/// would drop below one pixel per cell after gaps.
fn score_candidate(rect: Rect, n: usize, rows: usize, gap: u32) -> Option<f64> {
    let avail_h = avail_span(rect.height, rows, gap)?;
    let cell_h = f64::from(avail_h) / rows as f64;

    let mut score = 0.0;
    for count in row_counts(n, rows) {
        let avail_w = avail_span(rect.width, count, gap)?;
        let cell_w = f64::from(avail_w) / count as f64;
        // penalty weighted by how many cells inherit this row's aspect
        score += (cell_w / cell_h).ln().abs() * count as f64;
    }
    Some(score)
}

/// Pixels left for `parts` cells after `parts - 1` gaps, requiring at least
/// one pixel per cell.
fn avail_span(extent: u32, parts: usize, gap: u32) -> Option<u32> {
    let gaps = (parts as u64 - 1) * u64::from(gap);
    let avail = u64::from(extent).checked_sub(gaps)?;
    if avail < parts as u64 {
        return None;
    }
    Some(avail as u32)
}

fn emit_cells(rect: Rect, n: usize, rows: usize, gap: u32) -> Vec<Rect> {
    let avail_h = rect.height - (rows as u32 - 1) * gap;
    let row_heights = distribute(avail_h, rows);

    let mut cells = Vec::with_capacity(n);
    let mut y = rect.y;
    for (count, row_h) in row_counts(n, rows).zip(row_heights) {
        let avail_w = rect.width - (count as u32 - 1) * gap;
        let mut x = rect.x;
        for width in distribute(avail_w, count) {
            cells.push(Rect::new(x, y, width, row_h));
            x += width + gap;
        }
        y += row_h + gap;
    }
    cells
}
