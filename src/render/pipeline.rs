//! Render driver: walks the image list, decoding and drawing each item into
//! its assigned cell, with phased progress and cooperative cancellation.

use rand::Rng;
use rand::seq::SliceRandom;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::decode::ImageDecoder;
use super::surface::{DrawSurface, cover_crop};
use super::{CollageImageItem, CollageProgress, ProgressSink, RenderPhase};
use crate::error::CollageError;
use crate::layout::{
    CollageLayoutOptions, MIN_CANVAS_SIZE, Rect, compute_collage_layout, compute_flat_layout,
};

/// How often the pipeline yields back to the scheduler, in images.
const YIELD_EVERY: usize = 4;

/// One render invocation. `main_id == None` selects flat mode: every image
/// goes into a single full-canvas grid.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub items: &'a [CollageImageItem],
    pub main_id: Option<&'a str>,
    pub size: u32,
    pub main_ratio: f64,
    pub gap: u32,
    pub shuffle_others: bool,
    pub background: [u8; 4],
}

/// Decode and composite every image into its cell.
///
/// Single-threaded cooperative execution: the cancellation token is polled
/// at the top of every per-image iteration (and once before the main-image
/// draw), and the task yields every [`YIELD_EVERY`] images so large batches
/// stay responsive. A decode failure aborts the whole pass; nothing is
/// skipped or retried. On failure the surface content is invalid and must
/// be discarded by the caller.
pub async fn render_collage<D, S, R, P>(
    request: &RenderRequest<'_>,
    decoder: &D,
    surface: &mut S,
    rng: &mut R,
    progress: &mut P,
    cancel: &CancellationToken,
) -> Result<(), CollageError>
where
    D: ImageDecoder,
    S: DrawSurface,
    R: Rng + ?Sized,
    P: ProgressSink + ?Sized,
{
    if request.items.is_empty() {
        return Err(CollageError::EmptyInput);
    }

    let main = match request.main_id {
        Some(id) => Some(
            request
                .items
                .iter()
                .find(|item| item.id == id)
                .ok_or_else(|| CollageError::UnknownMainImage(id.to_string()))?,
        ),
        None => None,
    };

    let mut others: Vec<&CollageImageItem> = match main {
        Some(main) => request
            .items
            .iter()
            .filter(|item| item.id != main.id)
            .collect(),
        None => request.items.iter().collect(),
    };
    if request.shuffle_others {
        others.shuffle(rng);
    }

    let size = request.size.max(MIN_CANVAS_SIZE);
    let total = request.items.len();

    surface.prepare(size, size)?;
    surface.fill_rect(Rect::new(0, 0, size, size), request.background);

    progress.report(CollageProgress {
        phase: RenderPhase::Layout,
        done: 0,
        total,
        message: Some("computing layout".into()),
    });

    // Ring cells (or flat cells) paired one-to-one with the others list.
    let (cells, main_rect) = match main {
        Some(_) => {
            let layout = compute_collage_layout(&CollageLayoutOptions {
                size,
                main_ratio: request.main_ratio,
                gap: request.gap,
                others_count: others.len(),
            })?;
            (layout.ring_cells, Some(layout.main_rect))
        }
        None => (compute_flat_layout(size, request.gap, others.len())?, None),
    };
    debug!(cells = cells.len(), main = main.is_some(), "layout ready");

    let mut done = 0usize;
    for (item, cell) in others.iter().zip(&cells) {
        if cancel.is_cancelled() {
            return Err(CollageError::Canceled);
        }
        draw_item(item, *cell, decoder, surface, progress, done, total)?;
        done += 1;
        if done % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }
    }

    if let (Some(main), Some(main_rect)) = (main, main_rect) {
        if cancel.is_cancelled() {
            return Err(CollageError::Canceled);
        }
        draw_item(main, main_rect, decoder, surface, progress, done, total)?;
        done += 1;
    }

    progress.report(CollageProgress {
        phase: RenderPhase::Render,
        done,
        total,
        message: None,
    });
    Ok(())
}

fn draw_item<D, S, P>(
    item: &CollageImageItem,
    cell: Rect,
    decoder: &D,
    surface: &mut S,
    progress: &mut P,
    done: usize,
    total: usize,
) -> Result<(), CollageError>
where
    D: ImageDecoder,
    S: DrawSurface,
    P: ProgressSink + ?Sized,
{
    progress.report(CollageProgress {
        phase: RenderPhase::Decode,
        done,
        total,
        message: Some(item.id.clone()),
    });
    let decoded = decoder.decode(item)?;

    progress.report(CollageProgress {
        phase: RenderPhase::Render,
        done,
        total,
        message: Some(item.id.clone()),
    });
    let crop = cover_crop(decoded.width(), decoded.height(), cell.width, cell.height);
    surface.draw_image(&decoded, crop, cell)
    // `decoded` drops here, releasing the pixel buffer on both paths.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::decode::DecodedImage;
    use image::RgbaImage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Decoder producing a solid image whose width encodes the item index,
    /// so draw records can be traced back to items.
    struct IndexDecoder;

    impl ImageDecoder for IndexDecoder {
        fn decode(&self, item: &CollageImageItem) -> Result<DecodedImage, CollageError> {
            let index: u32 = item.id.trim_start_matches("img-").parse().unwrap();
            Ok(DecodedImage::new(RgbaImage::new(10 + index, 10 + index)))
        }
    }

    struct FailingDecoder {
        fail_id: &'static str,
    }

    impl ImageDecoder for FailingDecoder {
        fn decode(&self, item: &CollageImageItem) -> Result<DecodedImage, CollageError> {
            if item.id == self.fail_id {
                return Err(CollageError::Decode {
                    id: item.id.clone(),
                    cause: anyhow::anyhow!("synthetic failure"),
                });
            }
            Ok(DecodedImage::new(RgbaImage::new(10, 10)))
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        fills: usize,
        draws: Vec<(u32, Rect)>,
    }

    impl DrawSurface for RecordingSurface {
        fn prepare(&mut self, _width: u32, _height: u32) -> Result<(), CollageError> {
            Ok(())
        }

        fn fill_rect(&mut self, _rect: Rect, _color: [u8; 4]) {
            self.fills += 1;
        }

        fn draw_image(
            &mut self,
            src: &DecodedImage,
            _src_rect: Rect,
            dest: Rect,
        ) -> Result<(), CollageError> {
            self.draws.push((src.width(), dest));
            Ok(())
        }
    }

    fn items(n: usize) -> Vec<CollageImageItem> {
        (0..n)
            .map(|i| CollageImageItem {
                id: format!("img-{i}"),
                data: Vec::new(),
            })
            .collect()
    }

    fn request<'a>(items: &'a [CollageImageItem], main_id: Option<&'a str>) -> RenderRequest<'a> {
        RenderRequest {
            items,
            main_id,
            size: 400,
            main_ratio: 0.5,
            gap: 4,
            shuffle_others: false,
            background: [0, 0, 0, 255],
        }
    }

    #[tokio::test]
    async fn main_image_draws_last_others_keep_order() {
        let items = items(5);
        let req = request(&items, Some("img-2"));
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        render_collage(
            &req,
            &IndexDecoder,
            &mut surface,
            &mut rng,
            &mut crate::render::NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(surface.draws.len(), 5);
        // ring draws preserve relative order with the main item removed
        let ring_widths: Vec<u32> = surface.draws[..4].iter().map(|(w, _)| *w).collect();
        assert_eq!(ring_widths, vec![10, 11, 13, 14]);
        // main item (index 2 -> width 12) lands in the centered main rect
        let (main_width, main_rect) = surface.draws[4];
        assert_eq!(main_width, 12);
        assert_eq!(main_rect, Rect::new(100, 100, 200, 200));
    }

    #[tokio::test]
    async fn flat_mode_draws_every_item() {
        let items = items(6);
        let req = request(&items, None);
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        render_collage(
            &req,
            &IndexDecoder,
            &mut surface,
            &mut rng,
            &mut crate::render::NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(surface.draws.len(), 6);
    }

    #[tokio::test]
    async fn pre_canceled_token_stops_before_any_draw() {
        let items = items(3);
        let req = request(&items, Some("img-0"));
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = render_collage(
            &req,
            &IndexDecoder,
            &mut surface,
            &mut rng,
            &mut crate::render::NoopProgress,
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(err.is_canceled());
        assert_eq!(surface.fills, 1, "only the background fill ran");
        assert!(surface.draws.is_empty());
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let items: Vec<CollageImageItem> = Vec::new();
        let req = request(&items, None);
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        let err = render_collage(
            &req,
            &IndexDecoder,
            &mut surface,
            &mut rng,
            &mut crate::render::NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CollageError::EmptyInput));
    }

    #[tokio::test]
    async fn unknown_main_id_is_rejected_before_drawing() {
        let items = items(3);
        let req = request(&items, Some("nope"));
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        let err = render_collage(
            &req,
            &IndexDecoder,
            &mut surface,
            &mut rng,
            &mut crate::render::NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CollageError::UnknownMainImage(_)));
        assert!(surface.draws.is_empty());
    }

    #[tokio::test]
    async fn decode_failure_aborts_the_whole_pass() {
        let items = items(5);
        let req = request(&items, None);
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        let decoder = FailingDecoder { fail_id: "img-2" };
        let err = render_collage(
            &req,
            &decoder,
            &mut surface,
            &mut rng,
            &mut crate::render::NoopProgress,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CollageError::Decode { .. }));
        assert_eq!(surface.draws.len(), 2, "items after the failure are skipped");
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_ends_complete() {
        let items = items(4);
        let req = request(&items, Some("img-0"));
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut events: Vec<CollageProgress> = Vec::new();
        let mut sink = |p: CollageProgress| events.push(p);

        render_collage(
            &req,
            &IndexDecoder,
            &mut surface,
            &mut rng,
            &mut sink,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        drop(sink);

        assert_eq!(events[0].phase, RenderPhase::Layout);
        let last = events.last().unwrap();
        assert_eq!(last.phase, RenderPhase::Render);
        assert_eq!((last.done, last.total), (4, 4));
        for pair in events.windows(2) {
            assert!(pair[1].done >= pair[0].done, "done went backwards");
            assert_eq!(pair[1].total, pair[0].total, "total changed mid-pass");
        }
        // decode + render per image, plus layout and the final checkpoint
        assert_eq!(events.len(), 2 + 2 * 4);
    }

    #[tokio::test]
    async fn seeded_shuffle_is_reproducible() {
        let items = items(8);
        let mut req = request(&items, Some("img-3"));
        req.shuffle_others = true;

        let mut order_a = Vec::new();
        let mut order_b = Vec::new();
        for order in [&mut order_a, &mut order_b] {
            let mut surface = RecordingSurface::default();
            let mut rng = StdRng::seed_from_u64(42);
            render_collage(
                &req,
                &IndexDecoder,
                &mut surface,
                &mut rng,
                &mut crate::render::NoopProgress,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
            *order = surface.draws.iter().map(|(w, _)| *w).collect();
        }
        assert_eq!(order_a, order_b);
    }
}
