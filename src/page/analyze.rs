//! Per-page analysis
//!
//! Turns one rendered page into a [`PageRecord`], and runs that over a whole
//! document on a fixed worker pool. The record array is allocated up front
//! and split into disjoint contiguous chunks; each chunk owns its renderer and
//! writes only to its own slots, so no locking is involved.

use rayon::prelude::*;

use super::record::{BoxVariants, PageRecord};
use crate::detect::{BandDetector, ContentScanner, DEFAULT_GAP_TOLERANCE};
use crate::error::{CropError, Result};
use crate::geometry::{PageBox, Rect};
use crate::progress::{ProcessingStage, ProgressCallback};
use crate::raster::{reorient, PageRenderer, RasterProvider, RenderQuality, RenderedPage};

// ============================================================
// Constants
// ============================================================

/// Default render resolution (one pixel per point)
pub const DEFAULT_RESOLUTION_DPI: f64 = 72.0;

/// Band size used when header/footer cropping is switched on without a value
pub const DEFAULT_BAND_SIZE_PT: f64 = 30.0;

/// Lowest accepted render resolution
const MIN_RESOLUTION_DPI: f64 = 1.0;

/// Highest accepted render resolution
const MAX_RESOLUTION_DPI: f64 = 2400.0;

// ============================================================
// Options
// ============================================================

/// Per-page analysis options
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Render resolution in dots per inch
    pub resolution_dpi: f64,
    /// Render quality
    pub quality: RenderQuality,
    /// Maximum header band height in points (0 disables header detection)
    pub max_header_pt: f64,
    /// Maximum footer band height in points (0 disables footer detection)
    pub max_footer_pt: f64,
    /// Band gap tolerance in pixels
    pub gap_tolerance: u32,
    /// Worker count (`None` = one per CPU)
    pub threads: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            resolution_dpi: DEFAULT_RESOLUTION_DPI,
            quality: RenderQuality::Fast,
            max_header_pt: 0.0,
            max_footer_pt: 0.0,
            gap_tolerance: DEFAULT_GAP_TOLERANCE,
            threads: None,
        }
    }
}

impl AnalysisOptions {
    pub fn builder() -> AnalysisOptionsBuilder {
        AnalysisOptionsBuilder::default()
    }

    /// Whether header or footer detection is requested
    pub fn crops_bands(&self) -> bool {
        self.max_header_pt > 0.0 || self.max_footer_pt > 0.0
    }

    fn worker_count(&self, page_count: usize) -> usize {
        self.threads
            .unwrap_or_else(num_cpus::get)
            .clamp(1, page_count.max(1))
    }
}

/// Builder for AnalysisOptions
#[derive(Debug, Default)]
pub struct AnalysisOptionsBuilder {
    options: AnalysisOptions,
}

impl AnalysisOptionsBuilder {
    #[must_use]
    pub fn resolution_dpi(mut self, dpi: f64) -> Self {
        self.options.resolution_dpi = dpi.clamp(MIN_RESOLUTION_DPI, MAX_RESOLUTION_DPI);
        self
    }

    #[must_use]
    pub fn quality(mut self, quality: RenderQuality) -> Self {
        self.options.quality = quality;
        self
    }

    #[must_use]
    pub fn max_header_pt(mut self, points: f64) -> Self {
        self.options.max_header_pt = points.max(0.0);
        self
    }

    #[must_use]
    pub fn max_footer_pt(mut self, points: f64) -> Self {
        self.options.max_footer_pt = points.max(0.0);
        self
    }

    #[must_use]
    pub fn gap_tolerance(mut self, pixels: u32) -> Self {
        self.options.gap_tolerance = pixels;
        self
    }

    #[must_use]
    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.options.threads = threads;
        self
    }

    #[must_use]
    pub fn build(self) -> AnalysisOptions {
        self.options
    }
}

// ============================================================
// Page Analyzer
// ============================================================

/// Points to whole pixels at the given scale
fn points_to_pixels(points: f64, scale: f64) -> u32 {
    if points <= 0.0 || scale <= 0.0 {
        return 0;
    }
    (points / scale).floor() as u32
}

/// Build the record of one rendered page.
pub fn analyze_page(page_index: usize, page: RenderedPage, options: &AnalysisOptions) -> PageRecord {
    let RenderedPage {
        grid,
        page_width_pt,
        page_height_pt,
        orientation,
    } = page;
    let grid = reorient(grid, orientation);

    let scanner = ContentScanner::new(&grid);
    let bounds = scanner.full_bounds();
    if bounds.is_empty() {
        tracing::debug!("page {}: no content, keeping full extent", page_index + 1);
        return PageRecord::blank(page_index, page_width_pt, page_height_pt);
    }

    let to_page = |rect: &Rect| {
        PageBox::from_pixel_rect(rect, grid.width(), grid.height(), page_width_pt, page_height_pt)
    };
    let full = to_page(&bounds);
    if !options.crops_bands() {
        return PageRecord::analyzed(page_index, BoxVariants::uniform(full), 0.0, 0.0);
    }

    let scale_y = page_height_pt / f64::from(grid.height());
    let detector = BandDetector::new(scanner).gap_tolerance(options.gap_tolerance);
    let header_px = detector.detect_header(bounds, points_to_pixels(options.max_header_pt, scale_y));
    let footer_px = detector.detect_footer(bounds, points_to_pixels(options.max_footer_pt, scale_y));

    // Each variant is a fresh scan of the indented bounds
    let rescan = |header: u32, footer: u32| {
        if header == 0 && footer == 0 {
            return full;
        }
        let found = scanner.find_bounds(bounds.indent_top(header).indent_bottom(footer));
        if found.is_empty() {
            full
        } else {
            to_page(&found)
        }
    };
    let variants = BoxVariants {
        full,
        no_header: rescan(header_px, 0),
        no_footer: rescan(0, footer_px),
        no_header_footer: rescan(header_px, footer_px),
    };

    tracing::trace!(
        "page {}: bounds {:?}, header {} px, footer {} px",
        page_index + 1,
        bounds,
        header_px,
        footer_px
    );

    PageRecord::analyzed(
        page_index,
        variants,
        f64::from(header_px) * scale_y,
        f64::from(footer_px) * scale_y,
    )
}

/// Render and analyze every page of a document in parallel.
///
/// Returns one record per page in page order. Pages whose rendering fails get
/// a failed record; the other pages are unaffected.
pub fn analyze_document<P: RasterProvider>(
    provider: &P,
    options: &AnalysisOptions,
    progress: &dyn ProgressCallback,
) -> Result<Vec<PageRecord>> {
    let page_count = provider.page_count();
    progress.on_stage_start(ProcessingStage::Analyzing, page_count);
    if page_count == 0 {
        return Ok(Vec::new());
    }

    let workers = options.worker_count(page_count);
    let chunk_len = page_count.div_ceil(workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| CropError::ThreadPool(e.to_string()))?;

    tracing::info!(
        "analyzing {} pages at {} dpi on {} workers",
        page_count,
        options.resolution_dpi,
        workers
    );

    let mut records: Vec<PageRecord> = (0..page_count)
        .map(|index| PageRecord::failed(index, "page was not analyzed"))
        .collect();

    pool.install(|| {
        records
            .par_chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(chunk, slots)| {
                let first = chunk * chunk_len;
                analyze_chunk(provider, options, progress, first, slots);
            });
    });

    let failed = records.iter().filter(|r| r.is_failed()).count();
    progress.on_stage_complete(
        ProcessingStage::Analyzing,
        &format!("{} pages, {} failed", page_count, failed),
    );

    Ok(records)
}

fn analyze_chunk<P: RasterProvider>(
    provider: &P,
    options: &AnalysisOptions,
    progress: &dyn ProgressCallback,
    first: usize,
    slots: &mut [PageRecord],
) {
    let mut renderer = match provider.renderer() {
        Ok(renderer) => renderer,
        Err(e) => {
            tracing::warn!(
                "pages {}-{}: cannot create renderer: {}",
                first + 1,
                first + slots.len(),
                e
            );
            for (offset, slot) in slots.iter_mut().enumerate() {
                *slot = PageRecord::failed(first + offset, e.to_string());
                progress.on_page_complete(first + offset);
            }
            return;
        }
    };

    for (offset, slot) in slots.iter_mut().enumerate() {
        let index = first + offset;
        // A renderer that panics on one page must not take the whole pool down
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            renderer
                .render(index, options.resolution_dpi, options.quality)
                .map(|page| analyze_page(index, page, options))
        }));
        *slot = match outcome {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                tracing::warn!("page {}: {}", index + 1, e);
                PageRecord::failed(index, e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!("page {}: renderer panicked: {}", index + 1, message);
                PageRecord::failed(index, format!("renderer panicked: {}", message))
            }
        };
        progress.on_page_complete(index);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
