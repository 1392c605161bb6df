//! Header and footer band detection
//!
//! A plain "first content row" scan stops at whatever comes first, header or
//! body. Instead the detector probes growing indents from the top (or bottom)
//! of the content bounds and rescans: when the rescan's edge lands further in
//! than the probe, the probe sat in a blank gap and everything above it is a
//! header candidate. The probe then jumps past the gap and keeps going, so
//! headers made of several lines separated by small gaps merge into one band.

use super::scan::ContentScanner;
use super::DEFAULT_GAP_TOLERANCE;
use crate::geometry::Rect;

/// Which side of the content bounds a band is searched on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandEdge {
    Top,
    Bottom,
}

impl BandEdge {
    fn indent(self, bounds: &Rect, rows: u32) -> Rect {
        match self {
            BandEdge::Top => bounds.indent_top(rows),
            BandEdge::Bottom => bounds.indent_bottom(rows),
        }
    }

    /// Rows between the outer edge of `bounds` and the matching edge of `found`
    fn skipped(self, bounds: &Rect, found: &Rect) -> u32 {
        match self {
            BandEdge::Top => found.top - bounds.top,
            BandEdge::Bottom => bounds.bottom() - found.bottom(),
        }
    }
}

/// Header/footer detector for one page
#[derive(Debug, Clone, Copy)]
pub struct BandDetector<'a> {
    scanner: ContentScanner<'a>,
    gap_tolerance: u32,
}

impl<'a> BandDetector<'a> {
    pub fn new(scanner: ContentScanner<'a>) -> Self {
        Self {
            scanner,
            gap_tolerance: DEFAULT_GAP_TOLERANCE,
        }
    }

    #[must_use]
    pub fn gap_tolerance(mut self, pixels: u32) -> Self {
        self.gap_tolerance = pixels;
        self
    }

    /// Header band height in pixels (0 if none), at most `max_px`
    pub fn detect_header(&self, bounds: Rect, max_px: u32) -> u32 {
        self.detect(bounds, max_px, BandEdge::Top)
    }

    /// Footer band height in pixels (0 if none), at most `max_px`
    pub fn detect_footer(&self, bounds: Rect, max_px: u32) -> u32 {
        self.detect(bounds, max_px, BandEdge::Bottom)
    }

    pub fn detect(&self, bounds: Rect, max_px: u32, edge: BandEdge) -> u32 {
        let mut best = 0;
        let mut size = 1;

        while size <= max_px && size < bounds.height {
            let found = self.scanner.find_bounds(edge.indent(&bounds, size));
            if found.is_empty() {
                // Nothing left beyond the probe: no body to separate from
                break;
            }

            let skipped = edge.skipped(&bounds, &found);
            if skipped > size {
                best = size;
                size = skipped + 1;
                continue;
            }

            if best > 0 && size > best + self.gap_tolerance {
                break;
            }
            size += 1;
        }

        best
    }
}
