//! Content bounds scanning
//!
//! Finds the minimal rectangle enclosing every pixel that differs from the
//! page background, within an arbitrary region of a [`PixelGrid`].

use crate::geometry::Rect;
use crate::raster::PixelGrid;

/// Background intensity guess: the lightest of the four corner pixels, so a
/// single dark corner (binding shadow, scanner artifact) does not win.
pub fn estimate_background(grid: &PixelGrid) -> u8 {
    if grid.width() == 0 || grid.height() == 0 {
        return u8::MAX;
    }
    let x1 = grid.width() - 1;
    let y1 = grid.height() - 1;
    [
        grid.get(0, 0),
        grid.get(x1, 0),
        grid.get(0, y1),
        grid.get(x1, y1),
    ]
    .into_iter()
    .max()
    .unwrap_or(u8::MAX)
}

/// Content scanner bound to one page's grid and background color
#[derive(Debug, Clone, Copy)]
pub struct ContentScanner<'a> {
    grid: &'a PixelGrid,
    background: u8,
}

impl<'a> ContentScanner<'a> {
    /// Scanner using the background estimated from the full grid
    pub fn new(grid: &'a PixelGrid) -> Self {
        Self::with_background(grid, estimate_background(grid))
    }

    pub fn with_background(grid: &'a PixelGrid, background: u8) -> Self {
        Self { grid, background }
    }

    pub fn background(&self) -> u8 {
        self.background
    }

    pub fn grid(&self) -> &'a PixelGrid {
        self.grid
    }

    /// Whole-grid rectangle
    pub fn grid_rect(&self) -> Rect {
        Rect::new(0, 0, self.grid.width(), self.grid.height())
    }

    /// Content bounds of the whole grid
    pub fn full_bounds(&self) -> Rect {
        self.find_bounds(self.grid_rect())
    }

    /// Minimal rectangle enclosing non-background pixels inside `region`.
    ///
    /// Rows are trimmed first (top, then bottom); columns are then trimmed
    /// within the remaining rows only. A region without content yields an
    /// empty rectangle anchored at the region's top-left corner.
    pub fn find_bounds(&self, region: Rect) -> Rect {
        let region = region.clip_to(self.grid.width(), self.grid.height());
        if region.is_empty() {
            return Rect::empty_at(region.left, region.top);
        }
        let (x0, x1) = (region.left, region.right());

        let mut top = region.top;
        let mut bottom = region.bottom();
        while top < bottom && self.row_is_background(top, x0, x1) {
            top += 1;
        }
        if top == bottom {
            return Rect::empty_at(region.left, region.top);
        }
        // Row `top` has content, so this stops at `top + 1` at the latest
        while bottom > top + 1 && self.row_is_background(bottom - 1, x0, x1) {
            bottom -= 1;
        }

        let mut left = x0;
        let mut right = x1;
        while left < right && self.column_is_background(left, top, bottom) {
            left += 1;
        }
        while right > left + 1 && self.column_is_background(right - 1, top, bottom) {
            right -= 1;
        }

        Rect::new(left, top, right - left, bottom - top)
    }

    #[inline]
    fn row_is_background(&self, y: u32, x0: u32, x1: u32) -> bool {
        self.grid.row(y)[x0 as usize..x1 as usize]
            .iter()
            .all(|&p| p == self.background)
    }

    #[inline]
    fn column_is_background(&self, x: u32, y0: u32, y1: u32) -> bool {
        (y0..y1).all(|y| self.grid.get(x, y) == self.background)
    }
}
