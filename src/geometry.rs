//! Pixel rectangles and page-space boxes
//!
//! Two coordinate systems meet in this crate:
//!
//! - [`Rect`] lives in raster space: integer pixels, origin at the top-left
//!   corner of the grid, rows growing downwards.
//! - [`PageBox`] lives in page space: points (1/72 inch), origin at the
//!   lower-left corner of the page, `y` growing upwards.

use serde::{Deserialize, Serialize};

// ============================================================
// Rect (pixel space)
// ============================================================

/// Rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Zero-area rectangle anchored at `(left, top)`
    pub fn empty_at(left: u32, top: u32) -> Self {
        Self::new(left, top, 0, 0)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Same rectangle with `rows` removed from the top
    #[must_use]
    pub fn indent_top(&self, rows: u32) -> Self {
        let rows = rows.min(self.height);
        Self::new(self.left, self.top + rows, self.width, self.height - rows)
    }

    /// Same rectangle with `rows` removed from the bottom
    #[must_use]
    pub fn indent_bottom(&self, rows: u32) -> Self {
        let rows = rows.min(self.height);
        Self::new(self.left, self.top, self.width, self.height - rows)
    }

    /// Intersection with a `width` x `height` grid
    #[must_use]
    pub fn clip_to(&self, width: u32, height: u32) -> Self {
        let left = self.left.min(width);
        let top = self.top.min(height);
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        Self::new(left, top, right - left, bottom - top)
    }
}

// ============================================================
// PageBox (page space)
// ============================================================

/// Box in page space, lower-left origin, measured in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Box covering a whole page of the given size
    pub fn full_page(width_pt: f64, height_pt: f64) -> Self {
        Self::new(0.0, 0.0, width_pt, height_pt)
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// Whether the box encloses a positive area
    pub fn is_valid(&self) -> bool {
        self.urx > self.llx && self.ury > self.lly
    }

    /// Move every edge outwards by the given amounts
    #[must_use]
    pub fn expand(&self, left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self::new(
            self.llx - left,
            self.lly - bottom,
            self.urx + right,
            self.ury + top,
        )
    }

    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.llx + dx, self.lly + dy, self.urx + dx, self.ury + dy)
    }

    /// Overlap of two boxes, `None` when they do not overlap
    pub fn intersect(&self, other: &PageBox) -> Option<PageBox> {
        let result = Self::new(
            self.llx.max(other.llx),
            self.lly.max(other.lly),
            self.urx.min(other.urx),
            self.ury.min(other.ury),
        );
        result.is_valid().then_some(result)
    }

    /// Convert a pixel rectangle of a `grid_width` x `grid_height` raster to
    /// page space, flipping the vertical axis.
    pub fn from_pixel_rect(
        rect: &Rect,
        grid_width: u32,
        grid_height: u32,
        page_width_pt: f64,
        page_height_pt: f64,
    ) -> Self {
        let scale_x = page_width_pt / f64::from(grid_width.max(1));
        let scale_y = page_height_pt / f64::from(grid_height.max(1));
        Self::new(
            f64::from(rect.left) * scale_x,
            page_height_pt - f64::from(rect.bottom()) * scale_y,
            f64::from(rect.right()) * scale_x,
            page_height_pt - f64::from(rect.top) * scale_y,
        )
    }
}

impl From<[f64; 4]> for PageBox {
    fn from(v: [f64; 4]) -> Self {
        // PDF rectangles may list any two opposite corners
        Self::new(v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3]))
    }
}
