//! Page rasterization
//!
//! The crop engine never looks inside a PDF. It only sees an 8-bit grayscale
//! [`PixelGrid`] per page plus the page size in points, obtained through the
//! [`RasterProvider`] / [`PageRenderer`] traits.
//!
//! # Features
//!
//! - Strided single-channel pixel grids
//! - Pure reorientation of rotated or inverted renderings
//! - Poppler (`pdftoppm`) backed provider in [`poppler`]

use image::GrayImage;
use std::path::PathBuf;
use thiserror::Error;

pub mod poppler;

pub use poppler::{PopplerRasterProvider, PopplerRenderer};

// ============================================================
// Error Types
// ============================================================

/// Rasterization error types
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Failed to load document {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid pixel grid: {0}")]
    InvalidGrid(String),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RasterError>;

// ============================================================
// Pixel Grid
// ============================================================

/// Single-channel 8-bit intensity raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    stride: usize,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Wrap raw samples laid out row by row, `stride` bytes apart
    pub fn new(width: u32, height: u32, stride: usize, samples: Vec<u8>) -> Result<Self> {
        if stride < width as usize {
            return Err(RasterError::InvalidGrid(format!(
                "stride {} smaller than width {}",
                stride, width
            )));
        }
        let required = stride * height as usize;
        if samples.len() < required {
            return Err(RasterError::InvalidGrid(format!(
                "{} samples for {} rows of stride {}",
                samples.len(),
                height,
                stride
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            samples,
        })
    }

    /// Grid of uniform intensity
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            stride: width as usize,
            samples: vec![value; width as usize * height as usize],
        }
    }

    pub fn from_gray_image(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            stride: width as usize,
            samples: image.into_raw(),
        }
    }

    pub fn to_gray_image(&self) -> GrayImage {
        let mut packed = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            packed.extend_from_slice(self.row(y));
        }
        // Dimensions match the packed buffer by construction
        GrayImage::from_raw(self.width, self.height, packed)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Intensity at `(x, y)`
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.samples[y as usize * self.stride + x as usize]
    }

    /// Visible samples of row `y` (stride padding excluded)
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.samples[start..start + self.width as usize]
    }

    /// Paint a rectangle, clipped to the grid
    pub fn fill_rect(&mut self, rect: crate::Rect, value: u8) {
        let rect = rect.clip_to(self.width, self.height);
        for y in rect.top..rect.bottom() {
            let start = y as usize * self.stride;
            self.samples[start + rect.left as usize..start + rect.right() as usize].fill(value);
        }
    }
}

// ============================================================
// Orientation
// ============================================================

/// How a rendered grid is turned relative to the unrotated page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    /// Page shown a quarter turn clockwise (`/Rotate 90`)
    Rotated90,
    /// Page shown a quarter turn counter-clockwise (`/Rotate 270`)
    Rotated270,
    /// Page shown upside down (`/Rotate 180`)
    Inverted,
}

impl Orientation {
    /// Orientation for a PDF `/Rotate` value in degrees
    pub fn from_rotation(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Orientation::Rotated90,
            180 => Orientation::Inverted,
            270 => Orientation::Rotated270,
            _ => Orientation::Normal,
        }
    }
}

/// Undo the rotation of a rendering so that pixel rows and columns align with
/// the unrotated page geometry.
pub fn reorient(grid: PixelGrid, orientation: Orientation) -> PixelGrid {
    let rotated = match orientation {
        Orientation::Normal => return grid,
        Orientation::Rotated90 => image::imageops::rotate270(&grid.to_gray_image()),
        Orientation::Rotated270 => image::imageops::rotate90(&grid.to_gray_image()),
        Orientation::Inverted => image::imageops::rotate180(&grid.to_gray_image()),
    };
    PixelGrid::from_gray_image(rotated)
}

// ============================================================
// Provider Contract
// ============================================================

/// Rendering quality requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderQuality {
    #[default]
    Fast,
    High,
}

/// One rendered page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub grid: PixelGrid,
    /// Unrotated page width in points
    pub page_width_pt: f64,
    /// Unrotated page height in points
    pub page_height_pt: f64,
    pub orientation: Orientation,
}

/// Renders pages of one open document; each worker owns one
pub trait PageRenderer {
    fn render(
        &mut self,
        page_index: usize,
        resolution_dpi: f64,
        quality: RenderQuality,
    ) -> Result<RenderedPage>;
}

/// An open document that hands out renderers
pub trait RasterProvider: Sync {
    type Renderer: PageRenderer;

    fn page_count(&self) -> usize;

    fn renderer(&self) -> Result<Self::Renderer>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;

    fn marked_grid() -> PixelGrid {
        // 4x2 grid, single dark pixel at the top-left corner
        let mut grid = PixelGrid::filled(4, 2, 255);
        grid.fill_rect(Rect::new(0, 0, 1, 1), 0);
        grid
    }

    #[test]
    fn test_grid_rejects_short_stride() {
        let result = PixelGrid::new(10, 2, 8, vec![0; 20]);
        assert!(matches!(result, Err(RasterError::InvalidGrid(_))));
    }

    #[test]
    fn test_grid_rejects_short_buffer() {
        let result = PixelGrid::new(10, 2, 12, vec![0; 20]);
        assert!(matches!(result, Err(RasterError::InvalidGrid(_))));
    }

    #[test]
    fn test_grid_stride_padding() {
        // 3 visible columns, 1 padding byte per row
        let samples = vec![1, 2, 3, 99, 4, 5, 6, 99];
        let grid = PixelGrid::new(3, 2, 4, samples).unwrap();
        assert_eq!(grid.row(1), &[4, 5, 6]);
        assert_eq!(grid.get(2, 0), 3);

        let image = grid.to_gray_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 1).0[0], 4);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut grid = PixelGrid::filled(4, 4, 255);
        grid.fill_rect(Rect::new(2, 2, 10, 10), 0);
        assert_eq!(grid.get(3, 3), 0);
        assert_eq!(grid.get(1, 1), 255);
    }

    #[test]
    fn test_orientation_from_rotation() {
        assert_eq!(Orientation::from_rotation(0), Orientation::Normal);
        assert_eq!(Orientation::from_rotation(90), Orientation::Rotated90);
        assert_eq!(Orientation::from_rotation(-90), Orientation::Rotated270);
        assert_eq!(Orientation::from_rotation(540), Orientation::Inverted);
        assert_eq!(Orientation::from_rotation(45), Orientation::Normal);
    }

    #[test]
    fn test_reorient_normal_is_identity() {
        let grid = marked_grid();
        assert_eq!(reorient(grid.clone(), Orientation::Normal), grid);
    }

    #[test]
    fn test_reorient_rotated90() {
        // Page rotated clockwise: its top-left corner shows up top-right
        let mut shown = PixelGrid::filled(2, 4, 255);
        shown.fill_rect(Rect::new(1, 0, 1, 1), 0);

        let page = reorient(shown, Orientation::Rotated90);
        assert_eq!((page.width(), page.height()), (4, 2));
        assert_eq!(page.get(0, 0), 0);
    }

    #[test]
    fn test_reorient_rotated270() {
        // Page rotated counter-clockwise: its top-left corner shows up bottom-left
        let mut shown = PixelGrid::filled(2, 4, 255);
        shown.fill_rect(Rect::new(0, 3, 1, 1), 0);

        let page = reorient(shown, Orientation::Rotated270);
        assert_eq!((page.width(), page.height()), (4, 2));
        assert_eq!(page.get(0, 0), 0);
    }

    #[test]
    fn test_reorient_inverted() {
        let mut shown = PixelGrid::filled(4, 2, 255);
        shown.fill_rect(Rect::new(3, 1, 1, 1), 0);

        let page = reorient(shown, Orientation::Inverted);
        assert_eq!(page, marked_grid());
    }
}
