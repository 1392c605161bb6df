//! Content detection module
//!
//! Locates page content in a rendered grid.
//!
//! # Features
//!
//! - Background estimation from the corner pixels
//! - Tight content bounds within any sub-region ([`ContentScanner`])
//! - Header/footer band detection by indentation probing ([`BandDetector`])
//!
//! # Example
//!
//! ```rust
//! use pdf_autocrop::{BandDetector, ContentScanner, PixelGrid, Rect};
//!
//! let mut grid = PixelGrid::filled(100, 200, 255);
//! grid.fill_rect(Rect::new(10, 10, 80, 8), 0); // header
//! grid.fill_rect(Rect::new(10, 40, 80, 150), 0); // body
//!
//! let scanner = ContentScanner::new(&grid);
//! let bounds = scanner.full_bounds();
//! let header = BandDetector::new(scanner).detect_header(bounds, 30);
//!
//! assert_eq!(bounds, Rect::new(10, 10, 80, 180));
//! assert_eq!(header, 8);
//! ```

// Submodules
pub mod band;
pub mod scan;

// Re-export public API
pub use band::{BandDetector, BandEdge};
pub use scan::{estimate_background, ContentScanner};

// ============================================================
// Constants
// ============================================================

/// Largest blank run (pixels) past the last header candidate that still lets
/// the band grow
pub const DEFAULT_GAP_TOLERANCE: u32 = 5;
