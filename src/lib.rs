//! pdf-autocrop - Automatic margin cropping for PDF documents
//!
//! Computes a crop box for every page of a PDF by looking only at rendered
//! images of its pages:
//!
//! 1. Each page is rendered to grayscale and scanned for the tight rectangle
//!    of non-background pixels ([`detect`], [`page`]).
//! 2. Optionally, recurring header and footer bands are detected by probing
//!    ever deeper indents from the page edges.
//! 3. Boxes are made consistent across the document, separately for even and
//!    odd pages ([`normalize`]).
//! 4. Margins are added ([`margins`]) and the boxes are written back into the
//!    page dictionaries ([`output`]).
//!
//! # Example
//!
//! ```no_run
//! use pdf_autocrop::{CropConfig, CropPipeline, NoProgress};
//! use std::path::Path;
//!
//! let config = CropConfig {
//!     crop_header_pt: 30.0,
//!     crop_outlier: true,
//!     ..CropConfig::default()
//! };
//! let report = CropPipeline::new(config)
//!     .process(Path::new("book.pdf"), Path::new("book-cropped.pdf"), &NoProgress)?;
//! println!("{} pages cropped", report.written_pages);
//! # Ok::<(), pdf_autocrop::CropError>(())
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod margins;
pub mod normalize;
pub mod output;
pub mod page;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod raster;

// CLI
pub use cli::Cli;

// Config
pub use config::{CliOverrides, ConfigError, CropConfig};

// Detection
pub use detect::{estimate_background, BandDetector, BandEdge, ContentScanner};

// Errors
pub use error::CropError;

// Geometry
pub use geometry::{PageBox, Rect};

// Margins
pub use margins::{apply_margins, Margins};

// Normalization
pub use normalize::{
    CommonExtent, GroupNormalizer, GroupSummary, NormalizeOptions, NormalizedGroups, Statistics,
};

// Output
pub use output::{GeometryWriter, OutputError, PdfBoxWriter};

// Page analysis
pub use page::{
    analyze_document, analyze_page, AnalysisOptions, BoxVariant, BoxVariants, PageOutcome,
    PageRecord, Parity,
};

// Pipeline
pub use pipeline::{default_output_path, CropPipeline, CropReport};

// Progress
pub use progress::{NoProgress, OutputMode, ProcessingStage, ProgressCallback, ProgressTracker};

// Rasterization
pub use raster::{
    reorient, Orientation, PageRenderer, PixelGrid, PopplerRasterProvider, RasterError,
    RasterProvider, RenderQuality, RenderedPage,
};

/// Process exit codes
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Invalid command-line arguments
    pub const INVALID_ARGS: i32 = 2;
    /// Input file not found
    pub const INPUT_NOT_FOUND: i32 = 3;
    /// Input file could not be loaded as a PDF
    pub const LOAD_FAILED: i32 = 4;
}
