//! Statistical normalization module
//!
//! Makes page boxes consistent across a document. Facing pages of a book are
//! laid out as mirror images, so even and odd page indices are normalized as
//! two independent groups.
//!
//! # Example
//!
//! ```
//! use pdf_autocrop::{BoxVariants, GroupNormalizer, NormalizeOptions, PageBox, PageRecord};
//!
//! let mut records: Vec<PageRecord> = (0..6)
//!     .map(|i| {
//!         let llx = if i == 4 { 0.0 } else { 100.0 };
//!         let full = PageBox::new(llx, 50.0, 500.0, 700.0);
//!         PageRecord::analyzed(i, BoxVariants::uniform(full), 0.0, 0.0)
//!     })
//!     .collect();
//!
//! let options = NormalizeOptions::builder().crop_outlier(true).build();
//! let groups = GroupNormalizer::normalize_document(&mut records, &options);
//!
//! assert_eq!(records[4].bounding_box.llx, 100.0);
//! assert_eq!(groups.even.clamped, 1);
//! ```

// Submodules
mod group;
mod stats;

// Re-export public API
pub use group::{CommonExtent, GroupNormalizer, GroupSummary, NormalizedGroups};
pub use stats::Statistics;

// ============================================================
// Constants
// ============================================================

/// Default outlier-trimming rounds for band heights
pub const DEFAULT_BAND_ITERATIONS: usize = 2;

/// Default outlier distance in standard deviations
pub const DEFAULT_OUTLIER_DEVIATION: f64 = 1.0;

/// Default mean-to-deviation ratio for a band to count as recurring
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 3.0;

/// Default distance (points) from the mean edge for a page to define the
/// common extent
pub const DEFAULT_CLAMP_TOLERANCE: f64 = 1.0;

/// Upper bound on trimming rounds
const MAX_ITERATIONS: usize = 16;

// ============================================================
// Options
// ============================================================

/// Normalization options
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Switch pages with a recurring header/footer to their band-free box
    pub substitute_bands: bool,
    /// Outlier-trimming rounds for band heights
    pub band_iterations: usize,
    /// Outlier distance in standard deviations
    pub outlier_deviation: f64,
    /// Mean-to-deviation ratio above which a band counts as recurring
    pub significance_threshold: f64,
    /// Clamp left/right edges of outlier pages to the group's common extent
    pub crop_outlier: bool,
    /// Distance (points) from the mean edge for a page to define the extent
    pub clamp_tolerance: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            substitute_bands: true,
            band_iterations: DEFAULT_BAND_ITERATIONS,
            outlier_deviation: DEFAULT_OUTLIER_DEVIATION,
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            crop_outlier: false,
            clamp_tolerance: DEFAULT_CLAMP_TOLERANCE,
        }
    }
}

impl NormalizeOptions {
    pub fn builder() -> NormalizeOptionsBuilder {
        NormalizeOptionsBuilder::default()
    }
}

/// Builder for NormalizeOptions
#[derive(Debug, Default)]
pub struct NormalizeOptionsBuilder {
    options: NormalizeOptions,
}

impl NormalizeOptionsBuilder {
    #[must_use]
    pub fn substitute_bands(mut self, enabled: bool) -> Self {
        self.options.substitute_bands = enabled;
        self
    }

    #[must_use]
    pub fn band_iterations(mut self, iterations: usize) -> Self {
        self.options.band_iterations = iterations.min(MAX_ITERATIONS);
        self
    }

    #[must_use]
    pub fn outlier_deviation(mut self, deviation: f64) -> Self {
        self.options.outlier_deviation = deviation.max(0.1);
        self
    }

    #[must_use]
    pub fn significance_threshold(mut self, threshold: f64) -> Self {
        self.options.significance_threshold = threshold.max(0.0);
        self
    }

    #[must_use]
    pub fn crop_outlier(mut self, enabled: bool) -> Self {
        self.options.crop_outlier = enabled;
        self
    }

    #[must_use]
    pub fn clamp_tolerance(mut self, points: f64) -> Self {
        self.options.clamp_tolerance = points.max(0.0);
        self
    }

    #[must_use]
    pub fn build(self) -> NormalizeOptions {
        self.options
    }
}
