//! Per-page analysis module
//!
//! Builds one [`PageRecord`] per page from its rendering: the tight content
//! box, the header and footer band heights, and the precomputed box variants
//! the normalizer later chooses from.

// Submodules
mod analyze;
mod record;

// Re-export public API
pub use analyze::{
    analyze_document, analyze_page, AnalysisOptions, AnalysisOptionsBuilder, DEFAULT_BAND_SIZE_PT,
    DEFAULT_RESOLUTION_DPI,
};
pub use record::{BoxVariant, BoxVariants, PageOutcome, PageRecord, Parity};
