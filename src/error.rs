//! Top-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::raster::RasterError;

/// Errors that abort a crop run
#[derive(Debug, Error)]
pub enum CropError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CropError>;

impl CropError {
    /// Whether the input document could not be opened or parsed
    pub fn is_load_failure(&self) -> bool {
        matches!(self, CropError::Raster(RasterError::Load { .. }))
    }
}
