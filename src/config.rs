//! Configuration file support
//!
//! Settings are read from TOML, first `./autocrop.toml`, then
//! `<config_dir>/pdf-autocrop/config.toml`. Command-line values win over file
//! values, and file values win over built-in defaults.
//!
//! ```toml
//! resolution_dpi = 150.0
//! crop_header_pt = 30.0
//! crop_outlier = true
//!
//! [margins]
//! top = 5.0
//! bottom = 5.0
//! inner = 12.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detect::DEFAULT_GAP_TOLERANCE;
use crate::margins::{Margins, DEFAULT_MARGIN_PT};
use crate::normalize::{
    NormalizeOptions, DEFAULT_BAND_ITERATIONS, DEFAULT_CLAMP_TOLERANCE, DEFAULT_OUTLIER_DEVIATION,
    DEFAULT_SIGNIFICANCE_THRESHOLD,
};
use crate::page::{AnalysisOptions, DEFAULT_RESOLUTION_DPI};
use crate::raster::RenderQuality;

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "autocrop.toml";

/// Directory under the user config dir
pub const CONFIG_DIR_NAME: &str = "pdf-autocrop";

// ============================================================
// Error Types
// ============================================================

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ============================================================
// Config
// ============================================================

/// Every tunable of a crop run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Render resolution in DPI
    pub resolution_dpi: f64,
    /// Anti-aliased rendering
    pub high_quality: bool,
    /// Maximum header band in points (0 = no header detection)
    pub crop_header_pt: f64,
    /// Maximum footer band in points (0 = no footer detection)
    pub crop_footer_pt: f64,
    /// Band gap tolerance in pixels
    pub gap_tolerance_px: u32,
    /// Outlier-trimming rounds for band heights
    pub band_iterations: usize,
    /// Outlier distance in standard deviations
    pub outlier_deviation: f64,
    /// Mean-to-deviation ratio for a recurring band
    pub significance_threshold: f64,
    /// Clamp outlier pages to the group extent
    pub crop_outlier: bool,
    /// Distance from the mean edge defining the common extent, in points
    pub clamp_tolerance: f64,
    pub margins: Margins,
    /// Worker threads (`None` = one per CPU)
    pub threads: Option<usize>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            resolution_dpi: DEFAULT_RESOLUTION_DPI,
            high_quality: false,
            crop_header_pt: 0.0,
            crop_footer_pt: 0.0,
            gap_tolerance_px: DEFAULT_GAP_TOLERANCE,
            band_iterations: DEFAULT_BAND_ITERATIONS,
            outlier_deviation: DEFAULT_OUTLIER_DEVIATION,
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            crop_outlier: false,
            clamp_tolerance: DEFAULT_CLAMP_TOLERANCE,
            margins: Margins::uniform(DEFAULT_MARGIN_PT),
            threads: None,
        }
    }
}

impl CropConfig {
    /// Load from the first config file found, or defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Candidate config files in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }
        paths
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply the values set on the command line
    #[must_use]
    pub fn merge_with_cli(mut self, cli: &CliOverrides) -> Self {
        if let Some(dpi) = cli.resolution_dpi {
            self.resolution_dpi = dpi;
        }
        if let Some(hq) = cli.high_quality {
            self.high_quality = hq;
        }
        if let Some(pt) = cli.crop_header_pt {
            self.crop_header_pt = pt;
        }
        if let Some(pt) = cli.crop_footer_pt {
            self.crop_footer_pt = pt;
        }
        if let Some(enabled) = cli.crop_outlier {
            self.crop_outlier = enabled;
        }
        if let Some(margin) = cli.margin {
            self.margins.top = margin;
            self.margins.bottom = margin;
            self.margins.left = margin;
            self.margins.right = margin;
        }
        let edges = [
            (cli.margin_top, &mut self.margins.top),
            (cli.margin_bottom, &mut self.margins.bottom),
            (cli.margin_left, &mut self.margins.left),
            (cli.margin_right, &mut self.margins.right),
            (cli.margin_inner, &mut self.margins.inner),
            (cli.margin_outer, &mut self.margins.outer),
        ];
        for (value, slot) in edges {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if cli.threads.is_some() {
            self.threads = cli.threads;
        }
        self
    }

    pub fn to_analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions::builder()
            .resolution_dpi(self.resolution_dpi)
            .quality(if self.high_quality {
                RenderQuality::High
            } else {
                RenderQuality::Fast
            })
            .max_header_pt(self.crop_header_pt)
            .max_footer_pt(self.crop_footer_pt)
            .gap_tolerance(self.gap_tolerance_px)
            .threads(self.threads)
            .build()
    }

    pub fn to_normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::builder()
            .substitute_bands(self.crop_header_pt > 0.0 || self.crop_footer_pt > 0.0)
            .band_iterations(self.band_iterations)
            .outlier_deviation(self.outlier_deviation)
            .significance_threshold(self.significance_threshold)
            .crop_outlier(self.crop_outlier)
            .clamp_tolerance(self.clamp_tolerance)
            .build()
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Serialize for reports and dry runs
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub resolution_dpi: Option<f64>,
    pub high_quality: Option<bool>,
    pub crop_header_pt: Option<f64>,
    pub crop_footer_pt: Option<f64>,
    pub crop_outlier: Option<bool>,
    /// Sets top, bottom, left and right together
    pub margin: Option<f64>,
    pub margin_top: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub margin_left: Option<f64>,
    pub margin_right: Option<f64>,
    pub margin_inner: Option<f64>,
    pub margin_outer: Option<f64>,
    pub threads: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}
