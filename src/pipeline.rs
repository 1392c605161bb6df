//! Crop pipeline
//!
//! Runs the stages in order: render and analyze every page, normalize the
//! parity groups, apply margins, write the boxes. Everything up to the
//! margins works on any [`RasterProvider`]; [`CropPipeline::process`] adds the
//! Poppler provider and the lopdf writer around it.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::config::CropConfig;
use crate::error::Result;
use crate::margins::apply_margins;
use crate::normalize::{GroupNormalizer, NormalizedGroups};
use crate::output::{GeometryWriter, PdfBoxWriter};
use crate::page::{analyze_document, PageRecord};
use crate::progress::{ProcessingStage, ProgressCallback};
use crate::raster::{PopplerRasterProvider, RasterProvider};

/// Suffix inserted before the extension of the default output file
pub const OUTPUT_SUFFIX: &str = "-cropped";

/// Output path for `input` when none is given: `book.pdf` -> `book-cropped.pdf`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, OUTPUT_SUFFIX),
    };
    input.with_file_name(name)
}

// ============================================================
// Report
// ============================================================

/// Result of a crop run
#[derive(Debug, Clone, Serialize)]
pub struct CropReport {
    /// Final record per page, in page order
    pub records: Vec<PageRecord>,
    pub groups: NormalizedGroups,
    /// Pages whose boxes were written to the output
    pub written_pages: usize,
    pub elapsed_seconds: f64,
}

impl CropReport {
    pub fn page_count(&self) -> usize {
        self.records.len()
    }

    /// Indices of pages whose analysis failed
    pub fn failed_pages(&self) -> Vec<usize> {
        self.records
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.page_index)
            .collect()
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

// ============================================================
// Pipeline
// ============================================================

/// Crop pipeline driven by a [`CropConfig`]
#[derive(Debug, Clone)]
pub struct CropPipeline {
    config: CropConfig,
}

impl CropPipeline {
    pub fn new(config: CropConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Compute the final box of every page of `provider`'s document.
    /// `written_pages` of the report is left at 0.
    pub fn compute_boxes<P: RasterProvider>(
        &self,
        provider: &P,
        progress: &dyn ProgressCallback,
    ) -> Result<CropReport> {
        let start = Instant::now();

        let mut records =
            analyze_document(provider, &self.config.to_analysis_options(), progress)?;

        progress.on_stage_start(ProcessingStage::Normalizing, 0);
        let groups =
            GroupNormalizer::normalize_document(&mut records, &self.config.to_normalize_options());
        progress.on_stage_complete(
            ProcessingStage::Normalizing,
            &format!(
                "{} substituted, {} clamped",
                groups.even.substituted + groups.odd.substituted,
                groups.even.clamped + groups.odd.clamped
            ),
        );

        progress.on_stage_start(ProcessingStage::ApplyingMargins, 0);
        apply_margins(&mut records, &self.config.margins());
        progress.on_stage_complete(ProcessingStage::ApplyingMargins, "done");

        Ok(CropReport {
            records,
            groups,
            written_pages: 0,
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Hand every successfully analyzed page's box to `writer`. Returns the
    /// number of pages written.
    pub fn write_boxes<W: GeometryWriter>(
        &self,
        records: &[PageRecord],
        writer: &mut W,
        progress: &dyn ProgressCallback,
    ) -> Result<usize> {
        progress.on_stage_start(ProcessingStage::Writing, records.len());
        let mut written = 0;
        for record in records {
            if !record.is_failed() {
                writer.apply_box(record.page_index, &record.bounding_box)?;
                written += 1;
            }
            progress.on_page_complete(record.page_index);
        }
        progress.on_stage_complete(ProcessingStage::Writing, &format!("{} pages", written));
        Ok(written)
    }

    /// Crop `input` into `output`
    pub fn process(
        &self,
        input: &Path,
        output: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<CropReport> {
        let start = Instant::now();

        progress.on_stage_start(ProcessingStage::Loading, 0);
        let provider = PopplerRasterProvider::open(input)?;
        let mut writer = PdfBoxWriter::open(input)?;
        progress.on_stage_complete(
            ProcessingStage::Loading,
            &format!("{} pages", provider.page_count()),
        );

        let mut report = self.compute_boxes(&provider, progress)?;

        report.written_pages = self.write_boxes(&report.records, &mut writer, progress)?;
        writer.save(output)?;

        let failed = report.failed_pages();
        if !failed.is_empty() {
            tracing::warn!(
                "{} page(s) could not be analyzed and keep their original boxes: {:?}",
                failed.len(),
                failed.iter().map(|i| i + 1).collect::<Vec<_>>()
            );
        }

        report.elapsed_seconds = start.elapsed().as_secs_f64();
        progress.on_stage_complete(ProcessingStage::Completed, &output.display().to_string());
        Ok(report)
    }
}
