//! Poppler-backed raster provider
//!
//! Page geometry comes from the page tree (via `lopdf`); pixels come from
//! `pdftoppm`, one page per invocation, written as a grayscale PGM into a
//! scratch directory owned by the renderer.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use super::{
    PageRenderer, PixelGrid, RasterError, RasterProvider, RenderQuality, RenderedPage, Result,
};
use crate::pdf::{self, PageGeometry};

/// Name of the Poppler rendering tool
const PDFTOPPM: &str = "pdftoppm";

/// Output file stem inside the scratch directory
const PAGE_STEM: &str = "page";

/// Open PDF ready to be rendered page by page
#[derive(Debug)]
pub struct PopplerRasterProvider {
    input: PathBuf,
    pdftoppm: PathBuf,
    pages: Arc<[PageGeometry]>,
}

impl PopplerRasterProvider {
    /// Parse the page tree of `input` and locate `pdftoppm`
    pub fn open(input: &Path) -> Result<Self> {
        let load_error = |message: String| RasterError::Load {
            path: input.to_path_buf(),
            message,
        };

        let doc = lopdf::Document::load(input).map_err(|e| load_error(e.to_string()))?;
        let pages = doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                pdf::page_geometry(&doc, id)
                    .ok_or_else(|| load_error(format!("page {} has no usable MediaBox", number)))
            })
            .collect::<Result<Vec<_>>>()?;
        if pages.is_empty() {
            return Err(load_error("document has no pages".to_string()));
        }

        let pdftoppm =
            which::which(PDFTOPPM).map_err(|_| RasterError::ToolNotFound(PDFTOPPM.to_string()))?;

        tracing::debug!(
            "opened {} ({} pages), renderer {}",
            input.display(),
            pages.len(),
            pdftoppm.display()
        );

        Ok(Self {
            input: input.to_path_buf(),
            pdftoppm,
            pages: pages.into(),
        })
    }
}

impl RasterProvider for PopplerRasterProvider {
    type Renderer = PopplerRenderer;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn renderer(&self) -> Result<PopplerRenderer> {
        Ok(PopplerRenderer {
            input: self.input.clone(),
            pdftoppm: self.pdftoppm.clone(),
            pages: Arc::clone(&self.pages),
            scratch: tempfile::tempdir()?,
        })
    }
}

/// Per-worker renderer with its own scratch directory
#[derive(Debug)]
pub struct PopplerRenderer {
    input: PathBuf,
    pdftoppm: PathBuf,
    pages: Arc<[PageGeometry]>,
    scratch: TempDir,
}

impl PopplerRenderer {
    fn command(&self, page_number: usize, resolution_dpi: f64, quality: RenderQuality) -> Command {
        let antialias = match quality {
            RenderQuality::High => "yes",
            RenderQuality::Fast => "no",
        };
        let page = page_number.to_string();

        let mut cmd = Command::new(&self.pdftoppm);
        cmd.arg("-gray")
            .arg("-cropbox")
            .arg("-singlefile")
            .args(["-r", &format!("{}", resolution_dpi)])
            .args(["-f", &page, "-l", &page])
            .args(["-aa", antialias, "-aaVector", antialias])
            .arg(&self.input)
            .arg(self.scratch.path().join(PAGE_STEM));
        cmd
    }
}

impl PageRenderer for PopplerRenderer {
    fn render(
        &mut self,
        page_index: usize,
        resolution_dpi: f64,
        quality: RenderQuality,
    ) -> Result<RenderedPage> {
        let geometry = *self
            .pages
            .get(page_index)
            .ok_or(RasterError::PageOutOfRange {
                index: page_index,
                count: self.pages.len(),
            })?;

        let output = self
            .command(page_index + 1, resolution_dpi, quality)
            .output()?;
        if !output.status.success() {
            return Err(RasterError::Render {
                page: page_index,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let path = self.scratch.path().join(format!("{}.pgm", PAGE_STEM));
        let image = image::open(&path)?.to_luma8();
        std::fs::remove_file(&path)?;

        Ok(RenderedPage {
            grid: PixelGrid::from_gray_image(image),
            page_width_pt: geometry.visible.width(),
            page_height_pt: geometry.visible.height(),
            orientation: geometry.orientation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = PopplerRasterProvider::open(Path::new("/nonexistent/book.pdf"));
        assert!(matches!(result, Err(RasterError::Load { .. })));
    }

    #[test]
    fn test_open_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let result = PopplerRasterProvider::open(&path);
        assert!(matches!(result, Err(RasterError::Load { .. })));
    }

    #[test]
    fn test_error_display_messages() {
        let err = RasterError::PageOutOfRange { index: 7, count: 3 };
        assert!(err.to_string().contains("out of range"));

        let err = RasterError::ToolNotFound("pdftoppm".to_string());
        assert!(err.to_string().contains("pdftoppm"));
    }
}
