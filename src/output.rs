//! Page-box writer
//!
//! Writes computed crop boxes back into the page dictionaries of a PDF. Only
//! the box attributes change; content streams and document structure are
//! left alone.

use std::path::Path;

use lopdf::{Document, ObjectId};
use thiserror::Error;

use crate::geometry::PageBox;
use crate::pdf::{self, BOX_KEYS};

// ============================================================
// Error Types
// ============================================================

/// Output error types
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Page {0} does not exist in the document")]
    MissingPage(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for OutputError {
    fn from(e: lopdf::Error) -> Self {
        OutputError::Pdf(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;

// ============================================================
// Writer
// ============================================================

/// Receives one final box per page
pub trait GeometryWriter {
    /// Set the crop box of a page. `page_box` is relative to the page's
    /// visible area, lower-left origin.
    fn apply_box(&mut self, page_index: usize, page_box: &PageBox) -> Result<()>;
}

/// Rewrites MediaBox, CropBox, BleedBox, TrimBox and ArtBox with lopdf
pub struct PdfBoxWriter {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PdfBoxWriter {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.doc.save(path)?;
        tracing::info!("wrote {}", path.display());
        Ok(())
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl GeometryWriter for PdfBoxWriter {
    fn apply_box(&mut self, page_index: usize, page_box: &PageBox) -> Result<()> {
        let page_id = *self
            .pages
            .get(page_index)
            .ok_or(OutputError::MissingPage(page_index))?;
        let geometry = pdf::page_geometry(&self.doc, page_id)
            .ok_or_else(|| OutputError::Pdf(format!("page {} has no MediaBox", page_index + 1)))?;
        let target = page_box.translate(geometry.visible.llx, geometry.visible.lly);

        // Each attribute keeps only the part of the new box it already covered
        let updates: Vec<(&[u8], PageBox)> = BOX_KEYS
            .iter()
            .filter_map(|&key| {
                let original = pdf::attribute(&self.doc, page_id, key)
                    .and_then(|obj| pdf::read_rect(&self.doc, obj))?;
                match target.intersect(&original) {
                    Some(clipped) => Some((key, clipped)),
                    None => {
                        tracing::debug!(
                            "page {}: {} does not overlap the new box, left unchanged",
                            page_index + 1,
                            String::from_utf8_lossy(key)
                        );
                        None
                    }
                }
            })
            .collect();

        let dict = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        for (key, clipped) in updates {
            dict.set(key, pdf::rect_object(&clipped));
        }
        Ok(())
    }
}
