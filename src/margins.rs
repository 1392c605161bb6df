//! Final margins around the normalized boxes
//!
//! Book pages alternate sides, so besides plain left/right margins there are
//! binding-relative ones: `inner` is added on the spine side and `outer` on
//! the fore-edge side. Even page indices are right-hand pages (spine on the
//! left), odd indices left-hand pages.

use serde::{Deserialize, Serialize};

use crate::geometry::PageBox;
use crate::page::{PageRecord, Parity};

/// Default margin on all four edges, in points
pub const DEFAULT_MARGIN_PT: f64 = 5.0;

/// Margins in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    /// Spine side
    pub inner: f64,
    /// Fore-edge side
    pub outer: f64,
}

impl Margins {
    /// Same margin on top, bottom, left and right; no inner/outer
    pub fn uniform(margin: f64) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
            inner: 0.0,
            outer: 0.0,
        }
    }

    /// Margins for a page of the given parity as (left, bottom, right, top)
    pub fn edges(&self, parity: Parity) -> (f64, f64, f64, f64) {
        let (spine_left, spine_right) = match parity {
            Parity::Even => (self.inner, self.outer),
            Parity::Odd => (self.outer, self.inner),
        };
        (
            self.left + spine_left,
            self.bottom,
            self.right + spine_right,
            self.top,
        )
    }

    /// Grow `page_box` by the margins of a page of the given parity
    pub fn apply_to(&self, page_box: &PageBox, parity: Parity) -> PageBox {
        let (left, bottom, right, top) = self.edges(parity);
        page_box.expand(left, bottom, right, top)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply margins to every record's box. Failed records are skipped.
pub fn apply_margins(records: &mut [PageRecord], margins: &Margins) {
    if margins.is_zero() {
        return;
    }
    for record in records.iter_mut().filter(|r| !r.is_failed()) {
        record.bounding_box = margins.apply_to(&record.bounding_box, record.parity());
    }
    tracing::debug!("applied margins {:?} to {} pages", margins, records.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::BoxVariants;

    fn record(index: usize) -> PageRecord {
        PageRecord::analyzed(
            index,
            BoxVariants::uniform(PageBox::new(0.0, 0.0, 100.0, 100.0)),
            0.0,
            0.0,
        )
    }

    #[test]
    fn test_uniform_margin() {
        let mut records = vec![record(0), record(1)];
        apply_margins(&mut records, &Margins::uniform(5.0));
        for r in &records {
            assert_eq!(r.bounding_box, PageBox::new(-5.0, -5.0, 105.0, 105.0));
        }
    }

    #[test]
    fn test_zero_margin_is_identity() {
        let mut records = vec![record(0), record(1)];
        let before = records.clone();
        apply_margins(&mut records, &Margins::uniform(0.0));
        assert_eq!(records, before);
    }

    #[test]
    fn test_inner_outer_follow_parity() {
        let margins = Margins {
            inner: 10.0,
            outer: 3.0,
            ..Margins::default()
        };
        let mut records = vec![record(0), record(1)];
        apply_margins(&mut records, &margins);

        // Even: spine on the left
        assert_eq!(records[0].bounding_box, PageBox::new(-10.0, 0.0, 103.0, 100.0));
        // Odd: spine on the right
        assert_eq!(records[1].bounding_box, PageBox::new(-3.0, 0.0, 110.0, 100.0));
    }

    #[test]
    fn test_edges_combine() {
        let margins = Margins {
            inner: 2.0,
            ..Margins::uniform(4.0)
        };
        assert_eq!(margins.edges(Parity::Even), (6.0, 4.0, 4.0, 4.0));
        assert_eq!(margins.edges(Parity::Odd), (4.0, 4.0, 6.0, 4.0));
    }

    #[test]
    fn test_failed_records_skipped() {
        let mut records = vec![PageRecord::failed(0, "boom"), record(1)];
        let failed = records[0].clone();
        apply_margins(&mut records, &Margins::uniform(5.0));
        assert_eq!(records[0], failed);
        assert_eq!(records[1].bounding_box.llx, -5.0);
    }

    #[test]
    fn test_deserialize_partial() {
        let margins: Margins = toml::from_str("top = 12.0\ninner = 4.0").unwrap();
        assert_eq!(margins.top, 12.0);
        assert_eq!(margins.inner, 4.0);
        assert_eq!(margins.left, 0.0);
    }
}
