//! Per-page analysis records

use serde::Serialize;

use crate::geometry::PageBox;

/// Facing-page group of a page index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    /// Indices 0, 2, 4, ... (first page of a book is a right-hand page)
    Even,
    /// Indices 1, 3, 5, ...
    Odd,
}

impl Parity {
    pub fn of(page_index: usize) -> Self {
        if page_index % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Parity::Even => "even",
            Parity::Odd => "odd",
        }
    }
}

/// Which precomputed box a page uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxVariant {
    #[default]
    Full,
    NoHeader,
    NoFooter,
    NoHeaderFooter,
}

impl BoxVariant {
    /// Variant for the given combination of removed bands
    pub fn excluding(header: bool, footer: bool) -> Self {
        match (header, footer) {
            (false, false) => BoxVariant::Full,
            (true, false) => BoxVariant::NoHeader,
            (false, true) => BoxVariant::NoFooter,
            (true, true) => BoxVariant::NoHeaderFooter,
        }
    }
}

/// The four content boxes of a page, computed once by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoxVariants {
    pub full: PageBox,
    pub no_header: PageBox,
    pub no_footer: PageBox,
    pub no_header_footer: PageBox,
}

impl BoxVariants {
    /// All variants equal to `full`
    pub fn uniform(full: PageBox) -> Self {
        Self {
            full,
            no_header: full,
            no_footer: full,
            no_header_footer: full,
        }
    }

    pub fn get(&self, variant: BoxVariant) -> PageBox {
        match variant {
            BoxVariant::Full => self.full,
            BoxVariant::NoHeader => self.no_header,
            BoxVariant::NoFooter => self.no_footer,
            BoxVariant::NoHeaderFooter => self.no_header_footer,
        }
    }
}

/// How the analysis of a page ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Content found; box is its tight bounds
    Content,
    /// Nothing but background; box is the full page
    Blank,
    /// Rendering failed; the page keeps its original geometry
    Failed { message: String },
}

/// Analysis result for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    /// Page index (0-indexed)
    pub page_index: usize,
    /// Current crop box in page space
    pub bounding_box: PageBox,
    /// Detected header band height in points
    pub header_height: f64,
    /// Detected footer band height in points
    pub footer_height: f64,
    pub variants: BoxVariants,
    /// Variant `bounding_box` was taken from
    pub selected: BoxVariant,
    pub outcome: PageOutcome,
}

impl PageRecord {
    /// Record for a page with detected content
    pub fn analyzed(
        page_index: usize,
        variants: BoxVariants,
        header_height: f64,
        footer_height: f64,
    ) -> Self {
        Self {
            page_index,
            bounding_box: variants.full,
            header_height,
            footer_height,
            variants,
            selected: BoxVariant::Full,
            outcome: PageOutcome::Content,
        }
    }

    /// Record for an all-background page, falling back to the full extent
    pub fn blank(page_index: usize, page_width_pt: f64, page_height_pt: f64) -> Self {
        let full = PageBox::full_page(page_width_pt, page_height_pt);
        Self {
            outcome: PageOutcome::Blank,
            ..Self::analyzed(page_index, BoxVariants::uniform(full), 0.0, 0.0)
        }
    }

    pub fn failed(page_index: usize, message: impl Into<String>) -> Self {
        Self {
            outcome: PageOutcome::Failed {
                message: message.into(),
            },
            ..Self::analyzed(page_index, BoxVariants::default(), 0.0, 0.0)
        }
    }

    pub fn parity(&self) -> Parity {
        Parity::of(self.page_index)
    }

    pub fn has_content(&self) -> bool {
        self.outcome == PageOutcome::Content
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PageOutcome::Failed { .. })
    }

    /// Replace the bounding box with a precomputed variant
    pub fn select(&mut self, variant: BoxVariant) {
        self.bounding_box = self.variants.get(variant);
        self.selected = variant;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants() -> BoxVariants {
        BoxVariants {
            full: PageBox::new(10.0, 10.0, 90.0, 190.0),
            no_header: PageBox::new(10.0, 10.0, 90.0, 170.0),
            no_footer: PageBox::new(10.0, 25.0, 90.0, 190.0),
            no_header_footer: PageBox::new(10.0, 25.0, 90.0, 170.0),
        }
    }

    #[test]
    fn test_parity() {
        assert_eq!(Parity::of(0), Parity::Even);
        assert_eq!(Parity::of(1), Parity::Odd);
        assert_eq!(Parity::of(42), Parity::Even);
        assert_eq!(Parity::Odd.name(), "odd");
    }

    #[test]
    fn test_variant_excluding() {
        assert_eq!(BoxVariant::excluding(false, false), BoxVariant::Full);
        assert_eq!(BoxVariant::excluding(true, false), BoxVariant::NoHeader);
        assert_eq!(BoxVariant::excluding(false, true), BoxVariant::NoFooter);
        assert_eq!(BoxVariant::excluding(true, true), BoxVariant::NoHeaderFooter);
    }

    #[test]
    fn test_analyzed_starts_with_full_box() {
        let record = PageRecord::analyzed(3, variants(), 20.0, 15.0);
        assert_eq!(record.bounding_box, variants().full);
        assert_eq!(record.selected, BoxVariant::Full);
        assert_eq!(record.parity(), Parity::Odd);
        assert!(record.has_content());
    }

    #[test]
    fn test_select_variant() {
        let mut record = PageRecord::analyzed(0, variants(), 20.0, 15.0);
        record.select(BoxVariant::NoHeaderFooter);
        assert_eq!(record.bounding_box, PageBox::new(10.0, 25.0, 90.0, 170.0));
        assert_eq!(record.selected, BoxVariant::NoHeaderFooter);
    }

    #[test]
    fn test_blank_falls_back_to_full_page() {
        let record = PageRecord::blank(1, 612.0, 792.0);
        assert_eq!(record.bounding_box, PageBox::new(0.0, 0.0, 612.0, 792.0));
        assert_eq!(record.outcome, PageOutcome::Blank);
        assert!(!record.has_content());
        assert!(!record.is_failed());
    }

    #[test]
    fn test_failed_record() {
        let record = PageRecord::failed(2, "renderer crashed");
        assert!(record.is_failed());
        assert!(!record.has_content());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&PageOutcome::Failed {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"failed","message":"boom"}"#);
    }
}
