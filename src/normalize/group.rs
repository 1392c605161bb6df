//! Parity group normalization
//!
//! Works on one facing-page group at a time (even or odd page indices):
//!
//! 1. Header/footer substitution: if the group's band heights agree well
//!    enough to be a real recurring header (or footer), pages whose band
//!    matches switch to their header/footer-excluding box.
//! 2. Extent clamping: pages whose left or right edge reaches further out than
//!    the group's common extent are pulled back to it. Clamping only shrinks.
//!
//! Statistics only use pages with detected content, so a blank or failed page
//! cannot drag the group. Results do not depend on page order in the group.

use serde::Serialize;

use super::stats::Statistics;
use super::NormalizeOptions;
use crate::page::{BoxVariant, PageRecord, Parity};

// ============================================================
// Constants
// ============================================================

/// Outlier-trimming rounds for the edge means
pub const EDGE_TRIM_ITERATIONS: usize = 3;

/// Band heights closer than this (points) to the group mean always match
const MIN_BAND_TOLERANCE_PT: f64 = 1.0;

// ============================================================
// Data Structures
// ============================================================

/// Edges shared by the non-outlier pages of a group
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CommonExtent {
    /// Smallest left edge among pages near the mean left edge
    pub left: Option<f64>,
    /// Largest right edge among pages near the mean right edge
    pub right: Option<f64>,
}

/// What normalization found and did for one parity group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub parity: Parity,
    /// Pages in the group, failed pages excluded
    pub page_count: usize,
    /// Pages that contributed samples
    pub content_pages: usize,
    /// Robust statistics of nonzero header heights
    pub header: Statistics,
    /// Robust statistics of nonzero footer heights
    pub footer: Statistics,
    /// Whether the group was judged to carry a recurring header
    pub has_header: bool,
    /// Whether the group was judged to carry a recurring footer
    pub has_footer: bool,
    /// Pages switched to a band-excluding variant
    pub substituted: usize,
    pub extent: CommonExtent,
    /// Pages whose box was narrowed by clamping
    pub clamped: usize,
}

impl GroupSummary {
    fn new(parity: Parity) -> Self {
        Self {
            parity,
            page_count: 0,
            content_pages: 0,
            header: Statistics::default(),
            footer: Statistics::default(),
            has_header: false,
            has_footer: false,
            substituted: 0,
            extent: CommonExtent::default(),
            clamped: 0,
        }
    }
}

/// Summaries of both parity groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedGroups {
    pub even: GroupSummary,
    pub odd: GroupSummary,
}

// ============================================================
// Group Normalizer
// ============================================================

/// Normalizes page boxes within parity groups
pub struct GroupNormalizer;

impl GroupNormalizer {
    /// Normalize both parity groups of a document
    pub fn normalize_document(
        records: &mut [PageRecord],
        options: &NormalizeOptions,
    ) -> NormalizedGroups {
        let even = Self::normalize_group(records, Parity::Even, options);
        let odd = Self::normalize_group(records, Parity::Odd, options);
        NormalizedGroups { even, odd }
    }

    /// Normalize the records of one parity group, leaving the others as they
    /// are. Group membership comes from each record's page index, not from
    /// its position in `records`.
    pub fn normalize_group(
        records: &mut [PageRecord],
        parity: Parity,
        options: &NormalizeOptions,
    ) -> GroupSummary {
        let mut summary = GroupSummary::new(parity);
        let mut group: Vec<&mut PageRecord> = records
            .iter_mut()
            .filter(|r| r.parity() == parity && !r.is_failed())
            .collect();
        summary.page_count = group.len();
        summary.content_pages = group.iter().filter(|r| r.has_content()).count();

        if options.substitute_bands {
            Self::substitute_bands(&mut group, options, &mut summary);
        }
        if options.crop_outlier {
            Self::clamp_extent(&mut group, options, &mut summary);
        }

        tracing::debug!(
            "{} pages: {} of {} with content, header {:?} ({}), footer {:?} ({}), {} substituted, extent {:?}, {} clamped",
            parity.name(),
            summary.content_pages,
            summary.page_count,
            summary.header,
            summary.has_header,
            summary.footer,
            summary.has_footer,
            summary.substituted,
            summary.extent,
            summary.clamped
        );

        summary
    }

    /// Robust band statistics and whether they describe a recurring band
    fn band_statistics(heights: &[f64], options: &NormalizeOptions) -> (Statistics, bool) {
        let stats = Statistics::robust(
            heights,
            options.band_iterations,
            options.outlier_deviation,
        );
        (stats, stats.is_significant(options.significance_threshold))
    }

    fn substitute_bands(
        group: &mut [&mut PageRecord],
        options: &NormalizeOptions,
        summary: &mut GroupSummary,
    ) {
        // Pages without a detected band do not vote
        let samples = |height: fn(&PageRecord) -> f64| -> Vec<f64> {
            group
                .iter()
                .filter(|r| r.has_content())
                .map(|r| height(r))
                .filter(|&h| h > 0.0)
                .collect()
        };
        let headers = samples(|r| r.header_height);
        let footers = samples(|r| r.footer_height);

        let (header, has_header) = Self::band_statistics(&headers, options);
        let (footer, has_footer) = Self::band_statistics(&footers, options);
        summary.header = header;
        summary.footer = footer;
        summary.has_header = has_header;
        summary.has_footer = has_footer;

        if !has_header && !has_footer {
            return;
        }

        for record in group.iter_mut().filter(|r| r.has_content()) {
            let drop_header = has_header
                && record.header_height > 0.0
                && header.within(record.header_height, MIN_BAND_TOLERANCE_PT);
            let drop_footer = has_footer
                && record.footer_height > 0.0
                && footer.within(record.footer_height, MIN_BAND_TOLERANCE_PT);

            let variant = BoxVariant::excluding(drop_header, drop_footer);
            if variant != BoxVariant::Full {
                record.select(variant);
                summary.substituted += 1;
            }
        }
    }

    fn clamp_extent(
        group: &mut [&mut PageRecord],
        options: &NormalizeOptions,
        summary: &mut GroupSummary,
    ) {
        let lefts: Vec<f64> = group
            .iter()
            .filter(|r| r.has_content())
            .map(|r| r.bounding_box.llx)
            .collect();
        let rights: Vec<f64> = group
            .iter()
            .filter(|r| r.has_content())
            .map(|r| r.bounding_box.urx)
            .collect();

        let left_mean =
            Statistics::robust(&lefts, EDGE_TRIM_ITERATIONS, options.outlier_deviation).mean;
        let right_mean =
            Statistics::robust(&rights, EDGE_TRIM_ITERATIONS, options.outlier_deviation).mean;

        let extent = CommonExtent {
            left: lefts
                .iter()
                .copied()
                .filter(|l| (l - left_mean).abs() <= options.clamp_tolerance)
                .reduce(f64::min),
            right: rights
                .iter()
                .copied()
                .filter(|r| (r - right_mean).abs() <= options.clamp_tolerance)
                .reduce(f64::max),
        };
        summary.extent = extent;

        for record in group.iter_mut() {
            let before = record.bounding_box;
            let b = &mut record.bounding_box;
            if let Some(left) = extent.left {
                b.llx = b.llx.max(left).min(b.urx);
            }
            if let Some(right) = extent.right {
                b.urx = b.urx.min(right).max(b.llx);
            }
            if *b != before {
                tracing::debug!(
                    "page {}: clamped [{:.1}, {:.1}] -> [{:.1}, {:.1}]",
                    record.page_index + 1,
                    before.llx,
                    before.urx,
                    record.bounding_box.llx,
                    record.bounding_box.urx
                );
                summary.clamped += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageBox;
    use crate::page::BoxVariants;

    fn outlier_options() -> NormalizeOptions {
        NormalizeOptions::builder().crop_outlier(true).build()
    }

    fn page(index: usize, llx: f64, urx: f64) -> PageRecord {
        PageRecord::analyzed(
            index,
            BoxVariants::uniform(PageBox::new(llx, 50.0, urx, 700.0)),
            0.0,
            0.0,
        )
    }

    /// Page with a header/footer pair and distinct variants
    fn banded(index: usize, header: f64, footer: f64) -> PageRecord {
        let full = PageBox::new(60.0, 40.0, 540.0, 760.0);
        PageRecord::analyzed(
            index,
            BoxVariants {
                full,
                no_header: PageBox::new(60.0, 40.0, 540.0, 720.0),
                no_footer: PageBox::new(60.0, 70.0, 540.0, 760.0),
                no_header_footer: PageBox::new(60.0, 70.0, 540.0, 720.0),
            },
            header,
            footer,
        )
    }

    #[test]
    fn test_identical_boxes_unchanged() {
        let mut records: Vec<_> = (0..5).map(|i| page(i * 2, 72.0, 540.0)).collect();
        let before = records.clone();

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Even, &outlier_options());

        assert_eq!(records, before);
        assert_eq!(summary.clamped, 0);
        assert_eq!(summary.extent.left, Some(72.0));
        assert_eq!(summary.extent.right, Some(540.0));
    }

    #[test]
    fn test_outlier_left_edge_clamped() {
        let mut records: Vec<_> = (0..5).map(|i| page(i * 2, 100.0, 500.0)).collect();
        records[3].bounding_box.llx = 0.0;

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Even, &outlier_options());

        assert_eq!(records[3].bounding_box.llx, 100.0);
        assert_eq!(summary.clamped, 1);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.bounding_box.llx, 100.0, "page {}", i);
            assert_eq!(record.bounding_box.urx, 500.0, "page {}", i);
        }
    }

    #[test]
    fn test_clamping_never_grows_narrow_page() {
        let mut records: Vec<_> = (0..5).map(|i| page(i * 2, 100.0, 500.0)).collect();
        records[1].bounding_box = PageBox::new(200.0, 50.0, 300.0, 700.0);
        let narrow = records[1].bounding_box;

        GroupNormalizer::normalize_group(&mut records, Parity::Even, &outlier_options());
        assert_eq!(records[1].bounding_box, narrow);
    }

    #[test]
    fn test_clamping_requires_option() {
        let mut records: Vec<_> = (0..5).map(|i| page(i * 2, 100.0, 500.0)).collect();
        records[3].bounding_box.llx = 0.0;

        GroupNormalizer::normalize_group(&mut records, Parity::Even, &NormalizeOptions::default());
        assert_eq!(records[3].bounding_box.llx, 0.0);
    }

    #[test]
    fn test_no_common_extent_without_agreement() {
        // Two pages far apart: nothing lies near the mean, nothing is clamped
        let mut records = vec![page(0, 0.0, 500.0), page(2, 100.0, 600.0)];
        let before = records.clone();

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Even, &outlier_options());
        assert_eq!(summary.extent, CommonExtent::default());
        assert_eq!(records, before);
    }

    #[test]
    fn test_groups_are_independent() {
        // Odd pages are shifted right relative to even pages
        let mut records: Vec<_> = (0..8)
            .map(|i| if i % 2 == 0 { page(i, 100.0, 500.0) } else { page(i, 60.0, 460.0) })
            .collect();
        let before = records.clone();

        let groups = GroupNormalizer::normalize_document(&mut records, &outlier_options());

        assert_eq!(records, before);
        assert_eq!(groups.even.extent.left, Some(100.0));
        assert_eq!(groups.odd.extent.left, Some(60.0));
        assert_eq!(groups.even.page_count, 4);
        assert_eq!(groups.odd.page_count, 4);
    }

    #[test]
    fn test_blank_page_clamped_but_not_sampled() {
        let mut records: Vec<_> = (0..4).map(|i| page(i * 2, 100.0, 500.0)).collect();
        records.push(PageRecord::blank(8, 612.0, 792.0));

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Even, &outlier_options());

        assert_eq!(summary.content_pages, 4);
        assert_eq!(records[4].bounding_box, PageBox::new(100.0, 0.0, 500.0, 792.0));
    }

    #[test]
    fn test_failed_page_untouched() {
        let mut records: Vec<_> = (0..4).map(|i| page(i * 2, 100.0, 500.0)).collect();
        records.push(PageRecord::failed(8, "boom"));
        let failed = records[4].clone();

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Even, &outlier_options());
        assert_eq!(summary.page_count, 4);
        assert_eq!(records[4], failed);
    }

    #[test]
    fn test_order_independent() {
        let build = || -> Vec<PageRecord> {
            let mut records: Vec<_> = (0..6).map(|i| banded(i * 2, 20.0, 12.0)).collect();
            records[1].header_height = 21.0;
            records[2].bounding_box.llx = 10.0;
            records[4].bounding_box.urx = 590.0;
            records[5].header_height = 3.0;
            records
        };
        let options = NormalizeOptions::builder()
            .substitute_bands(true)
            .crop_outlier(true)
            .build();

        let mut forward = build();
        let forward_summary = GroupNormalizer::normalize_group(&mut forward, Parity::Even, &options);

        let mut reversed = build();
        reversed.reverse();
        let reversed_summary =
            GroupNormalizer::normalize_group(&mut reversed, Parity::Even, &options);
        reversed.reverse();

        assert_eq!(forward, reversed);
        assert_eq!(forward_summary, reversed_summary);
    }

    // ============================================================
    // Header/footer substitution
    // ============================================================

    fn band_options() -> NormalizeOptions {
        NormalizeOptions::builder().substitute_bands(true).build()
    }

    #[test]
    fn test_recurring_header_and_footer_removed() {
        let mut records: Vec<_> = (0..4).map(|i| banded(i * 2 + 1, 20.0, 12.0)).collect();

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Odd, &band_options());

        assert!(summary.has_header);
        assert!(summary.has_footer);
        assert_eq!(summary.substituted, 4);
        for record in &records {
            assert_eq!(record.selected, BoxVariant::NoHeaderFooter);
            assert_eq!(record.bounding_box, PageBox::new(60.0, 70.0, 540.0, 720.0));
        }
    }

    #[test]
    fn test_header_only_group() {
        let mut records: Vec<_> = (0..4).map(|i| banded(i * 2, 20.0, 0.0)).collect();

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Even, &band_options());

        assert!(summary.has_header);
        assert!(!summary.has_footer);
        assert!(records.iter().all(|r| r.selected == BoxVariant::NoHeader));
    }

    #[test]
    fn test_page_outside_tolerance_keeps_box() {
        let mut records: Vec<_> = (0..5).map(|i| banded(i * 2, 20.0, 0.0)).collect();
        records[2].header_height = 26.0;

        GroupNormalizer::normalize_group(&mut records, Parity::Even, &band_options());

        assert_eq!(records[2].selected, BoxVariant::Full);
        assert_eq!(records[2].bounding_box, records[2].variants.full);
        assert_eq!(records[0].selected, BoxVariant::NoHeader);
    }

    #[test]
    fn test_page_within_one_point_matches() {
        let mut records: Vec<_> = (0..5).map(|i| banded(i * 2, 20.0, 0.0)).collect();
        records[2].header_height = 20.8;

        GroupNormalizer::normalize_group(&mut records, Parity::Even, &band_options());
        assert!(records.iter().all(|r| r.selected == BoxVariant::NoHeader));
    }

    #[test]
    fn test_scattered_detections_ignored() {
        // Band heights all over the place: no recurring header
        let heights = [5.0, 40.0, 12.0, 28.0, 33.0, 2.0];
        let mut records: Vec<_> = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| banded(i * 2, h, 0.0))
            .collect();

        let summary = GroupNormalizer::normalize_group(&mut records, Parity::Even, &band_options());

        assert!(!summary.has_header);
        assert_eq!(summary.substituted, 0);
        assert!(records.iter().all(|r| r.selected == BoxVariant::Full));
    }

    #[test]
    fn test_pages_without_band_keep_full_box() {
        let mut records: Vec<_> = (0..4).map(|i| banded(i * 2, 20.0, 0.0)).collect();
        records[1].header_height = 0.0;

        GroupNormalizer::normalize_group(&mut records, Parity::Even, &band_options());

        assert_eq!(records[1].selected, BoxVariant::Full);
        assert_eq!(records[0].selected, BoxVariant::NoHeader);
    }
}
