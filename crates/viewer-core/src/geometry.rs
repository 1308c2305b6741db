//! Page geometry: document page sizes and their continuous layout at a zoom.
//!
//! Pages are stacked vertically with no gaps. The layout for a zoom factor is
//! a pure function of the document and is only rebuilt when the zoom changes.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidInput, ViewerResult};

/// Natural page size in device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Immutable, ordered page list of a loaded document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pages: Vec<PageSize>,
}

impl Document {
    pub fn new(pages: Vec<PageSize>) -> ViewerResult<Self> {
        if let Some((index, page)) = pages.iter().enumerate().find(|(_, page)| !page.is_valid()) {
            let (width, height) = (page.width, page.height);
            return Err(InvalidInput::PageSize { index, width, height }.into());
        }

        Ok(Self { pages })
    }

    /// A document of `page_count` identical pages.
    pub fn uniform(page_count: usize, size: PageSize) -> ViewerResult<Self> {
        Self::new(vec![size; page_count])
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, index: usize) -> Option<PageSize> {
        self.pages.get(index).copied()
    }

    pub fn pages(&self) -> &[PageSize] {
        &self.pages
    }
}

/// A position in document space: a page and a distance from its top edge in
/// natural units. Independent of zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentPoint {
    pub page_index: usize,
    pub y: f64,
}

/// Continuous layout of every page at one zoom factor.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    zoom_factor: f64,
    page_tops: Vec<f64>,
    page_heights: Vec<f64>,
    page_widths: Vec<f64>,
    total_height: f64,
}

impl LayoutState {
    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn page_count(&self) -> usize {
        self.page_tops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_tops.is_empty()
    }

    pub fn total_height(&self) -> f64 {
        self.total_height
    }

    /// Widest laid-out page.
    pub fn content_width(&self) -> f64 {
        self.page_widths.iter().copied().fold(0.0, f64::max)
    }

    pub fn top_offset(&self, page_index: usize) -> Option<f64> {
        self.page_tops.get(page_index).copied()
    }

    pub fn page_height(&self, page_index: usize) -> Option<f64> {
        self.page_heights.get(page_index).copied()
    }

    pub fn page_width(&self, page_index: usize) -> Option<f64> {
        self.page_widths.get(page_index).copied()
    }

    pub fn last_page(&self) -> Option<usize> {
        self.page_count().checked_sub(1)
    }

    /// Page whose span contains `offset`, clamped to the first and last page.
    ///
    /// Returns `None` only for an empty document.
    pub fn page_at(&self, offset: f64) -> Option<usize> {
        let last = self.last_page()?;
        let after = self.page_tops.partition_point(|top| *top <= offset);
        Some(after.saturating_sub(1).min(last))
    }

    /// Largest valid scroll offset; content shorter than the viewport does not scroll.
    pub fn max_scroll(&self, viewport_height: f64) -> f64 {
        (self.total_height - viewport_height).max(0.0)
    }

    pub fn clamp_offset(&self, offset: f64, viewport_height: f64) -> f64 {
        offset.clamp(0.0, self.max_scroll(viewport_height))
    }

    /// Pages whose span intersects `[offset, offset + viewport_height)`.
    pub fn visible_pages(
        &self,
        offset: f64,
        viewport_height: f64,
    ) -> Option<RangeInclusive<usize>> {
        let start = self.page_at(offset)?;
        let bottom = offset + viewport_height.max(0.0);
        let end = self.page_tops.partition_point(|top| *top < bottom).saturating_sub(1);

        Some(start..=end.max(start))
    }

    /// Document point that sits at layout `offset`.
    pub fn document_point(&self, offset: f64) -> Option<DocumentPoint> {
        let page_index = self.page_at(offset)?;
        let top = self.page_tops[page_index];

        Some(DocumentPoint { page_index, y: (offset - top) / self.zoom_factor })
    }

    /// Layout offset of a document point at this zoom.
    pub fn offset_of(&self, point: DocumentPoint) -> f64 {
        match self.last_page() {
            Some(last) => self.page_tops[point.page_index.min(last)] + point.y * self.zoom_factor,
            None => 0.0,
        }
    }
}

/// Owns the document for layout purposes and derives [`LayoutState`]s from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageGeometry {
    document: Document,
}

impl PageGeometry {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn layout(&self, zoom_factor: f64) -> LayoutState {
        let page_count = self.document.page_count();
        let mut page_tops = Vec::with_capacity(page_count);
        let mut page_heights = Vec::with_capacity(page_count);
        let mut page_widths = Vec::with_capacity(page_count);
        let mut cursor = 0.0;

        for page in self.document.pages() {
            let height = page.height * zoom_factor;

            page_tops.push(cursor);
            page_heights.push(height);
            page_widths.push(page.width * zoom_factor);

            cursor += height;
        }

        LayoutState { zoom_factor, page_tops, page_heights, page_widths, total_height: cursor }
    }

    pub fn max_scroll(&self, zoom_factor: f64, viewport_height: f64) -> f64 {
        let total: f64 = self.document.pages().iter().map(|page| page.height * zoom_factor).sum();
        (total - viewport_height).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_pages() -> PageGeometry {
        PageGeometry::new(
            Document::uniform(10, PageSize::new(1200.0, 1000.0)).expect("valid pages"),
        )
    }

    #[test]
    fn layout_has_no_gaps_and_starts_at_zero() {
        let geometry = PageGeometry::new(
            Document::new(vec![
                PageSize::new(600.0, 800.0),
                PageSize::new(600.0, 400.0),
                PageSize::new(800.0, 600.0),
            ])
            .expect("valid pages"),
        );
        let layout = geometry.layout(2.0);

        assert_eq!(layout.top_offset(0), Some(0.0));
        assert_eq!(layout.top_offset(1), Some(1600.0));
        assert_eq!(layout.top_offset(2), Some(2400.0));
        assert_eq!(layout.total_height(), 3600.0);
        assert_eq!(layout.content_width(), 1600.0);

        for index in 1..layout.page_count() {
            let previous_end =
                layout.top_offset(index - 1).unwrap() + layout.page_height(index - 1).unwrap();
            assert_eq!(layout.top_offset(index), Some(previous_end));
        }
    }

    #[test]
    fn page_at_uses_page_spans_and_clamps() {
        let layout = ten_pages().layout(1.0);

        assert_eq!(layout.page_at(0.0), Some(0));
        assert_eq!(layout.page_at(999.9), Some(0));
        assert_eq!(layout.page_at(1000.0), Some(1));
        assert_eq!(layout.page_at(5400.0), Some(5));
        assert_eq!(layout.page_at(-20.0), Some(0));
        assert_eq!(layout.page_at(50_000.0), Some(9));
    }

    #[test]
    fn empty_document_has_no_page_and_no_scroll() {
        let geometry = PageGeometry::default();
        let layout = geometry.layout(1.0);

        assert_eq!(layout.page_at(0.0), None);
        assert_eq!(layout.visible_pages(0.0, 800.0), None);
        assert_eq!(layout.max_scroll(800.0), 0.0);
        assert_eq!(geometry.max_scroll(1.0, 800.0), 0.0);
    }

    #[test]
    fn max_scroll_floors_at_zero_for_short_content() {
        let geometry =
            PageGeometry::new(
                Document::uniform(1, PageSize::new(100.0, 300.0)).expect("valid pages"),
            );

        assert_eq!(geometry.layout(1.0).max_scroll(800.0), 0.0);
        assert_eq!(geometry.max_scroll(4.0, 800.0), 400.0);
    }

    #[test]
    fn max_scroll_matches_layout() {
        let geometry = ten_pages();
        assert_eq!(geometry.max_scroll(1.21, 800.0), geometry.layout(1.21).max_scroll(800.0));
        assert_eq!(geometry.max_scroll(1.0, 800.0), 9200.0);
    }

    #[test]
    fn visible_range_tracks_scroll_window() {
        let layout = ten_pages().layout(1.0);

        assert_eq!(layout.visible_pages(0.0, 800.0), Some(0..=0));
        assert_eq!(layout.visible_pages(500.0, 800.0), Some(0..=1));
        assert_eq!(layout.visible_pages(1000.0, 1000.0), Some(1..=1));
        assert_eq!(layout.visible_pages(9200.0, 800.0), Some(9..=9));
    }

    #[test]
    fn document_point_round_trips_across_zoom() {
        let geometry = ten_pages();
        let before = geometry.layout(1.0);
        let point = before.document_point(5400.0).expect("page under offset");

        assert_eq!(point, DocumentPoint { page_index: 5, y: 400.0 });

        let after = geometry.layout(1.21);
        assert!((after.offset_of(point) - 5400.0 * 1.21).abs() < 1e-9);
    }

    #[test]
    fn invalid_page_sizes_are_rejected() {
        assert!(Document::new(vec![PageSize::new(100.0, 0.0)]).is_err());
        assert!(Document::new(vec![PageSize::new(f64::NAN, 10.0)]).is_err());
        assert!(Document::new(Vec::new()).is_ok());
    }
}
