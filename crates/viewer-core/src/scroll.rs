//! Continuous scrolling and page jumps.

use crate::config::ViewerConfig;
use crate::error::{ensure_finite, ViewerError, ViewerResult};
use crate::geometry::LayoutState;
use crate::viewport::ViewportState;

#[derive(Debug, Clone)]
pub struct ScrollController {
    config: ViewerConfig,
}

impl ScrollController {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Moves the offset by `delta * scroll_threshold`, clamped to the content.
    ///
    /// Positive deltas move towards the end of the document.
    pub fn apply_scroll_delta(
        &self,
        current: &ViewportState,
        layout: &LayoutState,
        delta: f64,
    ) -> ViewerResult<ViewportState> {
        ensure_finite(delta, "scroll delta")?;

        if delta == 0.0 {
            return Ok(*current);
        }

        let target = current.scroll_offset + delta * self.config.scroll_threshold;
        Ok(current.scrolled_to(target, layout))
    }

    /// Moves the top of page `index` to the top of the viewport, as far as
    /// the scroll bounds allow.
    pub fn goto_page(
        &self,
        current: &ViewportState,
        layout: &LayoutState,
        index: usize,
    ) -> ViewerResult<ViewportState> {
        ensure_pages(layout)?;
        let top = layout
            .top_offset(index)
            .ok_or(ViewerError::PageOutOfRange { index, page_count: layout.page_count() })?;

        Ok(current.scrolled_to(top, layout))
    }

    pub fn next_page(
        &self,
        current: &ViewportState,
        layout: &LayoutState,
    ) -> ViewerResult<ViewportState> {
        ensure_pages(layout)?;
        let page = current.current_page.ok_or(ViewerError::AtLastPage)?;
        let at_bottom = current.scroll_offset >= layout.max_scroll(current.size.height);

        if at_bottom || Some(page) >= layout.last_page() {
            return Err(ViewerError::AtLastPage);
        }

        self.goto_page(current, layout, page + 1)
    }

    pub fn previous_page(
        &self,
        current: &ViewportState,
        layout: &LayoutState,
    ) -> ViewerResult<ViewportState> {
        ensure_pages(layout)?;
        match current.current_page {
            Some(page) if page > 0 => self.goto_page(current, layout, page - 1),
            _ => Err(ViewerError::AtFirstPage),
        }
    }

    pub fn first_page(
        &self,
        current: &ViewportState,
        layout: &LayoutState,
    ) -> ViewerResult<ViewportState> {
        self.goto_page(current, layout, 0)
    }

    pub fn last_page(
        &self,
        current: &ViewportState,
        layout: &LayoutState,
    ) -> ViewerResult<ViewportState> {
        let last = layout.last_page().ok_or(ViewerError::NoPages)?;
        self.goto_page(current, layout, last)
    }
}

/// Page navigation has nowhere to go in a document without pages.
fn ensure_pages(layout: &LayoutState) -> ViewerResult<()> {
    if layout.is_empty() {
        Err(ViewerError::NoPages)
    } else {
        Ok(())
    }
}
