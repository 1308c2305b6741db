//! Anchor-preserving zoom.
//!
//! Zoom deltas are expressed in steps: one step multiplies the zoom factor by
//! [`ViewerConfig::zoom_step_base`], so wheel notches, key presses and pinch
//! increments compose multiplicatively. The document point under the focal
//! point stays under it after the relayout unless the scroll bounds intervene.

use crate::config::ViewerConfig;
use crate::error::{ensure_finite, InvalidInput, ViewerError, ViewerResult};
use crate::geometry::{LayoutState, PageGeometry};
use crate::viewport::{Point, ViewportState};

/// Result of a zoom request.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomOutcome {
    pub viewport: ViewportState,
    /// Layout at the new zoom; `None` when the zoom factor did not change.
    pub layout: Option<LayoutState>,
}

impl ZoomOutcome {
    fn unchanged(viewport: &ViewportState) -> Self {
        Self { viewport: *viewport, layout: None }
    }

    pub fn is_unchanged(&self) -> bool {
        self.layout.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    config: ViewerConfig,
}

impl ZoomController {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Zooms by `delta` steps around `focal` (viewport centre when `None`).
    ///
    /// `layout` should be the layout of `current.zoom_factor`; a mismatched one
    /// is rebuilt before the anchor is taken. A zero delta, or a
    /// delta that cannot move the zoom past a bound it already sits on, returns
    /// the viewport unchanged.
    pub fn apply_zoom_delta(
        &self,
        geometry: &PageGeometry,
        layout: &LayoutState,
        current: &ViewportState,
        delta: f64,
        focal: Option<Point>,
    ) -> ViewerResult<ZoomOutcome> {
        ensure_finite(delta, "zoom delta")?;
        let focal = self.resolve_focal(current, focal)?;

        if delta == 0.0 {
            return Ok(ZoomOutcome::unchanged(current));
        }

        let new_zoom = self.config.clamp_zoom(current.zoom_factor * self.config.step_factor(delta));
        Ok(self.zoom_to(geometry, layout, current, new_zoom, focal))
    }

    /// Sets an absolute zoom factor around `focal` (viewport centre when `None`).
    ///
    /// Targets outside the configured bounds are rejected rather than clamped.
    pub fn set_zoom(
        &self,
        geometry: &PageGeometry,
        layout: &LayoutState,
        current: &ViewportState,
        factor: f64,
        focal: Option<Point>,
    ) -> ViewerResult<ZoomOutcome> {
        ensure_finite(factor, "zoom factor")?;
        if factor <= 0.0 {
            return Err(InvalidInput::NonPositiveZoom(factor).into());
        }

        if !(self.config.min_zoom..=self.config.max_zoom).contains(&factor) {
            return Err(ViewerError::ZoomOutOfRange {
                requested: factor,
                min: self.config.min_zoom,
                max: self.config.max_zoom,
            });
        }

        let focal = self.resolve_focal(current, focal)?;
        Ok(self.zoom_to(geometry, layout, current, factor, focal))
    }

    fn resolve_focal(&self, current: &ViewportState, focal: Option<Point>) -> ViewerResult<Point> {
        match focal {
            Some(point) if !point.is_finite() => Err(InvalidInput::NonFinite("focal point").into()),
            Some(point) => Ok(current.clamp_point(point)),
            None => Ok(current.center()),
        }
    }

    fn zoom_to(
        &self,
        geometry: &PageGeometry,
        layout: &LayoutState,
        current: &ViewportState,
        new_zoom: f64,
        focal: Point,
    ) -> ZoomOutcome {
        if new_zoom == current.zoom_factor {
            return ZoomOutcome::unchanged(current);
        }

        let rebuilt;
        let layout = if layout.zoom_factor() == current.zoom_factor {
            layout
        } else {
            rebuilt = geometry.layout(current.zoom_factor);
            &rebuilt
        };

        let anchor = layout.document_point(current.scroll_offset + focal.y);
        let relayout = geometry.layout(new_zoom);
        let target = anchor.map_or(0.0, |point| relayout.offset_of(point) - focal.y);
        let viewport = current.scrolled_to(target, &relayout);

        ZoomOutcome { viewport, layout: Some(relayout) }
    }
}
