use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidInput, ViewerResult};
use crate::geometry::LayoutState;

/// Screen-space coordinate relative to the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Size of the visible area in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn validate(self) -> ViewerResult<Self> {
        let valid = |value: f64| value.is_finite() && value > 0.0;

        if valid(self.width) && valid(self.height) {
            Ok(self)
        } else {
            Err(InvalidInput::ViewportSize { width: self.width, height: self.height }.into())
        }
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self { width: 1280.0, height: 800.0 }
    }
}

/// The authoritative view triple plus the viewport size it was computed for.
///
/// Invariants kept by every controller: `scroll_offset` lies in
/// `[0, max_scroll]`, `zoom_factor` lies in the configured bounds, and
/// `current_page` equals `page_at(scroll_offset)` for the layout at
/// `zoom_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub scroll_offset: f64,
    pub zoom_factor: f64,
    pub current_page: Option<usize>,
    pub size: ViewportSize,
}

impl ViewportState {
    /// State of a freshly loaded document: top of the first page.
    pub fn initial(layout: &LayoutState, size: ViewportSize) -> Self {
        Self {
            scroll_offset: 0.0,
            zoom_factor: layout.zoom_factor(),
            current_page: layout.page_at(0.0),
            size,
        }
    }

    /// State reported while no document is open.
    pub fn empty(zoom_factor: f64, size: ViewportSize) -> Self {
        Self { scroll_offset: 0.0, zoom_factor, current_page: None, size }
    }

    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Clamps a screen point into the viewport rectangle.
    pub fn clamp_point(&self, point: Point) -> Point {
        Point::new(point.x.clamp(0.0, self.size.width), point.y.clamp(0.0, self.size.height))
    }

    /// Copy of `self` moved to `offset`, with the offset clamped and the
    /// current page rederived from `layout`.
    pub fn scrolled_to(&self, offset: f64, layout: &LayoutState) -> Self {
        let scroll_offset = layout.clamp_offset(offset, self.size.height);

        Self {
            scroll_offset,
            zoom_factor: layout.zoom_factor(),
            current_page: layout.page_at(scroll_offset),
            size: self.size,
        }
    }

    pub fn visible_pages(&self, layout: &LayoutState) -> Option<RangeInclusive<usize>> {
        layout.visible_pages(self.scroll_offset, self.size.height)
    }
}
