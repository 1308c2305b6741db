//! Tunable constants for the coordination core.
//!
//! The core has no configuration files; every knob is a constant collected
//! into [`ViewerConfig`] so tests and shells can override individual values.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidInput, ViewerError, ViewerResult};

/// Smallest zoom factor a viewport may reach.
pub const MIN_ZOOM: f64 = 0.5;

/// Largest zoom factor a viewport may reach.
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom factor of a freshly loaded document.
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Multiplier applied per zoom step (wheel notch, key press, pinch step).
pub const ZOOM_STEP_BASE: f64 = 1.1;

/// Layout units scrolled per unit of wheel delta.
pub const SCROLL_THRESHOLD: f64 = 100.0;

/// Pinches starting with fingers closer than this are ignored.
pub const MIN_PINCH_DISTANCE: f64 = 10.0;

/// Relative scale change a pinch must accumulate before a zoom step is emitted.
pub const PINCH_NOISE_RATIO: f64 = 0.02;

/// Pages on each side of the visible range to request ahead of time.
///
/// Zero keeps render requests to the visible range only.
pub const PREFETCH_RADIUS: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub default_zoom: f64,
    pub zoom_step_base: f64,
    /// Scroll sensitivity: layout units per unit of wheel delta.
    pub scroll_threshold: f64,
    pub min_pinch_distance: f64,
    pub pinch_noise_ratio: f64,
    /// Emit pan deltas from centroid movement during an active pinch.
    ///
    /// Off by default: zoom has priority over simultaneous pan.
    pub pinch_pan: bool,
    pub prefetch_radius: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            default_zoom: DEFAULT_ZOOM,
            zoom_step_base: ZOOM_STEP_BASE,
            scroll_threshold: SCROLL_THRESHOLD,
            min_pinch_distance: MIN_PINCH_DISTANCE,
            pinch_noise_ratio: PINCH_NOISE_RATIO,
            pinch_pan: false,
            prefetch_radius: PREFETCH_RADIUS,
        }
    }
}

impl ViewerConfig {
    /// Checks that the zoom bounds are ordered and every constant is usable.
    pub fn validate(&self) -> ViewerResult<()> {
        let finite_positive = |value: f64| value.is_finite() && value > 0.0;

        if !finite_positive(self.min_zoom)
            || !finite_positive(self.max_zoom)
            || self.min_zoom > self.max_zoom
        {
            return Err(invalid(format!(
                "zoom bounds {}..={} are not a valid range",
                self.min_zoom, self.max_zoom
            )));
        }

        if !(self.min_zoom..=self.max_zoom).contains(&self.default_zoom) {
            return Err(invalid(format!(
                "default zoom {} lies outside {}..={}",
                self.default_zoom, self.min_zoom, self.max_zoom
            )));
        }

        if !finite_positive(self.zoom_step_base) || self.zoom_step_base == 1.0 {
            let base = self.zoom_step_base;
            return Err(invalid(format!("zoom step base {base} must be positive and not 1")));
        }

        if !finite_positive(self.scroll_threshold) {
            let threshold = self.scroll_threshold;
            return Err(invalid(format!("scroll threshold {threshold} must be positive")));
        }

        if !self.min_pinch_distance.is_finite() || self.min_pinch_distance < 0.0 {
            return Err(invalid(format!(
                "minimum pinch distance {} must be non-negative",
                self.min_pinch_distance
            )));
        }

        if !self.pinch_noise_ratio.is_finite() || self.pinch_noise_ratio < 0.0 {
            return Err(invalid(format!(
                "pinch noise ratio {} must be non-negative",
                self.pinch_noise_ratio
            )));
        }

        Ok(())
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Multiplicative factor for a (possibly fractional) number of zoom steps.
    pub fn step_factor(&self, steps: f64) -> f64 {
        self.zoom_step_base.powf(steps)
    }

    /// Inverse of [`step_factor`](Self::step_factor).
    pub fn steps_for_ratio(&self, ratio: f64) -> f64 {
        ratio.ln() / self.zoom_step_base.ln()
    }
}

fn invalid(message: String) -> ViewerError {
    ViewerError::InvalidInput(InvalidInput::Config(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let config = ViewerConfig { min_zoom: 4.0, max_zoom: 2.0, ..ViewerConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_zoom_must_be_inside_bounds() {
        let config = ViewerConfig { default_zoom: 0.1, ..ViewerConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn step_factor_and_ratio_are_inverse() {
        let config = ViewerConfig::default();
        let steps = config.steps_for_ratio(2.0);
        assert!((config.step_factor(steps) - 2.0).abs() < 1e-12);
        assert!((config.step_factor(2.0) - 1.21).abs() < 1e-12);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{"min_zoom": 0.1}"#).expect("valid json");
        assert_eq!(config.min_zoom, 0.1);
        assert_eq!(config.max_zoom, MAX_ZOOM);
    }
}
