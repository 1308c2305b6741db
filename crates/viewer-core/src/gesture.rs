//! Pinch recognition from raw multi-touch point sets.
//!
//! The recognizer is a two-state machine. It goes Active when at least two
//! touch points are down and the first two are far enough apart, tracks those
//! two ids while active, and returns to Idle when fewer than two points remain
//! or the gesture is cancelled. No velocity survives a gesture.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error::{InvalidInput, ViewerResult};
use crate::viewport::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub const fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Zoom increment produced by a pinch, in the same step vocabulary as the wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchZoom {
    pub steps: f64,
    pub centroid: Point,
}

/// What one touch update produced. Both fields are empty most of the time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureUpdate {
    pub zoom: Option<PinchZoom>,
    /// Vertical pan in layout units; positive moves towards the document end.
    pub pan: Option<f64>,
}

impl GestureUpdate {
    pub fn is_empty(&self) -> bool {
        self.zoom.is_none() && self.pan.is_none()
    }
}

/// Data of an active pinch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub tracked_ids: (u64, u64),
    pub initial_distance: f64,
    pub initial_centroid: Point,
    pub last_scale_ratio: f64,
    pub last_centroid: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Active(GestureState),
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: ViewerConfig,
    phase: Phase,
}

impl GestureRecognizer {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config, phase: Phase::Idle }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    pub fn state(&self) -> Option<&GestureState> {
        match &self.phase {
            Phase::Active(state) => Some(state),
            Phase::Idle => None,
        }
    }

    /// Ends the current gesture, e.g. when the window loses focus.
    pub fn cancel(&mut self) {
        if self.is_active() {
            tracing::debug!("pinch cancelled");
        }
        self.phase = Phase::Idle;
    }

    /// Feeds the full set of touch points currently down.
    ///
    /// Malformed sets (duplicate ids, non-finite coordinates) are rejected
    /// without touching the recognizer state.
    pub fn update(&mut self, points: &[TouchPoint]) -> ViewerResult<GestureUpdate> {
        validate_points(points)?;

        if points.len() < 2 {
            if self.is_active() {
                tracing::trace!("pinch ended");
            }
            self.phase = Phase::Idle;
            return Ok(GestureUpdate::default());
        }

        let Phase::Active(state) = self.phase else {
            self.phase = self.begin(points);
            return Ok(GestureUpdate::default());
        };

        let (first_id, second_id) = state.tracked_ids;
        let (Some(first), Some(second)) = (find(points, first_id), find(points, second_id)) else {
            // A tracked finger lifted while others remain: restart on the new pair.
            self.phase = self.begin(points);
            return Ok(GestureUpdate::default());
        };

        let (update, next) = self.track(state, first.position(), second.position());
        self.phase = Phase::Active(next);

        Ok(update)
    }

    fn begin(&self, points: &[TouchPoint]) -> Phase {
        let (first, second) = (points[0].position(), points[1].position());
        let initial_distance = first.distance(second);

        if initial_distance < self.config.min_pinch_distance {
            tracing::debug!(initial_distance, "ignoring pinch with coincident touch points");
            return Phase::Idle;
        }

        let centroid = first.midpoint(second);
        tracing::trace!(initial_distance, "pinch started");

        Phase::Active(GestureState {
            tracked_ids: (points[0].id, points[1].id),
            initial_distance,
            initial_centroid: centroid,
            last_scale_ratio: 1.0,
            last_centroid: centroid,
        })
    }

    fn track(
        &self,
        mut state: GestureState,
        first: Point,
        second: Point,
    ) -> (GestureUpdate, GestureState) {
        let mut update = GestureUpdate::default();
        let distance = first.distance(second);
        let centroid = first.midpoint(second);

        if self.config.pinch_pan {
            let pan = state.last_centroid.y - centroid.y;
            if pan != 0.0 {
                update.pan = Some(pan);
            }
        }
        state.last_centroid = centroid;

        if distance < self.config.min_pinch_distance {
            return (update, state);
        }

        let scale_ratio = distance / state.initial_distance;
        let relative = scale_ratio / state.last_scale_ratio;

        if (relative - 1.0).abs() > self.config.pinch_noise_ratio {
            let steps = self.config.steps_for_ratio(relative);
            update.zoom = Some(PinchZoom { steps, centroid });
            state.last_scale_ratio = scale_ratio;
        }

        (update, state)
    }
}

fn find(points: &[TouchPoint], id: u64) -> Option<&TouchPoint> {
    points.iter().find(|point| point.id == id)
}

fn validate_points(points: &[TouchPoint]) -> ViewerResult<()> {
    let mut seen = HashSet::with_capacity(points.len());

    for point in points {
        if !point.position().is_finite() {
            return Err(InvalidInput::NonFinite("touch point").into());
        }
        if !seen.insert(point.id) {
            return Err(InvalidInput::DuplicateTouchId(point.id).into());
        }
    }

    Ok(())
}
