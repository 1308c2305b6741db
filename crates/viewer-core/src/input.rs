//! Raw input events and their translation into viewport update requests.
//!
//! - Mouse wheel scrolls; with Ctrl or Cmd held it zooms around the cursor
//! - Two-finger touch sequences go through the pinch recognizer
//! - Keyboard shortcuts cover scrolling, page jumps and zoom steps
//! - Toolbar commands carry absolute targets (page index, zoom factor)

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::coordinator::UpdateRequest;
use crate::error::ViewerResult;
use crate::gesture::{GestureRecognizer, TouchPoint};
use crate::viewport::{Point, ViewportSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { ctrl: false, meta: false, shift: false, alt: false };
    pub const CTRL: Self = Self { ctrl: true, meta: false, shift: false, alt: false };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn is_zoom(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Wheel movement in notches; positive values roll away from the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub delta: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Cursor position; zoom anchors at the viewport centre when absent.
    #[serde(default)]
    pub position: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub points: Vec<TouchPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Plus,
    Minus,
    Zero,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel(WheelEvent),
    Touch(TouchEvent),
    Key(KeyEvent),
    FocusLost,
    GotoPageRequested { index: usize },
    SetZoomRequested { factor: f64 },
    Resized { width: f64, height: f64 },
}

/// Tags raw events and forwards normalized deltas.
#[derive(Debug, Clone)]
pub struct InputRouter {
    config: ViewerConfig,
    gestures: GestureRecognizer,
}

impl InputRouter {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config, gestures: GestureRecognizer::new(config) }
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    /// Drops any in-flight pinch, e.g. when the document is replaced.
    pub fn reset(&mut self) {
        self.gestures.cancel();
    }

    pub fn route(&mut self, event: &InputEvent) -> ViewerResult<Vec<UpdateRequest>> {
        let requests = match event {
            InputEvent::Wheel(wheel) => vec![self.route_wheel(wheel)],
            InputEvent::Touch(touch) => self.route_touch(&touch.points)?,
            InputEvent::Key(key) => self.route_key(key).into_iter().collect(),
            InputEvent::FocusLost => {
                self.gestures.cancel();
                Vec::new()
            }
            InputEvent::GotoPageRequested { index } => {
                vec![UpdateRequest::GotoPage { index: *index }]
            }
            InputEvent::SetZoomRequested { factor } => {
                vec![UpdateRequest::SetZoom { factor: *factor, focal: None }]
            }
            InputEvent::Resized { width, height } => {
                vec![UpdateRequest::Resize { size: ViewportSize::new(*width, *height) }]
            }
        };

        Ok(requests)
    }

    fn route_wheel(&self, wheel: &WheelEvent) -> UpdateRequest {
        if wheel.modifiers.is_zoom() {
            UpdateRequest::Zoom { steps: wheel.delta, focal: wheel.position }
        } else {
            // Rolling away from the user moves the content towards the top.
            UpdateRequest::Scroll { delta: -wheel.delta }
        }
    }

    fn route_touch(&mut self, points: &[TouchPoint]) -> ViewerResult<Vec<UpdateRequest>> {
        let update = self.gestures.update(points)?;
        let mut requests = Vec::with_capacity(2);

        if let Some(zoom) = update.zoom {
            requests.push(UpdateRequest::Zoom { steps: zoom.steps, focal: Some(zoom.centroid) });
        }
        if let Some(pan) = update.pan {
            requests.push(UpdateRequest::Scroll { delta: pan / self.config.scroll_threshold });
        }

        Ok(requests)
    }

    fn route_key(&self, event: &KeyEvent) -> Option<UpdateRequest> {
        let request = match event.key {
            Key::Up => UpdateRequest::Scroll { delta: -1.0 },
            Key::Down => UpdateRequest::Scroll { delta: 1.0 },
            Key::PageUp => UpdateRequest::PreviousPage,
            Key::PageDown => UpdateRequest::NextPage,
            Key::Home => UpdateRequest::FirstPage,
            Key::End => UpdateRequest::LastPage,
            Key::Plus => UpdateRequest::Zoom { steps: 1.0, focal: None },
            Key::Minus => UpdateRequest::Zoom { steps: -1.0, focal: None },
            Key::Zero if event.modifiers.is_zoom() => {
                UpdateRequest::SetZoom { factor: self.config.default_zoom, focal: None }
            }
            Key::Zero | Key::Other => return None,
        };

        Some(request)
    }
}
