//! View-state coordination core for a continuous document viewer.
//!
//! Reconciles continuous scroll position, zoom factor and page boundaries into
//! one viewport, merging wheel, keyboard and pinch input without jumps or
//! feedback loops. Rasterization, windows and file dialogs live outside.
//!
//! # Example
//!
//! ```
//! use viewer_core::{
//!     Document, PageSize, Point, UpdateOutcome, UpdateRequest, ViewerConfig, ViewportCoordinator,
//!     ViewportSize,
//! };
//!
//! let mut coordinator =
//!     ViewportCoordinator::new(ViewerConfig::default(), ViewportSize::new(1000.0, 800.0))
//!         .unwrap();
//! coordinator.load_document(Document::uniform(10, PageSize::new(1200.0, 1000.0)).unwrap());
//!
//! coordinator.request_update(UpdateRequest::GotoPage { index: 5 }).unwrap();
//! let outcome = coordinator
//!     .request_update(UpdateRequest::Zoom { steps: 2.0, focal: Some(Point::new(400.0, 400.0)) })
//!     .unwrap();
//!
//! if let UpdateOutcome::Changed(changed) = outcome {
//!     assert_eq!(changed.current_page, Some(5));
//!     assert!((changed.zoom_factor - 1.21).abs() < 1e-9);
//! }
//! ```

mod config;
mod coordinator;
mod error;
mod geometry;
mod gesture;
mod input;
mod render;
mod scroll;
mod viewport;
mod zoom;

// Re-export public API
pub use config::{
    ViewerConfig, DEFAULT_ZOOM, MAX_ZOOM, MIN_PINCH_DISTANCE, MIN_ZOOM, PINCH_NOISE_RATIO,
    PREFETCH_RADIUS, SCROLL_THRESHOLD, ZOOM_STEP_BASE,
};
pub use coordinator::{
    LoadTicket, Notification, PageRange, UpdateOutcome, UpdateRequest, ViewportChanged,
    ViewportCoordinator,
};
pub use error::{ErrorKind, InvalidInput, ViewerError, ViewerResult};
pub use geometry::{Document, DocumentPoint, LayoutState, PageGeometry, PageSize};
pub use gesture::{GestureRecognizer, GestureState, GestureUpdate, PinchZoom, TouchPoint};
pub use input::{InputEvent, InputRouter, Key, KeyEvent, Modifiers, TouchEvent, WheelEvent};
pub use render::{
    prefetch_page_indices, PageRenderer, RenderPriority, RenderQueue, RenderRequest,
    RenderResponse, RenderedPage,
};
pub use scroll::ScrollController;
pub use viewport::{Point, ViewportSize, ViewportState};
pub use zoom::{ZoomController, ZoomOutcome};
