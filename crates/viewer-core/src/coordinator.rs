//! The viewport coordinator: sole owner and mutator of the view state.
//!
//! Every change goes through [`ViewportCoordinator::request_update`]. The new
//! viewport and, for zoom changes, the new layout are computed by the pure
//! controllers first and committed together, so nobody observes a zoom factor
//! that disagrees with the layout. Queued requests are applied strictly in
//! arrival order.

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::geometry::{Document, LayoutState, PageGeometry};
use crate::input::{InputEvent, InputRouter};
use crate::render::{
    prefetch_page_indices, PageRenderer, RenderPriority, RenderQueue, RenderRequest,
    RenderResponse, RenderedPage,
};
use crate::scroll::ScrollController;
use crate::viewport::{Point, ViewportSize, ViewportState};
use crate::zoom::ZoomController;

/// A single state change request. Zoom focal points of `None` mean the
/// viewport centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateRequest {
    Scroll { delta: f64 },
    Zoom { steps: f64, focal: Option<Point> },
    SetZoom { factor: f64, focal: Option<Point> },
    GotoPage { index: usize },
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    Resize { size: ViewportSize },
}

/// Inclusive page index range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
}

impl PageRange {
    pub fn contains(&self, page_index: usize) -> bool {
        (self.first..=self.last).contains(&page_index)
    }
}

impl From<RangeInclusive<usize>> for PageRange {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self { first: *range.start(), last: *range.end() }
    }
}

/// Repaint notification for the UI shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportChanged {
    pub scroll_offset: f64,
    pub zoom_factor: f64,
    pub current_page: Option<usize>,
    pub page_count: usize,
    pub visible_pages: Option<PageRange>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    Changed(ViewportChanged),
    Unchanged,
}

/// What [`ViewportCoordinator::flush`] reports back to the UI shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    ViewportChanged(ViewportChanged),
    /// A rejected request the user should hear about.
    UserMessage { message: String },
}

/// Identifies one document load; superseded by the next load or a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
struct OpenDocument {
    geometry: PageGeometry,
    layout: LayoutState,
}

#[derive(Debug)]
pub struct ViewportCoordinator {
    config: ViewerConfig,
    zoom: ZoomController,
    scroll: ScrollController,
    router: InputRouter,
    document: Option<OpenDocument>,
    viewport: ViewportState,
    renders: RenderQueue,
    pending: VecDeque<UpdateRequest>,
    load_counter: u64,
}

impl ViewportCoordinator {
    pub fn new(config: ViewerConfig, size: ViewportSize) -> ViewerResult<Self> {
        config.validate()?;
        let size = size.validate()?;

        Ok(Self {
            config,
            zoom: ZoomController::new(config),
            scroll: ScrollController::new(config),
            router: InputRouter::new(config),
            document: None,
            viewport: ViewportState::empty(config.default_zoom, size),
            renders: RenderQueue::new(),
            pending: VecDeque::new(),
            load_counter: 0,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn layout(&self) -> Option<&LayoutState> {
        self.document.as_ref().map(|document| &document.layout)
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref().map(|document| document.geometry.document())
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn visible_pages(&self) -> Option<RangeInclusive<usize>> {
        self.layout().and_then(|layout| self.viewport.visible_pages(layout))
    }

    /// Starts a document load; any earlier unfinished load becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_counter += 1;
        LoadTicket(self.load_counter)
    }

    /// Installs the document produced by the load identified by `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        document: Document,
    ) -> ViewerResult<ViewportChanged> {
        if ticket.0 != self.load_counter {
            tracing::debug!(
                ticket = ticket.0,
                current = self.load_counter,
                "dropping stale document load"
            );
            return Err(ViewerError::StaleLoad { ticket: ticket.0 });
        }

        Ok(self.install(document))
    }

    /// Loads a document synchronously, replacing the current one.
    pub fn load_document(&mut self, document: Document) -> ViewportChanged {
        let _ = self.begin_load();
        self.install(document)
    }

    /// Closes the current document and cancels any load in flight.
    pub fn close_document(&mut self) {
        self.load_counter += 1;

        if self.document.take().is_some() {
            tracing::info!("document closed");
        }

        self.reset_transient_state();
        self.viewport = ViewportState::empty(self.config.default_zoom, self.viewport.size);
    }

    fn install(&mut self, document: Document) -> ViewportChanged {
        let geometry = PageGeometry::new(document);
        let layout = geometry.layout(self.config.default_zoom);

        tracing::info!(
            page_count = geometry.page_count(),
            total_height = layout.total_height(),
            "document loaded"
        );

        self.reset_transient_state();
        self.viewport = ViewportState::initial(&layout, self.viewport.size);
        self.document = Some(OpenDocument { geometry, layout });
        self.schedule_renders();
        self.notification()
    }

    fn reset_transient_state(&mut self) {
        self.router.reset();
        self.pending.clear();
        self.renders.begin_generation(self.config.default_zoom);
    }

    /// Applies one request to the current state.
    ///
    /// Errors leave the state untouched. With no document open every request
    /// is a no-op, except that a resize still records the new viewport size.
    pub fn request_update(&mut self, request: UpdateRequest) -> ViewerResult<UpdateOutcome> {
        let Some(document) = &self.document else {
            if let UpdateRequest::Resize { size } = request {
                self.viewport.size = size.validate()?;
            }
            return Ok(UpdateOutcome::Unchanged);
        };

        let (viewport, layout) = self.compute(document, request)?;

        if layout.is_none() && viewport == self.viewport {
            return Ok(UpdateOutcome::Unchanged);
        }

        if let Some(layout) = layout {
            self.renders.begin_generation(layout.zoom_factor());
            if let Some(document) = self.document.as_mut() {
                document.layout = layout;
            }
        }
        self.viewport = viewport;

        tracing::trace!(
            ?request,
            scroll_offset = viewport.scroll_offset,
            zoom_factor = viewport.zoom_factor,
            "viewport updated"
        );

        self.schedule_renders();
        Ok(UpdateOutcome::Changed(self.notification()))
    }

    fn compute(
        &self,
        document: &OpenDocument,
        request: UpdateRequest,
    ) -> ViewerResult<(ViewportState, Option<LayoutState>)> {
        let (geometry, layout, current) = (&document.geometry, &document.layout, &self.viewport);

        let viewport = match request {
            UpdateRequest::Scroll { delta } => {
                self.scroll.apply_scroll_delta(current, layout, delta)?
            }
            UpdateRequest::Zoom { steps, focal } => {
                let outcome = self.zoom.apply_zoom_delta(geometry, layout, current, steps, focal)?;
                return Ok((outcome.viewport, outcome.layout));
            }
            UpdateRequest::SetZoom { factor, focal } => {
                let outcome = self.zoom.set_zoom(geometry, layout, current, factor, focal)?;
                return Ok((outcome.viewport, outcome.layout));
            }
            UpdateRequest::GotoPage { index } => self.scroll.goto_page(current, layout, index)?,
            UpdateRequest::NextPage => self.scroll.next_page(current, layout)?,
            UpdateRequest::PreviousPage => self.scroll.previous_page(current, layout)?,
            UpdateRequest::FirstPage => self.scroll.first_page(current, layout)?,
            UpdateRequest::LastPage => self.scroll.last_page(current, layout)?,
            UpdateRequest::Resize { size } => {
                let resized = ViewportState { size: size.validate()?, ..*current };
                resized.scrolled_to(current.scroll_offset, layout)
            }
        };

        Ok((viewport, None))
    }

    /// Queues a request behind those already submitted.
    pub fn submit(&mut self, request: UpdateRequest) {
        self.pending.push_back(request);
    }

    /// Routes a raw input event and queues the resulting requests.
    pub fn handle_input(&mut self, event: &InputEvent) -> ViewerResult<()> {
        let requests = self.router.route(event)?;
        self.pending.extend(requests);
        Ok(())
    }

    /// Applies every queued request in arrival order.
    ///
    /// Invalid input is logged and dropped; out-of-range requests become user
    /// messages.
    pub fn flush(&mut self) -> Vec<Notification> {
        let mut notifications = Vec::new();

        while let Some(request) = self.pending.pop_front() {
            match self.request_update(request) {
                Ok(UpdateOutcome::Changed(changed)) => {
                    notifications.push(Notification::ViewportChanged(changed));
                }
                Ok(UpdateOutcome::Unchanged) => {}
                Err(error) if error.is_user_visible() => {
                    notifications.push(Notification::UserMessage { message: error.to_string() });
                }
                Err(error) => tracing::debug!(%error, ?request, "ignoring update request"),
            }
        }

        notifications
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn notification(&self) -> ViewportChanged {
        ViewportChanged {
            scroll_offset: self.viewport.scroll_offset,
            zoom_factor: self.viewport.zoom_factor,
            current_page: self.viewport.current_page,
            page_count: self.document.as_ref().map_or(0, |document| document.geometry.page_count()),
            visible_pages: self.visible_pages().map(PageRange::from),
        }
    }

    /// Visible pages widened by the prefetch radius.
    fn wanted_pages(&self) -> Option<RangeInclusive<usize>> {
        let layout = self.layout()?;
        let visible = self.viewport.visible_pages(layout)?;
        let last_page = layout.last_page()?;
        let radius = self.config.prefetch_radius;

        let first = visible.start().saturating_sub(radius);
        let last = visible.end().saturating_add(radius).min(last_page);
        Some(first..=last)
    }

    fn schedule_renders(&mut self) {
        let Some(visible) = self.visible_pages() else {
            return;
        };
        let Some(wanted) = self.wanted_pages() else {
            return;
        };

        let page_count = self.layout().map_or(0, LayoutState::page_count);
        let radius = self.config.prefetch_radius;
        let (first, last) = (*visible.start(), *visible.end());

        self.renders.retain(|page| wanted.contains(&page));

        for page in visible {
            self.renders.enqueue(page, RenderPriority::Visible);
        }

        let before = prefetch_page_indices(first, page_count, radius)
            .into_iter()
            .filter(|page| *page < first);
        let after = prefetch_page_indices(last, page_count, radius)
            .into_iter()
            .filter(|page| *page > last);
        for page in before.chain(after) {
            self.renders.enqueue(page, RenderPriority::Prefetch);
        }
    }

    pub fn next_render_request(&mut self) -> Option<RenderRequest> {
        self.renders.pop_next()
    }

    /// Whether a render issued earlier still matches the current view.
    pub fn is_fresh(&self, request: &RenderRequest) -> bool {
        self.has_document()
            && request.generation == self.renders.generation()
            && request.zoom_factor == self.viewport.zoom_factor
            && self.wanted_pages().is_some_and(|wanted| wanted.contains(&request.page_index))
    }

    /// Hands every queued render to `renderer` without blocking on it.
    ///
    /// Bitmaps the renderer produces immediately are returned; pending ones
    /// come back later through [`accept_rendered`](Self::accept_rendered).
    pub fn dispatch_renders<R: PageRenderer>(
        &mut self,
        renderer: &mut R,
    ) -> Vec<RenderedPage<R::Bitmap>> {
        let mut ready = Vec::new();

        while let Some(request) = self.renders.pop_next() {
            if let RenderResponse::Ready(bitmap) = renderer.render(&request) {
                ready.push(RenderedPage { request, bitmap });
            }
        }

        ready
    }

    /// Freshness check for a bitmap delivered after the fact.
    pub fn accept_rendered<B>(&self, request: RenderRequest, bitmap: B) -> Option<RenderedPage<B>> {
        if self.is_fresh(&request) {
            Some(RenderedPage { request, bitmap })
        } else {
            tracing::trace!(page_index = request.page_index, "discarding stale render");
            None
        }
    }
}
