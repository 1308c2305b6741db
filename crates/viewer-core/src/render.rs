//! Request side of the page renderer collaboration.
//!
//! The core never rasterizes. It queues render requests for the pages a
//! viewport change exposed, hands them to a [`PageRenderer`], and checks
//! results that come back later against the current generation so stale
//! bitmaps are dropped instead of painted.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPriority {
    Visible,
    Prefetch,
}

impl RenderPriority {
    fn rank(self) -> u8 {
        match self {
            Self::Visible => 0,
            Self::Prefetch => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderRequest {
    pub page_index: usize,
    pub zoom_factor: f64,
    pub generation: u64,
    pub priority: RenderPriority,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderResponse<B> {
    Ready(B),
    /// The renderer accepted the request and will deliver the bitmap later.
    Pending,
}

/// External rasterizer turning a page at a zoom factor into a bitmap.
pub trait PageRenderer {
    type Bitmap;

    fn render(&mut self, request: &RenderRequest) -> RenderResponse<Self::Bitmap>;
}

/// A bitmap that passed the freshness check.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage<B> {
    pub request: RenderRequest,
    pub bitmap: B,
}

/// De-duplicating, priority-ordered queue of page renders for one zoom factor.
///
/// A page is requested at most once per generation while it stays wanted.
/// Starting a generation forgets everything queued or issued before it.
#[derive(Debug, Default)]
pub struct RenderQueue {
    generation: u64,
    zoom_factor: f64,
    pending: HashMap<usize, RenderPriority>,
    order: VecDeque<usize>,
    issued: HashSet<usize>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_generation(&mut self, zoom_factor: f64) -> u64 {
        self.generation += 1;
        self.zoom_factor = zoom_factor;
        self.pending.clear();
        self.order.clear();
        self.issued.clear();
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn enqueue(&mut self, page_index: usize, priority: RenderPriority) {
        if self.issued.contains(&page_index) {
            return;
        }

        match self.pending.get_mut(&page_index) {
            Some(existing) => {
                if priority.rank() < existing.rank() {
                    *existing = priority;
                }
            }
            None => {
                self.pending.insert(page_index, priority);
                self.order.push_back(page_index);
            }
        }
    }

    /// Drops pages that are no longer wanted.
    ///
    /// Issued pages that fall out of the wanted set are forgotten too, so they
    /// are requested again once they come back into view.
    pub fn retain(&mut self, mut wanted: impl FnMut(usize) -> bool) {
        self.pending.retain(|page, _| wanted(*page));
        self.issued.retain(|page| wanted(*page));
        let pending = &self.pending;
        self.order.retain(|page| pending.contains_key(page));
    }

    pub fn pop_next(&mut self) -> Option<RenderRequest> {
        let mut best: Option<(usize, RenderPriority)> = None;

        for page in &self.order {
            let Some(priority) = self.pending.get(page).copied() else {
                continue;
            };

            match best {
                Some((_, best_priority)) if priority.rank() >= best_priority.rank() => {}
                _ => best = Some((*page, priority)),
            }

            if matches!(best, Some((_, RenderPriority::Visible))) {
                break;
            }
        }

        let (page_index, priority) = best?;
        self.pending.remove(&page_index);
        self.order.retain(|page| *page != page_index);
        self.issued.insert(page_index);

        Some(RenderRequest {
            page_index,
            zoom_factor: self.zoom_factor,
            generation: self.generation,
            priority,
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Neighbours of `current` within `radius`, nearest first, inside the document.
pub fn prefetch_page_indices(current: usize, page_count: usize, radius: usize) -> Vec<usize> {
    if page_count == 0 {
        return Vec::new();
    }

    let last = page_count - 1;
    let mut pages = Vec::new();

    for offset in 1..=radius {
        if let Some(lower) = current.checked_sub(offset) {
            pages.push(lower.min(last));
        }

        let upper = current.saturating_add(offset);
        if upper <= last {
            pages.push(upper);
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_pages_are_served_before_prefetch() {
        let mut queue = RenderQueue::new();
        queue.begin_generation(1.0);

        queue.enqueue(4, RenderPriority::Prefetch);
        queue.enqueue(1, RenderPriority::Visible);

        let first = queue.pop_next().expect("first request");
        assert_eq!(first.priority, RenderPriority::Visible);
        assert_eq!(first.page_index, 1);

        let second = queue.pop_next().expect("second request");
        assert_eq!(second.priority, RenderPriority::Prefetch);
        assert_eq!(second.page_index, 4);
        assert!(queue.pop_next().is_none());
    }

    #[test]
    fn enqueue_upgrades_priority_of_pending_page() {
        let mut queue = RenderQueue::new();
        queue.begin_generation(1.0);

        queue.enqueue(8, RenderPriority::Prefetch);
        queue.enqueue(8, RenderPriority::Visible);

        let request = queue.pop_next().expect("request");
        assert_eq!(request.page_index, 8);
        assert_eq!(request.priority, RenderPriority::Visible);
        assert!(queue.is_empty());
    }

    #[test]
    fn issued_pages_are_not_requested_twice_per_generation() {
        let mut queue = RenderQueue::new();
        queue.begin_generation(1.0);

        queue.enqueue(2, RenderPriority::Visible);
        assert!(queue.pop_next().is_some());

        queue.enqueue(2, RenderPriority::Visible);
        assert!(queue.is_empty());

        let generation = queue.begin_generation(1.5);
        queue.enqueue(2, RenderPriority::Visible);
        let request = queue.pop_next().expect("new generation re-requests");
        assert_eq!(request.generation, generation);
        assert_eq!(request.zoom_factor, 1.5);
    }

    #[test]
    fn retain_drops_unwanted_pending_pages() {
        let mut queue = RenderQueue::new();
        queue.begin_generation(1.0);

        queue.enqueue(1, RenderPriority::Visible);
        queue.enqueue(2, RenderPriority::Visible);
        queue.retain(|page| page == 2);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_next().map(|request| request.page_index), Some(2));
    }

    #[test]
    fn retain_forgets_issued_pages_outside_wanted_set() {
        let mut queue = RenderQueue::new();
        queue.begin_generation(1.0);

        queue.enqueue(0, RenderPriority::Visible);
        queue.enqueue(3, RenderPriority::Visible);
        assert!(queue.pop_next().is_some());
        assert!(queue.pop_next().is_some());

        queue.retain(|page| page == 3);
        queue.enqueue(0, RenderPriority::Visible);
        queue.enqueue(3, RenderPriority::Visible);

        assert_eq!(queue.pop_next().map(|request| request.page_index), Some(0));
        assert!(queue.pop_next().is_none());
    }

    #[test]
    fn prefetch_neighbors_are_symmetric_and_bounded() {
        assert_eq!(prefetch_page_indices(5, 10, 2), vec![4, 6, 3, 7]);
        assert_eq!(prefetch_page_indices(0, 3, 3), vec![1, 2]);
        assert!(prefetch_page_indices(0, 0, 3).is_empty());
    }
}
