use viewer_core::{
    Document, InputEvent, Notification, PageRange, PageSize, Point, TouchEvent, TouchPoint,
    UpdateOutcome, UpdateRequest, ViewerConfig, ViewerError, ViewportCoordinator, ViewportSize,
};

/// Ten 1200-wide pages whose tops sit 1000 units apart at zoom 1.0.
fn ten_page_document() -> Document {
    Document::uniform(10, PageSize::new(1200.0, 1000.0)).expect("valid pages")
}

fn coordinator_with(config: ViewerConfig) -> ViewportCoordinator {
    let mut coordinator =
        ViewportCoordinator::new(config, ViewportSize::new(1000.0, 800.0)).expect("valid setup");
    coordinator.load_document(ten_page_document());
    coordinator
}

fn pinch(distance: f64) -> InputEvent {
    InputEvent::Touch(TouchEvent {
        points: vec![TouchPoint::new(7, 300.0, 400.0), TouchPoint::new(8, 300.0 + distance, 400.0)],
    })
}

#[test]
fn goto_then_zoom_keeps_focal_content_in_place() {
    let mut coordinator = coordinator_with(ViewerConfig::default());

    coordinator.request_update(UpdateRequest::GotoPage { index: 5 }).expect("page exists");
    assert_eq!(coordinator.viewport().scroll_offset, 5000.0);
    assert_eq!(coordinator.viewport().current_page, Some(5));

    let before = coordinator
        .layout()
        .and_then(|layout| layout.document_point(5000.0 + 400.0))
        .expect("point under focal");

    let outcome = coordinator
        .request_update(UpdateRequest::Zoom { steps: 2.0, focal: Some(Point::new(400.0, 400.0)) })
        .expect("valid zoom");
    let UpdateOutcome::Changed(changed) = outcome else {
        panic!("zoom should change the viewport");
    };

    assert!((changed.zoom_factor - 1.21).abs() < 1e-12);
    let layout = coordinator.layout().expect("document loaded");
    let screen_y = layout.offset_of(before) - changed.scroll_offset;
    assert!((screen_y - 400.0).abs() < 1.0);
    assert_eq!(changed.current_page, Some(5));
    assert_eq!(changed.visible_pages, Some(PageRange { first: 5, last: 5 }));
}

#[test]
fn pinch_in_clamps_exactly_at_min_zoom() {
    let config = ViewerConfig { min_zoom: 0.1, ..ViewerConfig::default() };
    let mut coordinator = coordinator_with(config);

    coordinator.handle_input(&InputEvent::SetZoomRequested { factor: 0.15 }).expect("routed");
    coordinator.handle_input(&pinch(100.0)).expect("routed");
    coordinator.handle_input(&pinch(50.0)).expect("routed");
    coordinator.flush();

    assert_eq!(coordinator.viewport().zoom_factor, 0.1);
}

#[test]
fn pinch_in_with_default_bounds_stops_at_min_zoom() {
    let mut coordinator = coordinator_with(ViewerConfig::default());

    coordinator.handle_input(&pinch(100.0)).expect("routed");
    coordinator.handle_input(&pinch(50.0)).expect("routed");
    coordinator.handle_input(&pinch(20.0)).expect("routed");
    coordinator.flush();

    assert_eq!(coordinator.viewport().zoom_factor, viewer_core::MIN_ZOOM);
}

#[test]
fn goto_past_end_fails_without_state_change() {
    let mut coordinator = coordinator_with(ViewerConfig::default());
    coordinator.request_update(UpdateRequest::Scroll { delta: 7.5 }).expect("valid scroll");
    let before = *coordinator.viewport();

    let result = coordinator.request_update(UpdateRequest::GotoPage { index: 15 });

    assert_eq!(result, Err(ViewerError::PageOutOfRange { index: 15, page_count: 10 }));
    assert_eq!(coordinator.viewport(), &before);
}

#[test]
fn pinch_out_and_back_restores_zoom() {
    let mut coordinator = coordinator_with(ViewerConfig::default());

    for distance in [100.0, 200.0, 100.0] {
        coordinator.handle_input(&pinch(distance)).expect("routed");
    }
    let notifications = coordinator.flush();

    assert_eq!(notifications.len(), 2);
    assert!((coordinator.viewport().zoom_factor - 1.0).abs() < 1e-9);
}

#[test]
fn toolbar_commands_surface_user_messages() {
    let mut coordinator = coordinator_with(ViewerConfig::default());

    coordinator.handle_input(&InputEvent::SetZoomRequested { factor: 12.0 }).expect("routed");
    coordinator.handle_input(&InputEvent::GotoPageRequested { index: 9 }).expect("routed");
    let notifications = coordinator.flush();

    assert_eq!(
        notifications[0],
        Notification::UserMessage { message: "Zoom must be between 50% and 300%.".to_owned() }
    );
    assert!(matches!(
        notifications[1],
        Notification::ViewportChanged(changed) if changed.current_page == Some(9)
    ));
}

#[test]
fn replacing_document_resets_viewport() {
    let mut coordinator = coordinator_with(ViewerConfig::default());
    coordinator
        .request_update(UpdateRequest::Zoom { steps: 3.0, focal: None })
        .expect("valid zoom");
    coordinator.request_update(UpdateRequest::LastPage).expect("valid jump");

    let changed = coordinator.load_document(
        Document::uniform(3, PageSize::new(600.0, 800.0)).expect("valid pages"),
    );

    assert_eq!(changed.scroll_offset, 0.0);
    assert_eq!(changed.zoom_factor, 1.0);
    assert_eq!(changed.current_page, Some(0));
    assert_eq!(changed.page_count, 3);
    assert!(changed.visible_pages.is_some_and(|range| range.contains(0)));
}
