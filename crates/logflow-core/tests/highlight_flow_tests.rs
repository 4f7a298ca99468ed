//! End-to-end flow: citation text -> coordinator -> subscribed view.

use logflow_core::{
    extract_citation, split_for_rendering, LogId, LogWindow, Segment, ViewCoordinator,
};

#[tokio::test]
async fn citation_activation_reaches_a_subscriber() {
    let coordinator = ViewCoordinator::new();
    let mut highlight_rx = coordinator.watch_highlight();

    let analysis = "Divergence begins at [Log #42] when the pool saturates.";
    let id = extract_citation(analysis).expect("analysis cites a log");
    coordinator.set_highlight(id);

    highlight_rx.changed().await.unwrap();
    let seen = highlight_rx.borrow_and_update().clone();
    assert_eq!(seen.log_id, Some(LogId::Number(42)));
    assert_eq!(seen.triggered_at, 1);
}

#[tokio::test]
async fn re_citing_the_same_log_notifies_again() {
    let coordinator = ViewCoordinator::new();
    let mut highlight_rx = coordinator.watch_highlight();

    coordinator.set_highlight(LogId::Number(5));
    highlight_rx.changed().await.unwrap();
    let first = highlight_rx.borrow_and_update().triggered_at;

    coordinator.set_highlight(LogId::Number(5));
    highlight_rx.changed().await.unwrap();
    let second = highlight_rx.borrow_and_update().triggered_at;

    assert!(second > first);
}

#[tokio::test]
async fn window_change_wakes_the_log_view() {
    let coordinator = ViewCoordinator::new();
    let mut window_rx = coordinator.watch_window();

    let now = chrono::Utc::now();
    coordinator.set_window(LogWindow {
        from: now - chrono::Duration::minutes(7),
        to: now,
        label: Some("Crash Period".to_string()),
    });

    window_rx.changed().await.unwrap();
    let pinned = window_rx.borrow_and_update().clone().unwrap();
    assert_eq!(pinned.label.as_deref(), Some("Crash Period"));

    coordinator.clear_window();
    window_rx.changed().await.unwrap();
    assert!(window_rx.borrow_and_update().is_none());
}

#[test]
fn rendered_segments_are_addressable() {
    let segments = split_for_rendering("fix [Log #7] first, then [Log #9]");
    let citations: Vec<&LogId> = segments
        .iter()
        .filter_map(|s| match s {
            Segment::Citation(id) => Some(id),
            Segment::Text(_) => None,
        })
        .collect();
    assert_eq!(citations, vec![&LogId::Number(7), &LogId::Number(9)]);
}
