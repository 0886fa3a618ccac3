//! Integration coverage for the drag gesture over a forest: preview
//! staging, commit and cancel, driven with realistic row geometry.

#[path = "fixtures/mod.rs"]
mod fixtures;

use std::ops::ControlFlow;

use fixtures::{atlas, child_ids, entry, id, root_ids};
use grove_rs::{DropDecision, Forest, GesturePhase, HoverKind, Rect, ReorderSession};

/// Rows are 32px tall, stacked from the container top at y=8.
fn row(index: usize) -> Rect {
    Rect::new(0.0, 8.0 + index as f64 * 32.0, 240.0, 32.0)
}

fn in_upper_half(rect: Rect) -> (f64, f64) {
    (20.0, rect.top + 4.0)
}

fn in_lower_half(rect: Rect) -> (f64, f64) {
    (20.0, rect.top + 28.0)
}

fn container() -> Rect {
    Rect::new(0.0, 0.0, 240.0, 400.0)
}

fn preview_count(forest: &Forest) -> usize {
    let mut count = 0usize;
    let flow = forest.walk(|visit| {
        if visit.entry.id.is_preview() {
            count += 1;
        }
        ControlFlow::Continue(())
    });
    assert!(flow.is_continue());
    count
}

#[test]
fn cancelled_gesture_restores_the_original_forest() {
    let mut forest = Forest::with_sequential_ids();
    forest.create(vec![entry("A"), entry("B")]);
    let before = forest.snapshot();

    let mut session = ReorderSession::new(forest);
    assert!(session.on_drag_start(&id("A")));
    let (x, y) = in_lower_half(row(1));
    session.on_drag_over(&id("B"), HoverKind::LeafRow, row(1), x, y);
    assert_eq!(session.phase(), GesturePhase::Preview);

    assert!(session.on_drag_end());
    let after = session.into_forest();
    assert_eq!(after.snapshot(), before);
    assert!(!after.find(&id("A")).expect("restored").hidden());
}

#[test]
fn committed_drop_relocates_without_a_preview() {
    let mut forest = Forest::with_sequential_ids();
    forest.create(vec![entry("A"), entry("B")]);

    let mut session = ReorderSession::new(forest);
    assert!(session.on_drag_start(&id("A")));
    let (x, y) = in_lower_half(row(1));
    let decision = session.on_drag_over(&id("B"), HoverKind::LeafRow, row(1), x, y);
    assert_eq!(decision, DropDecision::InsertAfter);

    assert!(session.on_drop());
    session.on_drag_end();

    let after = session.into_forest();
    assert_eq!(root_ids(&after), ["B", "A"]);
    assert_eq!(preview_count(&after), 0);
    assert!(!after.find(&id("A")).expect("relocated").hidden());
}

#[test]
fn preview_is_exclusive_with_the_visible_original() {
    let mut session = ReorderSession::new(atlas());
    assert!(session.on_drag_start(&id("terrain")));

    // Sweep across every row; the preview must stay unique and the
    // original must stay hidden in place the whole time.
    for (index, target) in ["coastline", "overlays", "rivers"].into_iter().enumerate() {
        let (x, y) = in_upper_half(row(index));
        session.on_drag_over(&id(target), HoverKind::LeafRow, row(index), x, y);

        let forest = session.forest();
        assert_eq!(preview_count(forest), 1);
        let original = forest.find(&id("terrain")).expect("still present");
        assert!(original.hidden());
    }
}

#[test]
fn group_header_hover_stages_the_preview_as_first_child() {
    let mut session = ReorderSession::new(atlas());
    assert!(session.on_drag_start(&id("coastline")));

    let (x, y) = in_lower_half(row(1));
    let decision = session.on_drag_over(&id("overlays"), HoverKind::GroupHeader, row(1), x, y);
    assert_eq!(decision, DropDecision::PrependChild);
    assert_eq!(
        child_ids(session.forest(), &id("overlays")),
        ["preview", "rivers", "cities"]
    );

    assert!(session.on_drop());
    assert_eq!(
        child_ids(session.forest(), &id("overlays")),
        ["coastline", "rivers", "cities"]
    );
}

#[test]
fn dropping_a_group_carries_its_subtree() {
    let mut session = ReorderSession::new(atlas());
    assert!(session.on_drag_start(&id("overlays")));

    let (x, y) = in_upper_half(row(0));
    session.on_drag_over(&id("coastline"), HoverKind::LeafRow, row(0), x, y);
    assert!(session.on_drop());
    session.on_drag_end();

    let after = session.into_forest();
    assert_eq!(root_ids(&after), ["overlays", "coastline", "terrain"]);
    assert_eq!(child_ids(&after, &id("overlays")), ["rivers", "cities"]);
    assert!(!after.find(&id("overlays")).expect("relocated").hidden());
}

#[test]
fn leaving_the_container_discards_the_preview_but_not_the_gesture() {
    let mut session = ReorderSession::new(atlas());
    assert!(session.on_drag_start(&id("coastline")));
    let (x, y) = in_lower_half(row(2));
    session.on_drag_over(&id("cities"), HoverKind::LeafRow, row(2), x, y);
    assert_eq!(session.phase(), GesturePhase::Preview);

    // dragleave into a child element keeps the preview.
    assert!(!session.on_drag_leave(container(), 100.0, 100.0));
    assert_eq!(session.phase(), GesturePhase::Preview);

    assert!(session.on_drag_leave(container(), 100.0, 500.0));
    assert_eq!(session.phase(), GesturePhase::Dragging);
    assert_eq!(preview_count(session.forest()), 0);

    // A later hover can stage a fresh preview.
    let (x, y) = in_upper_half(row(0));
    let decision = session.on_drag_over(&id("terrain"), HoverKind::LeafRow, row(0), x, y);
    assert_eq!(decision, DropDecision::InsertBefore);
    assert_eq!(session.phase(), GesturePhase::Preview);
}

#[test]
fn container_padding_hovers_target_the_run_edges() {
    let mut session = ReorderSession::new(atlas());
    assert!(session.on_drag_start(&id("cities")));

    let decision = session.on_drag_over_container(container(), 8.0, 8.0, 20.0, 4.0);
    assert_eq!(decision, DropDecision::InsertBefore);
    assert_eq!(root_ids(session.forest())[0], "preview");

    assert!(session.on_drop());
    let after = session.forest();
    assert_eq!(root_ids(after)[0], "cities");
    assert_eq!(child_ids(after, &id("overlays")), ["rivers"]);
}

#[test]
fn degenerate_geometry_never_stages_a_preview() {
    let mut session = ReorderSession::new(atlas());
    assert!(session.on_drag_start(&id("coastline")));

    let flat = Rect::new(0.0, 0.0, 240.0, 0.0);
    let decision = session.on_drag_over(&id("terrain"), HoverKind::LeafRow, flat, 20.0, 0.0);
    assert_eq!(decision, DropDecision::NoOp);

    let nan = Rect::new(f64::NAN, 0.0, 240.0, 32.0);
    let decision = session.on_drag_over(&id("terrain"), HoverKind::LeafRow, nan, 20.0, 10.0);
    assert_eq!(decision, DropDecision::NoOp);

    assert_eq!(preview_count(session.forest()), 0);
    assert_eq!(session.phase(), GesturePhase::Dragging);
}
