//! Reorder session
//!
//! Translates a drag gesture into forest operations: stage a preview at
//! the pointed-at position, commit it on drop, unwind on cancel.
//!
//! INVARIANT: at most one preview entry exists at any time. Every
//! placement removes any existing preview first.
//!
//! INVARIANT: a cancelled gesture leaves the forest value-equal to the
//! forest before the gesture started, the hidden flag included.

use std::fmt;

use uuid::Uuid;

use crate::core::{Entry, EntryId, Forest, Placement, RawEntry};

use super::geometry::{
    container_decision, container_zone, drop_decision, left_container, DropDecision, HoverKind,
    PointerOffset, Rect,
};

/// Identity of one gesture, for log correlation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(Uuid);

impl GestureId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GestureId({})", self.0)
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a gesture currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    /// No gesture in flight.
    Idle,
    /// Context captured, no preview staged.
    Dragging,
    /// A preview entry marks the would-be drop position.
    Preview,
}

/// Snapshot taken at dragstart.
///
/// `entry` is the dragged entry with its whole subtree, in pre-gesture
/// shape. `original_hidden` remembers the raw flag so cancel can restore
/// an absent key as absent.
#[derive(Clone, Debug)]
struct DragContext {
    entry: Entry,
    original_hidden: Option<bool>,
    persisted: bool,
    gesture: GestureId,
}

impl DragContext {
    /// The placeholder staged while hovering: same payload, sentinel id,
    /// no subtree. Children stay with the hidden original until commit.
    fn preview_source(&self) -> RawEntry {
        let mut raw = RawEntry::new().with_id(EntryId::preview());
        raw.payload = self.entry.payload.clone();
        raw
    }

    /// The full entry written at the drop position, visible again.
    fn materialized_source(&self) -> RawEntry {
        let mut raw = RawEntry::from(&self.entry);
        raw.payload.set_hidden(Some(false));
        raw
    }
}

/// Drag/reorder state machine over a [`Forest`].
///
/// Entry points mirror the pointer events a presenter wires up:
/// [`on_drag_start`](Self::on_drag_start),
/// [`on_drag_over`](Self::on_drag_over) (plus the container variant),
/// [`on_drag_leave`](Self::on_drag_leave), [`on_drop`](Self::on_drop)
/// and [`on_drag_end`](Self::on_drag_end).
#[derive(Debug)]
pub struct ReorderSession {
    forest: Forest,
    context: Option<DragContext>,
}

impl ReorderSession {
    pub fn new(forest: Forest) -> Self {
        Self {
            forest,
            context: None,
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn into_forest(self) -> Forest {
        self.forest
    }

    pub fn phase(&self) -> GesturePhase {
        match self.active_context() {
            None => GesturePhase::Idle,
            Some(_) if self.forest.contains(&EntryId::preview()) => GesturePhase::Preview,
            Some(_) => GesturePhase::Dragging,
        }
    }

    /// The in-flight context; a committed-but-unclosed gesture reads as
    /// inactive.
    fn active_context(&self) -> Option<&DragContext> {
        self.context.as_ref().filter(|ctx| !ctx.persisted)
    }

    /// Begin a gesture over the entry with `id`.
    ///
    /// Refused while another gesture is in flight, for the preview
    /// sentinel, and for ids not present in the forest.
    pub fn on_drag_start(&mut self, id: &EntryId) -> bool {
        if self.active_context().is_some() || id.is_preview() {
            return false;
        }
        let Some(entry) = self.forest.entry(id) else {
            return false;
        };

        let gesture = GestureId::new();
        tracing::debug!(gesture = %gesture, id = %id, "drag started");
        self.context = Some(DragContext {
            original_hidden: entry.payload.hidden_flag(),
            entry,
            persisted: false,
            gesture,
        });
        true
    }

    /// Hover over an entry row. Stages a fresh preview at the decided
    /// position; any stale preview is removed first.
    ///
    /// Returns the applied decision. `NoOp` covers inactive gestures,
    /// degenerate geometry, hovers into the dragged subtree and targets
    /// that have vanished.
    pub fn on_drag_over(
        &mut self,
        target: &EntryId,
        kind: HoverKind,
        rect: Rect,
        client_x: f64,
        client_y: f64,
    ) -> DropDecision {
        if self.active_context().is_none() {
            return DropDecision::NoOp;
        }
        self.forest.remove(&EntryId::preview());
        self.hide_original();

        let decision = match PointerOffset::normalized(rect, client_x, client_y) {
            Some(offset) => drop_decision(kind, offset),
            None => DropDecision::NoOp,
        };
        if decision == DropDecision::NoOp {
            return DropDecision::NoOp;
        }

        let Some(ctx) = self.active_context() else {
            return DropDecision::NoOp;
        };
        // An entry cannot land inside its own subtree.
        if ctx
            .entry
            .child_entries()
            .iter()
            .any(|child| child.subtree_contains(target))
        {
            return DropDecision::NoOp;
        }
        if &ctx.entry.id == target && decision == DropDecision::PrependChild {
            return DropDecision::NoOp;
        }

        let gesture = ctx.gesture;
        let source = ctx.preview_source();
        let placed = match decision {
            DropDecision::InsertBefore => {
                self.forest.insert_at(target, source, Placement::Before)
            }
            DropDecision::InsertAfter => self.forest.insert_at(target, source, Placement::After),
            DropDecision::PrependChild => self.forest.prepend_at(Some(target), source),
            DropDecision::NoOp => None,
        };
        match placed {
            Some(_) => {
                tracing::debug!(gesture = %gesture, target = %target, ?decision, "preview placed");
                decision
            }
            None => DropDecision::NoOp,
        }
    }

    /// Hover over the list container's own padding, outside any row.
    /// Lead padding stages the preview at the front of the root run,
    /// tail padding at its end.
    pub fn on_drag_over_container(
        &mut self,
        container: Rect,
        lead_padding: f64,
        tail_padding: f64,
        client_x: f64,
        client_y: f64,
    ) -> DropDecision {
        if self.active_context().is_none() {
            return DropDecision::NoOp;
        }
        self.forest.remove(&EntryId::preview());
        self.hide_original();

        let decision =
            match container_zone(container, lead_padding, tail_padding, client_x, client_y) {
                Some(zone) => container_decision(zone),
                None => DropDecision::NoOp,
            };
        let Some(ctx) = self.active_context() else {
            return DropDecision::NoOp;
        };
        let gesture = ctx.gesture;
        let source = ctx.preview_source();
        let placed = match decision {
            DropDecision::InsertBefore => self.forest.prepend_at(None, source),
            DropDecision::InsertAfter => self.forest.append_at(None, source),
            DropDecision::PrependChild | DropDecision::NoOp => None,
        };
        match placed {
            Some(_) => {
                tracing::debug!(gesture = %gesture, ?decision, "preview placed at run edge");
                decision
            }
            None => DropDecision::NoOp,
        }
    }

    /// The pointer reported leaving a drop zone. The preview is removed
    /// only when the pointer has really left `container`; dragleave from
    /// entering a child element keeps it.
    pub fn on_drag_leave(&mut self, container: Rect, client_x: f64, client_y: f64) -> bool {
        if self.active_context().is_none() {
            return false;
        }
        if !left_container(container, client_x, client_y) {
            return false;
        }
        let removed = self.forest.remove(&EntryId::preview());
        if removed {
            tracing::debug!("preview removed, pointer left the container");
        }
        removed
    }

    /// Commit the staged position: the original entry moves to where the
    /// preview stands, visible again, subtree intact.
    ///
    /// Without a staged preview this does nothing; the following dragend
    /// unwinds the gesture.
    pub fn on_drop(&mut self) -> bool {
        let Some(ctx) = self.active_context() else {
            return false;
        };
        let preview = EntryId::preview();
        if !self.forest.contains(&preview) {
            tracing::debug!(gesture = %ctx.gesture, "drop without a staged preview ignored");
            return false;
        }

        let gesture = ctx.gesture;
        let origin = ctx.entry.id.clone();
        let materialized = ctx.materialized_source();

        // Original out first so its ids are free for the materialized copy.
        self.forest.remove(&origin);
        if self.forest.replace(&preview, materialized).is_none() {
            return false;
        }

        if let Some(ctx) = self.context.as_mut() {
            ctx.persisted = true;
        }
        tracing::debug!(gesture = %gesture, id = %origin, "drag committed");
        true
    }

    /// The gesture ended. Without a prior commit this is a cancel: the
    /// original entry is un-hidden to its exact pre-gesture flag and any
    /// stray preview is removed.
    ///
    /// Returns true when a cancel actually restored state.
    pub fn on_drag_end(&mut self) -> bool {
        let Some(ctx) = self.context.take() else {
            return false;
        };
        self.forest.remove(&EntryId::preview());
        if ctx.persisted {
            tracing::debug!(gesture = %ctx.gesture, "gesture closed after commit");
            return false;
        }

        let origin = ctx.entry.id.clone();
        self.forest.set_hidden(&origin, ctx.original_hidden);
        tracing::debug!(gesture = %ctx.gesture, id = %origin, "drag cancelled, original restored");
        true
    }

    fn hide_original(&mut self) {
        let Some(ctx) = &self.context else { return };
        let origin = ctx.entry.id.clone();
        let still_visible = self
            .forest
            .find(&origin)
            .map(|entry| !entry.hidden())
            .unwrap_or(false);
        if still_visible {
            self.forest.set_hidden(&origin, Some(true));
            tracing::debug!(id = %origin, "original hidden for the gesture");
        }
    }
}
