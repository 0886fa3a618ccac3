//! Drag and reorder
//!
//! Layer 0 (`geometry`): pure pointer math. Rects and normalized
//! offsets in, [`DropDecision`]s out. No forest types, no state.
//!
//! Layer 1 (`session`): the gesture state machine. Owns a [`Forest`],
//! stages the preview entry, commits on drop, unwinds on cancel.
//!
//! [`Forest`]: crate::core::Forest

pub mod geometry;
pub mod session;

pub use geometry::{
    container_decision, container_zone, drop_decision, left_container, ContainerZone,
    DropDecision, HoverKind, PointerOffset, Rect,
};
pub use session::{GestureId, GesturePhase, ReorderSession};
