#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod drag;
pub mod error;
mod paths;
pub mod telemetry;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::core::{
    Children, Entry, EntryFactory, EntryId, Forest, IdProvider, Payload, Placement, RandomIds,
    RawChildren, RawEntry, SequentialIds, Visit,
};
pub use crate::drag::{DropDecision, GesturePhase, HoverKind, Rect, ReorderSession};
