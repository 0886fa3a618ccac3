//! Core domain types for the forest (Layers 0-4)
//!
//! Module hierarchy follows type dependency order:
//! - identity: EntryId, IdProvider (Layer 0)
//! - payload: Payload field map (Layer 0)
//! - entry: Children, Entry (Layer 1)
//! - source: RawEntry, RawChildren, ConversionRule (Layer 2)
//! - factory: EntryFactory (Layer 3)
//! - forest: Forest, Visit, Placement (Layer 4)

pub mod entry;
pub mod error;
pub mod factory;
pub mod forest;
pub mod identity;
pub mod payload;
pub mod source;

pub use entry::{Children, Entry};
pub use error::{CoreError, InvalidId};
pub use factory::EntryFactory;
pub use forest::{Forest, Placement, Visit};
pub use identity::{EntryId, IdProvider, PREVIEW_ID, RandomIds, SequentialIds};
pub use payload::{Payload, PayloadError};
pub use source::{ConversionRule, RawChildren, RawEntry};
