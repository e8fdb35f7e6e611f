//! Collator core: work items, batch lifecycle, and work enumeration.
mod batch;
mod enumerate;
mod item;

pub use batch::{BatchOutcome, BatchState, ItemFailure};
pub use enumerate::{random_ordinals, OrdinalRange};
pub use item::{ComputeItem, MediaItem};
