//! Input: raw UI events mapped to abstract actions, and the facing latch
//! that decides which neighbor an edit targets.
//!
//! # Invariants
//! - The stage consumes actions, never raw key or pointer events.
//! - The latch holds a single direction; a later press overwrites it and
//!   only the release of that same key clears it.

pub mod action;
pub mod latch;

pub use action::Action;
pub use latch::{Facing, FacingLatch};
