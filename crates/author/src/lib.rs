//! Authoring: the block edit protocol, undo/redo, and the stage.
//!
//! # Invariants
//! - Every edit commits to the world store before the scene is touched, and
//!   the scene delta is derived from the committed block, never from the
//!   requested one.
//! - Every edit is reversible and recorded with the value it replaced.
//! - The stage is an explicit value owned by its caller; nothing here is a
//!   process-wide singleton.

mod bridge;
mod config;
mod editor;
mod stage;

pub use bridge::{EditError, EditOutcome, SceneBridge};
pub use config::{ConfigError, StageConfig};
pub use editor::{EditCommand, EditKind, Editor};
pub use stage::Stage;
