//! Developer Tooling: read-only inspection of the world store and viewport.
//!
//! # Invariants
//! - Inspection never materializes chunks or mutates the scene.

pub mod inspector;

pub use inspector::{BlockInfo, StageSummary, TileInfo, WorldInspector};
