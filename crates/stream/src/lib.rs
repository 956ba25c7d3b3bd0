//! Streaming: the sliding window of tiles kept alive around the camera.
//!
//! # Invariants
//! - The tile matrix is always a complete `rows x cols` rectangle; a shift
//!   never resizes it.
//! - After every maintenance pass each tile's stored index equals its
//!   position in the matrix.
//! - Tiles hold no state that the world store cannot rebuild: an evicted
//!   tile is rebuilt from the store when its area re-enters the window.

mod builder;
mod config;
mod grid;
mod stats;

pub use builder::build_tile;
pub use config::ViewportConfig;
pub use grid::{Edge, NodeHit, SceneDelta, StreamError, ViewportGrid};
pub use stats::{MaintenanceTimer, StreamStats};
