//! Shared types: the three coordinate spaces, blocks, and edit directions.
//!
//! # Invariants
//! - Data space is z-up; render space is y-down (`render.y = H - 1 - data.z`).
//! - Chunk coordinates are 2D: a chunk always spans the full world height.

mod block;
mod direction;
mod types;

pub use block::{Block, BlockKind};
pub use direction::Direction;
pub use types::{BlockPos, ChunkCoord, LocalPos, NodeId, RenderBlockPos};

/// Edge length, in blocks, of a chunk and of a viewport tile.
pub const TILE_SIZE: i32 = 8;

/// World height used when a configuration does not override it.
pub const DEFAULT_WORLD_HEIGHT: i32 = 16;
