//! World Kernel: the chunked block store and its procedural generator.
//!
//! # Invariants
//! - Chunks are fully populated when created and are never evicted.
//! - Generation is a pure function of `(seed, position)`; each chunk
//!   coordinate is generated at most once per store.
//! - All block writes flow through [`WorldStore::set_block`] and are logged.

mod chunk;
mod generator;
pub mod world;

pub use chunk::{BlockArray, Chunk};
pub use generator::{Generator, TerrainGenerator};
pub use world::{WorldConfig, WorldError, WorldEvent, WorldStore};
