use glam::UVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tilescape_common::{Block, BlockPos, ChunkCoord, DEFAULT_WORLD_HEIGHT, TILE_SIZE};

use crate::chunk::{BlockArray, Chunk};
use crate::generator::{Generator, TerrainGenerator};

/// Errors from world store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("position {pos} is outside the world height 0..{height}")]
    OutOfRange { pos: BlockPos, height: i32 },
    #[error("box {min}..={max} has a minimum corner above its maximum")]
    InvalidBox { min: BlockPos, max: BlockPos },
    #[error("chunk {coord} lies outside the addressable world")]
    ChunkOutOfRange { coord: ChunkCoord },
}

/// An event record produced by every mutation of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A chunk was materialized by the generator.
    ChunkGenerated { coord: ChunkCoord },
    /// A block was written. Carries the replaced value for undo support.
    BlockSet { pos: BlockPos, old: Block, new: Block },
}

/// World store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Identifier of the dimension this store backs.
    pub dimension: String,
    /// Generator seed.
    pub seed: String,
    /// Number of block layers (H).
    pub height: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dimension: "overworld".into(),
            seed: "seed".into(),
            height: DEFAULT_WORLD_HEIGHT,
        }
    }
}

/// The authoritative block state of one dimension.
///
/// Chunks are generated on first access and kept for the lifetime of the
/// store, so memory grows with the explored area. Written blocks override
/// generated ones permanently.
///
/// Uses BTreeMap so tooling iterates chunks in a stable order.
pub struct WorldStore {
    dimension: String,
    height: i32,
    generator: Box<dyn Generator>,
    chunks: BTreeMap<ChunkCoord, Chunk>,
    event_log: Vec<WorldEvent>,
}

impl WorldStore {
    /// Create an empty store backed by `generator`.
    pub fn new(dimension: impl Into<String>, height: i32, generator: Box<dyn Generator>) -> Self {
        assert!(height > 0, "world height must be positive");
        Self {
            dimension: dimension.into(),
            height,
            generator,
            chunks: BTreeMap::new(),
            event_log: Vec::new(),
        }
    }

    /// Create a store using the terrain generator for the configured seed.
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(
            config.dimension.clone(),
            config.height,
            Box::new(TerrainGenerator::new(config.seed.clone())),
        )
    }

    /// Create a default-height terrain store for `seed`.
    pub fn with_seed(seed: impl Into<String>) -> Self {
        Self::from_config(&WorldConfig {
            seed: seed.into(),
            ..WorldConfig::default()
        })
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// World height H.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn seed(&self) -> &str {
        self.generator.seed()
    }

    /// Number of chunks materialized so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// The block at `pos`, generating its chunk if needed.
    pub fn get_block(&mut self, pos: BlockPos) -> Result<Block, WorldError> {
        self.check_height(pos)?;
        Ok(self.materialize(pos.chunk_coord()).get(pos.local()).clone())
    }

    /// The block at `pos` if its chunk already exists. Never generates.
    pub fn peek_block(&self, pos: BlockPos) -> Option<&Block> {
        if !(0..self.height).contains(&pos.z) {
            return None;
        }
        self.chunks
            .get(&pos.chunk_coord())
            .map(|chunk| chunk.get(pos.local()))
    }

    /// Write `block` at `pos`, returning the value it replaced.
    pub fn set_block(&mut self, pos: BlockPos, block: Block) -> Result<Block, WorldError> {
        self.check_height(pos)?;
        let old = self
            .materialize(pos.chunk_coord())
            .set(pos.local(), block.clone());
        tracing::debug!(%pos, %old, new = %block, "block set");
        self.event_log.push(WorldEvent::BlockSet {
            pos,
            old: old.clone(),
            new: block,
        });
        Ok(old)
    }

    /// Every block in the inclusive box `min..=max`, indexed relative to
    /// `min`. Spans chunk boundaries; each touched chunk is resolved once.
    pub fn get_block_array(
        &mut self,
        min: BlockPos,
        max: BlockPos,
    ) -> Result<BlockArray, WorldError> {
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(WorldError::InvalidBox { min, max });
        }
        self.check_height(min)?;
        self.check_height(max)?;

        let dims = UVec3::new(
            (max.x - min.x + 1) as u32,
            (max.y - min.y + 1) as u32,
            (max.z - min.z + 1) as u32,
        );
        let mut out = BlockArray::new(min, dims);
        let (cmin, cmax) = (min.chunk_coord(), max.chunk_coord());

        for cy in cmin.y..=cmax.y {
            for cx in cmin.x..=cmax.x {
                let coord = ChunkCoord::new(cx, cy);
                let base = coord.min_block();
                let (x0, x1) = (min.x.max(base.x), max.x.min(base.x + TILE_SIZE - 1));
                let (y0, y1) = (min.y.max(base.y), max.y.min(base.y + TILE_SIZE - 1));
                let chunk = self.materialize(coord);
                for z in min.z..=max.z {
                    for y in y0..=y1 {
                        for x in x0..=x1 {
                            let pos = BlockPos::new(x, y, z);
                            out.set(
                                (x - min.x) as u32,
                                (y - min.y) as u32,
                                (z - min.z) as u32,
                                chunk.get(pos.local()).clone(),
                            );
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// The chunk at `coord`, generating it if needed.
    pub fn get_chunk_from_chunk_pos(&mut self, coord: ChunkCoord) -> Result<&Chunk, WorldError> {
        Self::check_chunk(coord)?;
        Ok(self.materialize(coord))
    }

    /// Iterate materialized chunks in coordinate order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    fn materialize(&mut self, coord: ChunkCoord) -> &mut Chunk {
        match self.chunks.entry(coord) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let chunk = self.generator.fill_chunk(coord, self.height);
                tracing::debug!(%coord, dimension = %self.dimension, "chunk generated");
                self.event_log.push(WorldEvent::ChunkGenerated { coord });
                e.insert(chunk)
            }
        }
    }

    /// Reject chunks whose blocks have no `i32` data position.
    pub fn check_chunk(coord: ChunkCoord) -> Result<(), WorldError> {
        if coord.is_addressable() {
            Ok(())
        } else {
            Err(WorldError::ChunkOutOfRange { coord })
        }
    }

    fn check_height(&self, pos: BlockPos) -> Result<(), WorldError> {
        if (0..self.height).contains(&pos.z) {
            Ok(())
        } else {
            Err(WorldError::OutOfRange {
                pos,
                height: self.height,
            })
        }
    }
}

impl std::fmt::Debug for WorldStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldStore")
            .field("dimension", &self.dimension)
            .field("seed", &self.generator.seed())
            .field("height", &self.height)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}
