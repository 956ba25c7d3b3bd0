use noise::{NoiseFn, Perlin};
use tilescape_common::{Block, BlockPos, ChunkCoord, TILE_SIZE};

use crate::chunk::Chunk;

/// Deterministic `(seed, position) -> Block` function.
///
/// Implementations must be pure: the same position under the same seed
/// yields the same block regardless of what else has been generated.
pub trait Generator {
    /// The seed this generator was constructed with.
    fn seed(&self) -> &str;

    /// The block at an absolute position in a world of the given height.
    fn block_at(&self, pos: BlockPos, height: i32) -> Block;

    /// Generate a whole chunk. The default evaluates [`Generator::block_at`]
    /// per cell; implementors may batch.
    fn fill_chunk(&self, coord: ChunkCoord, height: i32) -> Chunk {
        Chunk::from_fn(coord, height, |pos| self.block_at(pos, height))
    }
}

/// Horizontal sampling scale of the base terrain noise.
const TERRAIN_SCALE: f64 = 0.045;
/// Frequency multiplier of the detail octave.
const DETAIL_FREQUENCY: f64 = 4.0;
/// Weight of the detail octave relative to the base octave.
const DETAIL_WEIGHT: f64 = 0.25;

/// Layered-Perlin height-field terrain.
///
/// Columns are, bottom to top: `bedrock` at z = 0, `stone`, three layers of
/// `dirt`, and a `grass` (or `sand` near the water line) surface. Columns
/// whose surface lies below sea level are flooded with `water`.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    seed: String,
    base: Perlin,
    detail: Perlin,
}

impl TerrainGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let hash = fnv1a(seed.as_bytes());
        Self {
            base: Perlin::new(hash as u32),
            detail: Perlin::new((hash >> 32) as u32),
            seed,
        }
    }

    /// Height of the top solid block of the column at `(x, y)`.
    pub fn surface_height(&self, x: i32, y: i32, height: i32) -> i32 {
        let (fx, fy) = (x as f64 * TERRAIN_SCALE, y as f64 * TERRAIN_SCALE);
        let n = self.base.get([fx, fy]) * (1.0 - DETAIL_WEIGHT)
            + self.detail.get([fx * DETAIL_FREQUENCY, fy * DETAIL_FREQUENCY]) * DETAIL_WEIGHT;
        let h = height as f64;
        let surface = (h * 0.4 + n * h * 0.35).round() as i32;
        surface.clamp(0, (height - 2).max(0))
    }

    fn sea_level(height: i32) -> i32 {
        (height as f64 * 0.3) as i32
    }

    fn column_block(z: i32, surface: i32, sea: i32) -> Block {
        match z {
            0 => Block::material("bedrock"),
            z if z > surface => {
                if z <= sea {
                    Block::material("water")
                } else {
                    Block::Empty
                }
            }
            z if z == surface => {
                if surface <= sea + 1 {
                    Block::material("sand")
                } else {
                    Block::material("grass")
                }
            }
            z if z >= surface - 3 => Block::material("dirt"),
            _ => Block::material("stone"),
        }
    }
}

impl Generator for TerrainGenerator {
    fn seed(&self) -> &str {
        &self.seed
    }

    fn block_at(&self, pos: BlockPos, height: i32) -> Block {
        let surface = self.surface_height(pos.x, pos.y, height);
        Self::column_block(pos.z, surface, Self::sea_level(height))
    }

    fn fill_chunk(&self, coord: ChunkCoord, height: i32) -> Chunk {
        let sea = Self::sea_level(height);
        let side = TILE_SIZE as usize;
        let min = coord.min_block();
        let surfaces: Vec<i32> = (0..side * side)
            .map(|i| {
                let (x, y) = (min.x + (i % side) as i32, min.y + (i / side) as i32);
                self.surface_height(x, y, height)
            })
            .collect();
        Chunk::from_fn(coord, height, |pos| {
            let local = pos.local();
            Self::column_block(pos.z, surfaces[local.y * side + local.x], sea)
        })
    }
}

/// FNV-1a over the seed bytes.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x0100_0000_01b3);
    }
    h
}
