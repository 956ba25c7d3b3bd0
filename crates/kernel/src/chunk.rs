use glam::UVec3;
use tilescape_common::{Block, BlockPos, ChunkCoord, LocalPos, TILE_SIZE};

const SIDE: usize = TILE_SIZE as usize;

/// Dense `TILE_SIZE x TILE_SIZE x height` column of blocks.
///
/// Storage order is x fastest, then y, then z. A chunk never exists in a
/// partially populated state: every constructor fills all cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    coord: ChunkCoord,
    height: i32,
    blocks: Vec<Block>,
}

impl Chunk {
    /// A chunk with every cell set to `block`.
    pub fn filled(coord: ChunkCoord, height: i32, block: Block) -> Self {
        assert!(height > 0, "chunk height must be positive");
        Self {
            coord,
            height,
            blocks: vec![block; SIDE * SIDE * height as usize],
        }
    }

    /// Build a chunk by evaluating `f` at every absolute position it covers.
    pub fn from_fn(coord: ChunkCoord, height: i32, mut f: impl FnMut(BlockPos) -> Block) -> Self {
        assert!(height > 0, "chunk height must be positive");
        let mut blocks = Vec::with_capacity(SIDE * SIDE * height as usize);
        for z in 0..height as usize {
            for y in 0..SIDE {
                for x in 0..SIDE {
                    blocks.push(f(coord.block_at(LocalPos::new(x, y, z))));
                }
            }
        }
        Self {
            coord,
            height,
            blocks,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn get(&self, local: LocalPos) -> &Block {
        &self.blocks[self.index(local)]
    }

    /// Replace the block at `local`, returning the previous value.
    pub fn set(&mut self, local: LocalPos, block: Block) -> Block {
        let i = self.index(local);
        std::mem::replace(&mut self.blocks[i], block)
    }

    /// Number of non-empty cells.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_empty()).count()
    }

    /// Iterate every cell with its absolute position.
    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, &Block)> + '_ {
        self.blocks.iter().enumerate().map(|(i, b)| {
            let local = LocalPos::new(i % SIDE, (i / SIDE) % SIDE, i / (SIDE * SIDE));
            (self.coord.block_at(local), b)
        })
    }

    fn index(&self, local: LocalPos) -> usize {
        debug_assert!(local.x < SIDE && local.y < SIDE && (local.z as i32) < self.height);
        (local.z * SIDE + local.y) * SIDE + local.x
    }
}

/// Dense copy of an axis-aligned box of blocks, indexed relative to its
/// minimum corner.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockArray {
    min: BlockPos,
    dims: UVec3,
    blocks: Vec<Block>,
}

impl BlockArray {
    pub(crate) fn new(min: BlockPos, dims: UVec3) -> Self {
        Self {
            min,
            dims,
            blocks: vec![Block::Empty; (dims.x * dims.y * dims.z) as usize],
        }
    }

    /// Absolute position of element `[0][0][0]`.
    pub fn min(&self) -> BlockPos {
        self.min
    }

    /// Extent along x, y and z.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at an offset relative to [`BlockArray::min`].
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<&Block> {
        if x >= self.dims.x || y >= self.dims.y || z >= self.dims.z {
            return None;
        }
        self.blocks.get(self.index(x, y, z))
    }

    /// Iterate every element with its absolute position.
    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, &Block)> + '_ {
        let (nx, ny) = (self.dims.x as usize, self.dims.y as usize);
        self.blocks.iter().enumerate().map(move |(i, b)| {
            let pos = BlockPos::new(
                self.min.x + (i % nx) as i32,
                self.min.y + ((i / nx) % ny) as i32,
                self.min.z + (i / (nx * ny)) as i32,
            );
            (pos, b)
        })
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, z: u32, block: Block) {
        let i = self.index(x, y, z);
        self.blocks[i] = block;
    }

    fn index(&self, x: u32, y: u32, z: u32) -> usize {
        ((z * self.dims.y + y) * self.dims.x + x) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_chunk_is_fully_populated() {
        let c = Chunk::filled(ChunkCoord::new(0, 0), 4, Block::material("stone"));
        assert_eq!(c.solid_count(), SIDE * SIDE * 4);
        assert_eq!(c.iter().count(), SIDE * SIDE * 4);
    }

    #[test]
    fn set_returns_previous_block() {
        let mut c = Chunk::filled(ChunkCoord::new(2, -1), 4, Block::Empty);
        let local = LocalPos::new(3, 7, 2);
        let old = c.set(local, Block::material("dirt"));
        assert_eq!(old, Block::Empty);
        assert_eq!(c.get(local), &Block::material("dirt"));
        assert_eq!(c.solid_count(), 1);
    }

    #[test]
    fn from_fn_sees_absolute_positions() {
        let coord = ChunkCoord::new(-1, 3);
        let c = Chunk::from_fn(coord, 2, |pos| {
            if pos.x == -8 && pos.y == 24 && pos.z == 1 {
                Block::material("marker")
            } else {
                Block::Empty
            }
        });
        assert_eq!(c.get(LocalPos::new(0, 0, 1)), &Block::material("marker"));
        assert_eq!(c.solid_count(), 1);
    }

    #[test]
    fn iter_positions_match_storage() {
        let coord = ChunkCoord::new(1, 1);
        let c = Chunk::from_fn(coord, 3, |pos| Block::material(format!("{}", pos.z)));
        for (pos, block) in c.iter() {
            assert_eq!(block, c.get(pos.local()));
            assert!(coord.contains(pos));
        }
    }

    #[test]
    fn block_array_bounds() {
        let arr = BlockArray::new(BlockPos::new(0, 0, 0), UVec3::new(2, 3, 4));
        assert_eq!(arr.len(), 24);
        assert!(arr.get(1, 2, 3).is_some());
        assert!(arr.get(2, 0, 0).is_none());
        assert!(arr.get(0, 0, 4).is_none());
    }
}
