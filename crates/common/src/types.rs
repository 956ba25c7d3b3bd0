use glam::IVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Direction, TILE_SIZE};

/// Identity of a visual block node in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute block position in data space. `z` is vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk owning this position (`floor(pos / TILE_SIZE)` on x and y).
    pub fn chunk_coord(self) -> ChunkCoord {
        ChunkCoord {
            x: self.x.div_euclid(TILE_SIZE),
            y: self.y.div_euclid(TILE_SIZE),
        }
    }

    /// Offset of this position inside its chunk. `z` is passed through and
    /// must already be range-checked by the caller.
    pub fn local(self) -> LocalPos {
        LocalPos {
            x: self.x.rem_euclid(TILE_SIZE) as usize,
            y: self.y.rem_euclid(TILE_SIZE) as usize,
            z: self.z as usize,
        }
    }

    /// The neighbouring position one step toward `dir`.
    pub fn step(self, dir: Direction) -> Self {
        self + dir.offset()
    }

    /// Like [`step`](Self::step), but `None` past the edge of `i32` space.
    pub fn checked_step(self, dir: Direction) -> Option<Self> {
        let d = dir.offset();
        Some(Self::new(
            self.x.checked_add(d.x)?,
            self.y.checked_add(d.y)?,
            self.z.checked_add(d.z)?,
        ))
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> Self {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl std::ops::Add<IVec3> for BlockPos {
    type Output = BlockPos;

    fn add(self, rhs: IVec3) -> BlockPos {
        BlockPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Chunk coordinate on the horizontal plane.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    /// Smallest chunk coordinate whose blocks are addressable as `i32`.
    pub const MIN: i32 = i32::MIN / TILE_SIZE;
    /// Largest chunk coordinate whose blocks are addressable as `i32`.
    pub const MAX: i32 = i32::MAX / TILE_SIZE;

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether every block of this chunk has an `i32` data position.
    ///
    /// Every chunk derived from a [`BlockPos`] is addressable. Coordinates
    /// supplied from outside (a configured window center, a panned window)
    /// must be checked before [`min_block`](Self::min_block) is used.
    pub fn is_addressable(self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.x) && (Self::MIN..=Self::MAX).contains(&self.y)
    }

    /// Data-space position of the chunk's lowest corner (z = 0).
    ///
    /// Only defined for [addressable](Self::is_addressable) chunks.
    pub fn min_block(self) -> BlockPos {
        BlockPos::new(self.x * TILE_SIZE, self.y * TILE_SIZE, 0)
    }

    /// Whether `pos` falls into this chunk's column, ignoring height.
    pub fn contains(self, pos: BlockPos) -> bool {
        pos.chunk_coord() == self
    }

    /// Absolute position of a local offset inside this chunk.
    pub fn block_at(self, local: LocalPos) -> BlockPos {
        let min = self.min_block();
        BlockPos::new(
            min.x + local.x as i32,
            min.y + local.y as i32,
            local.z as i32,
        )
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Offset of a block inside its chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

/// Block position in render space: x right, y down from the top layer, z
/// toward the viewer along the projected depth axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderBlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl RenderBlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::ops::Add for RenderBlockPos {
    type Output = RenderBlockPos;

    fn add(self, rhs: RenderBlockPos) -> RenderBlockPos {
        RenderBlockPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for RenderBlockPos {
    type Output = RenderBlockPos;

    fn sub(self, rhs: RenderBlockPos) -> RenderBlockPos {
        RenderBlockPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_uniqueness() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn chunk_coord_floors_negative_positions() {
        assert_eq!(BlockPos::new(0, 0, 3).chunk_coord(), ChunkCoord::new(0, 0));
        assert_eq!(BlockPos::new(7, 8, 3).chunk_coord(), ChunkCoord::new(0, 1));
        assert_eq!(BlockPos::new(-1, -8, 0).chunk_coord(), ChunkCoord::new(-1, -1));
        assert_eq!(BlockPos::new(-9, 0, 0).chunk_coord(), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn local_offset_wraps_into_chunk() {
        let local = BlockPos::new(-1, 9, 5).local();
        assert_eq!(local, LocalPos::new(7, 1, 5));
    }

    #[test]
    fn block_at_inverts_local() {
        for pos in [
            BlockPos::new(-13, 4, 2),
            BlockPos::new(31, -1, 0),
            BlockPos::new(0, 0, 15),
        ] {
            assert_eq!(pos.chunk_coord().block_at(pos.local()), pos);
        }
    }

    #[test]
    fn chunk_contains_ignores_height() {
        let c = ChunkCoord::new(1, -1);
        assert!(c.contains(BlockPos::new(8, -8, 100)));
        assert!(!c.contains(BlockPos::new(16, -8, 0)));
    }

    #[test]
    fn addressable_range_covers_every_block_position() {
        for pos in [
            BlockPos::new(i32::MIN, i32::MIN, 0),
            BlockPos::new(i32::MAX, i32::MAX, 0),
        ] {
            let chunk = pos.chunk_coord();
            assert!(chunk.is_addressable());
            assert_eq!(chunk.block_at(pos.local()), pos);
        }
        assert!(!ChunkCoord::new(ChunkCoord::MAX + 1, 0).is_addressable());
        assert!(!ChunkCoord::new(0, ChunkCoord::MIN - 1).is_addressable());
        assert!(!ChunkCoord::new(300_000_000, 0).is_addressable());
    }

    #[test]
    fn step_follows_direction() {
        let p = BlockPos::new(1, 1, 1);
        assert_eq!(p.step(Direction::North), BlockPos::new(1, 0, 1));
        assert_eq!(p.step(Direction::Up), BlockPos::new(1, 1, 2));
    }

    #[test]
    fn checked_step_stops_at_world_edge() {
        let edge = BlockPos::new(i32::MAX, 0, 0);
        assert_eq!(edge.checked_step(Direction::East), None);
        assert_eq!(edge.checked_step(Direction::West), Some(BlockPos::new(i32::MAX - 1, 0, 0)));
    }
}
