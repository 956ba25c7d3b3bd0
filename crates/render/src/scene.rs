use glam::DVec2;
use std::collections::{BTreeMap, HashMap};
use tilescape_common::{BlockKind, BlockPos, ChunkCoord, NodeId, RenderBlockPos};

use crate::projection::Projection;

/// Position of a tile in the viewport matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

impl GridIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for GridIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Visual node for one non-empty block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub id: NodeId,
    /// Render position relative to the owning tile's render origin.
    pub local: RenderBlockPos,
    pub kind: BlockKind,
    /// Scene-space screen position of the block's render corner.
    pub screen: DVec2,
    pub draw_key: i64,
}

/// Render-side container for one chunk-sized world box.
///
/// Owns the block nodes of its box. Nodes are keyed by their local render
/// position, so a cell holds at most one node.
#[derive(Debug)]
pub struct Tile {
    chunk: ChunkCoord,
    index: GridIndex,
    projection: Projection,
    origin_render: RenderBlockPos,
    origin: DVec2,
    nodes: BTreeMap<RenderBlockPos, BlockNode>,
    by_id: HashMap<NodeId, RenderBlockPos>,
}

impl Tile {
    /// An empty tile covering `chunk`.
    pub fn new(chunk: ChunkCoord, index: GridIndex, projection: Projection) -> Self {
        let mut top = chunk.min_block();
        top.z = projection.height() - 1;
        let origin_render = projection.data_to_render(top);
        Self {
            chunk,
            index,
            projection,
            origin_render,
            origin: projection.project(origin_render),
            nodes: BTreeMap::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn chunk(&self) -> ChunkCoord {
        self.chunk
    }

    /// The matrix index stamped by the last reindex pass.
    pub fn index(&self) -> GridIndex {
        self.index
    }

    pub fn set_index(&mut self, index: GridIndex) {
        self.index = index;
    }

    /// Render position of the world-box origin (top layer, min x, min y).
    pub fn origin_render(&self) -> RenderBlockPos {
        self.origin_render
    }

    /// Scene-space screen position of the world-box origin.
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    /// Inclusive data-space box this tile covers.
    pub fn world_box(&self) -> (BlockPos, BlockPos) {
        let min = self.chunk.min_block();
        let max = BlockPos::new(
            min.x + tilescape_common::TILE_SIZE - 1,
            min.y + tilescape_common::TILE_SIZE - 1,
            self.projection.height() - 1,
        );
        (min, max)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.chunk.contains(pos) && (0..self.projection.height()).contains(&pos.z)
    }

    /// Add (or replace) the node for the block at `pos`.
    pub fn upsert_block(&mut self, pos: BlockPos, kind: BlockKind) -> NodeId {
        debug_assert!(self.contains(pos), "{pos} outside tile {}", self.chunk);
        let absolute = self.projection.data_to_render(pos);
        let local = absolute - self.origin_render;
        let node = BlockNode {
            id: NodeId::new(),
            local,
            kind,
            screen: self.origin + self.projection.project(local),
            draw_key: Projection::draw_key(absolute),
        };
        let id = node.id;
        if let Some(old) = self.nodes.insert(local, node) {
            self.by_id.remove(&old.id);
        }
        self.by_id.insert(id, local);
        id
    }

    /// Remove the node for the block at `pos`, if any.
    pub fn remove_block(&mut self, pos: BlockPos) -> Option<BlockNode> {
        let local = self.projection.data_to_render(pos) - self.origin_render;
        let node = self.nodes.remove(&local)?;
        self.by_id.remove(&node.id);
        Some(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&BlockNode> {
        self.by_id.get(&id).and_then(|local| self.nodes.get(local))
    }

    pub fn node_at(&self, pos: BlockPos) -> Option<&BlockNode> {
        let local = self.projection.data_to_render(pos) - self.origin_render;
        self.nodes.get(&local)
    }

    /// Absolute data position of a node, from the tile origin plus the
    /// node's local render position.
    pub fn block_pos(&self, node: &BlockNode) -> BlockPos {
        self.projection
            .render_to_data(self.origin_render + node.local)
    }

    /// Absolute render position of a node.
    pub fn render_pos(&self, node: &BlockNode) -> RenderBlockPos {
        self.origin_render + node.local
    }

    pub fn nodes(&self) -> impl Iterator<Item = &BlockNode> + '_ {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> Tile {
        Tile::new(ChunkCoord::new(1, -2), GridIndex::new(0, 0), Projection::new(16))
    }

    #[test]
    fn origin_is_top_corner_of_world_box() {
        let t = tile();
        assert_eq!(t.origin_render(), RenderBlockPos::new(8, 0, -16));
        let (min, max) = t.world_box();
        assert_eq!(min, BlockPos::new(8, -16, 0));
        assert_eq!(max, BlockPos::new(15, -9, 15));
    }

    #[test]
    fn node_screen_matches_absolute_projection() {
        let mut t = tile();
        let pos = BlockPos::new(11, -12, 5);
        let id = t.upsert_block(pos, BlockKind::new("stone"));
        let node = t.node(id).unwrap();
        let proj = Projection::new(16);
        let expected = proj.project(proj.data_to_render(pos));
        assert!((node.screen - expected).length() < 1e-9);
        assert_eq!(node.draw_key, Projection::draw_key(proj.data_to_render(pos)));
    }

    #[test]
    fn block_pos_recovers_data_position() {
        let mut t = tile();
        let pos = BlockPos::new(15, -9, 0);
        let id = t.upsert_block(pos, BlockKind::new("dirt"));
        let node = t.node(id).unwrap().clone();
        assert_eq!(t.block_pos(&node), pos);
    }

    #[test]
    fn upsert_replaces_existing_node() {
        let mut t = tile();
        let pos = BlockPos::new(9, -10, 3);
        let first = t.upsert_block(pos, BlockKind::new("dirt"));
        let second = t.upsert_block(pos, BlockKind::new("grass"));
        assert_eq!(t.node_count(), 1);
        assert!(t.node(first).is_none());
        assert_eq!(t.node(second).unwrap().kind, BlockKind::new("grass"));
    }

    #[test]
    fn remove_block_drops_node() {
        let mut t = tile();
        let pos = BlockPos::new(9, -10, 3);
        let id = t.upsert_block(pos, BlockKind::new("dirt"));
        let removed = t.remove_block(pos).unwrap();
        assert_eq!(removed.id, id);
        assert!(t.node(id).is_none());
        assert!(t.node_at(pos).is_none());
        assert!(t.remove_block(pos).is_none());
    }

    #[test]
    fn contains_checks_box_and_height() {
        let t = tile();
        assert!(t.contains(BlockPos::new(8, -16, 0)));
        assert!(!t.contains(BlockPos::new(8, -16, 16)));
        assert!(!t.contains(BlockPos::new(16, -16, 0)));
    }
}
