use tilescape_common::{Block, BlockKind, BlockPos, ChunkCoord, Direction, NodeId};
use tilescape_kernel::{WorldError, WorldStore};
use tilescape_render::{GridIndex, Palette, PaletteError};
use tilescape_stream::{NodeHit, SceneDelta, StreamError, ViewportGrid};

use crate::config::ConfigError;
use crate::editor::{EditCommand, EditKind, Editor};

/// Errors from edit operations.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no block type selected for placement")]
    NothingSelected,
    #[error("node {0:?} is not in tile {1}")]
    UnknownNode(NodeId, GridIndex),
}

/// A committed edit and what it did to the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub command: EditCommand,
    pub delta: SceneDelta,
}

impl EditOutcome {
    pub fn kind(&self) -> EditKind {
        self.command.kind()
    }
}

/// Executes the place/remove protocol between the scene and the world store.
///
/// Holds the block type currently selected by the inventory and the edit
/// history. The facing direction is passed in per click rather than read
/// from shared input state.
#[derive(Debug, Default)]
pub struct SceneBridge {
    selected: Option<BlockKind>,
    editor: Editor,
}

impl SceneBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&BlockKind> {
        self.selected.as_ref()
    }

    /// Select the block type used by subsequent placements. The palette must
    /// know the type.
    pub fn select_block_type(
        &mut self,
        palette: &Palette,
        name: &str,
    ) -> Result<BlockKind, EditError> {
        let kind = palette.resolve(name)?;
        tracing::debug!(%kind, "block type selected");
        self.selected = Some(kind.clone());
        Ok(kind)
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Handle a click on a block node.
    ///
    /// With a facing latched, places the selected type on the neighbor in
    /// that direction. Without one, removes the clicked block.
    pub fn click(
        &mut self,
        store: &mut WorldStore,
        grid: &mut ViewportGrid,
        hit: NodeHit,
        facing: Option<Direction>,
    ) -> Result<EditOutcome, EditError> {
        // Resolved from the tile origin and the node's render offset.
        let clicked = grid
            .tile(hit.index)
            .and_then(|tile| tile.node(hit.node).map(|node| tile.block_pos(node)))
            .ok_or(EditError::UnknownNode(hit.node, hit.index))?;

        match facing {
            Some(dir) => self.place(store, grid, hit.index, clicked, dir),
            None => self.remove(store, grid, hit.index, clicked),
        }
    }

    fn place(
        &mut self,
        store: &mut WorldStore,
        grid: &mut ViewportGrid,
        from: GridIndex,
        clicked: BlockPos,
        dir: Direction,
    ) -> Result<EditOutcome, EditError> {
        let kind = self.selected.clone().ok_or(EditError::NothingSelected)?;
        let Some(target) = clicked.checked_step(dir) else {
            // Past the edge of the world there is no tile to reach.
            let here = clicked.chunk_coord();
            let d = dir.offset();
            return Err(StreamError::GridInvariantViolation {
                from,
                target: ChunkCoord::new(here.x + d.x, here.y + d.y),
            }
            .into());
        };
        let index = match grid.tile(from) {
            Some(tile) if tile.contains(target) => from,
            _ => grid.adjacent(from, target.chunk_coord())?,
        };
        self.commit(store, grid, index, target, Block::Material(kind))
    }

    fn remove(
        &mut self,
        store: &mut WorldStore,
        grid: &mut ViewportGrid,
        index: GridIndex,
        clicked: BlockPos,
    ) -> Result<EditOutcome, EditError> {
        self.commit(store, grid, index, clicked, Block::Empty)
    }

    /// Write to the store, then derive the scene change from what the store
    /// now holds.
    fn commit(
        &mut self,
        store: &mut WorldStore,
        grid: &mut ViewportGrid,
        index: GridIndex,
        pos: BlockPos,
        block: Block,
    ) -> Result<EditOutcome, EditError> {
        let old = store.set_block(pos, block.clone())?;
        let delta = grid.refresh_block(store, index, pos)?;
        let command = EditCommand { pos, old, new: block };
        tracing::debug!(%pos, kind = ?command.kind(), "edit committed");
        self.editor.record(command.clone());
        Ok(EditOutcome { command, delta })
    }

    /// Revert the last edit. The scene is refreshed only if the edited
    /// block's tile is still in the window.
    pub fn undo(
        &mut self,
        store: &mut WorldStore,
        grid: &mut ViewportGrid,
    ) -> Result<Option<EditOutcome>, EditError> {
        let Some(cmd) = self.editor.take_undo() else {
            return Ok(None);
        };
        match apply(store, grid, &cmd.inverse()) {
            Ok(delta) => {
                let outcome = EditOutcome {
                    command: cmd.inverse(),
                    delta,
                };
                self.editor.undone(cmd);
                Ok(Some(outcome))
            }
            Err(e) => {
                self.editor.restore_undo(cmd);
                Err(e)
            }
        }
    }

    /// Re-apply the last undone edit.
    pub fn redo(
        &mut self,
        store: &mut WorldStore,
        grid: &mut ViewportGrid,
    ) -> Result<Option<EditOutcome>, EditError> {
        let Some(cmd) = self.editor.take_redo() else {
            return Ok(None);
        };
        match apply(store, grid, &cmd) {
            Ok(delta) => {
                let outcome = EditOutcome {
                    command: cmd.clone(),
                    delta,
                };
                self.editor.redone(cmd);
                Ok(Some(outcome))
            }
            Err(e) => {
                self.editor.restore_redo(cmd);
                Err(e)
            }
        }
    }
}

fn apply(
    store: &mut WorldStore,
    grid: &mut ViewportGrid,
    cmd: &EditCommand,
) -> Result<SceneDelta, EditError> {
    store.set_block(cmd.pos, cmd.new.clone())?;
    let delta = match grid.locate(cmd.pos.chunk_coord()) {
        Some(index) => grid.refresh_block(store, index, cmd.pos)?,
        None => SceneDelta::Unchanged,
    };
    tracing::debug!(pos = %cmd.pos, kind = ?cmd.kind(), "history applied");
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilescape_stream::ViewportConfig;

    fn setup() -> (WorldStore, ViewportGrid, Palette) {
        let mut store = WorldStore::with_seed("seed");
        let grid = ViewportGrid::new(
            &mut store,
            ViewportConfig {
                width: 640.0,
                height: 480.0,
                ..ViewportConfig::default()
            },
            ChunkCoord::new(0, 0),
        )
        .unwrap();
        (store, grid, Palette::with_defaults())
    }

    /// Hit on the topmost block of column (x, y).
    fn hit_column(store: &mut WorldStore, grid: &ViewportGrid, x: i32, y: i32) -> NodeHit {
        let index = grid.locate(BlockPos::new(x, y, 0).chunk_coord()).unwrap();
        let z = (0..store.height())
            .rev()
            .find(|&z| !store.get_block(BlockPos::new(x, y, z)).unwrap().is_empty())
            .unwrap();
        let pos = BlockPos::new(x, y, z);
        let node = grid.tile(index).unwrap().node_at(pos).unwrap();
        NodeHit {
            index,
            node: node.id,
            pos,
        }
    }

    #[test]
    fn remove_without_facing() {
        let (mut store, mut grid, _) = setup();
        let mut bridge = SceneBridge::new();
        let hit = hit_column(&mut store, &grid, 3, 3);

        let outcome = bridge.click(&mut store, &mut grid, hit, None).unwrap();
        assert_eq!(outcome.kind(), EditKind::Remove);
        assert_eq!(outcome.command.pos, hit.pos);
        assert!(matches!(outcome.delta, SceneDelta::Removed { node, .. } if node == hit.node));
        assert!(store.get_block(hit.pos).unwrap().is_empty());
        assert!(grid.tile(hit.index).unwrap().node(hit.node).is_none());
    }

    #[test]
    fn place_on_latched_neighbor() {
        let (mut store, mut grid, palette) = setup();
        let mut bridge = SceneBridge::new();
        bridge.select_block_type(&palette, "stone").unwrap();
        let hit = hit_column(&mut store, &grid, 3, 3);

        let outcome = bridge
            .click(&mut store, &mut grid, hit, Some(Direction::Up))
            .unwrap();
        let target = BlockPos::new(3, 3, hit.pos.z + 1);
        assert_eq!(outcome.command.pos, target);
        assert_eq!(store.get_block(target).unwrap(), Block::material("stone"));
        let node = grid.tile(hit.index).unwrap().node_at(target).unwrap();
        assert_eq!(node.kind.as_str(), "stone");
    }

    #[test]
    fn place_across_tile_boundary_uses_adjacent_tile() {
        let (mut store, mut grid, palette) = setup();
        let mut bridge = SceneBridge::new();
        bridge.select_block_type(&palette, "stone").unwrap();
        // x = 0 is the west edge of chunk (0, 0).
        let hit = hit_column(&mut store, &grid, 0, 4);

        let outcome = bridge
            .click(&mut store, &mut grid, hit, Some(Direction::West))
            .unwrap();
        let target = BlockPos::new(-1, 4, hit.pos.z);
        let west = grid.locate(ChunkCoord::new(-1, 0)).unwrap();
        assert!(matches!(outcome.delta, SceneDelta::Added { index, .. } if index == west));
        assert!(grid.tile(west).unwrap().node_at(target).is_some());
        assert!(grid.tile(hit.index).unwrap().node_at(target).is_none());
    }

    #[test]
    fn place_beyond_window_edge_is_rejected_before_write() {
        let (mut store, mut grid, palette) = setup();
        let mut bridge = SceneBridge::new();
        bridge.select_block_type(&palette, "stone").unwrap();
        // West edge column of a tile in the window's first column.
        let edge = GridIndex::new(2, 0);
        let min = grid.chunk_at(edge).min_block();
        let hit = hit_column(&mut store, &grid, min.x, min.y + 3);
        assert_eq!(hit.index, edge);
        let before = store.events().len();

        let err = bridge
            .click(&mut store, &mut grid, hit, Some(Direction::West))
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::Stream(StreamError::GridInvariantViolation { from, .. }) if from == edge
        ));
        assert_eq!(store.events().len(), before);
        assert!(!store.is_loaded(hit.pos.step(Direction::West).chunk_coord()));
        assert!(!bridge.editor().can_undo());
    }

    #[test]
    fn place_past_world_edge_is_rejected() {
        let mut store = WorldStore::with_seed("seed");
        let center = ChunkCoord::new(ChunkCoord::MAX - 4, 0);
        let config = ViewportConfig {
            width: 640.0,
            height: 480.0,
            ..ViewportConfig::default()
        };
        let mut grid = ViewportGrid::new(&mut store, config, center).unwrap();
        let mut bridge = SceneBridge::new();
        bridge
            .select_block_type(&Palette::with_defaults(), "stone")
            .unwrap();
        let hit = hit_column(&mut store, &grid, i32::MAX, 3);
        let before = store.events().len();

        let err = bridge
            .click(&mut store, &mut grid, hit, Some(Direction::East))
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::Stream(StreamError::GridInvariantViolation { target, .. })
                if target.x == ChunkCoord::MAX + 1
        ));
        assert_eq!(store.events().len(), before);
        assert!(!bridge.editor().can_undo());
    }

    #[test]
    fn place_requires_selection() {
        let (mut store, mut grid, _) = setup();
        let mut bridge = SceneBridge::new();
        let hit = hit_column(&mut store, &grid, 3, 3);
        let before = store.events().len();
        assert!(matches!(
            bridge.click(&mut store, &mut grid, hit, Some(Direction::North)),
            Err(EditError::NothingSelected)
        ));
        assert_eq!(store.events().len(), before);
    }

    #[test]
    fn place_above_world_is_rejected_without_changes() {
        let (mut store, mut grid, palette) = setup();
        let mut bridge = SceneBridge::new();
        bridge.select_block_type(&palette, "stone").unwrap();
        let index = grid.locate(ChunkCoord::new(0, 0)).unwrap();
        let top = BlockPos::new(2, 2, store.height() - 1);
        store.set_block(top, Block::material("stone")).unwrap();
        grid.refresh_block(&mut store, index, top).unwrap();
        let node = grid.tile(index).unwrap().node_at(top).unwrap().id;
        let hit = NodeHit {
            index,
            node,
            pos: top,
        };

        let err = bridge
            .click(&mut store, &mut grid, hit, Some(Direction::Up))
            .unwrap_err();
        assert!(matches!(err, EditError::World(WorldError::OutOfRange { .. })));
        assert!(!bridge.editor().can_undo());
    }

    #[test]
    fn unknown_block_type_cannot_be_selected() {
        let mut bridge = SceneBridge::new();
        assert!(matches!(
            bridge.select_block_type(&Palette::with_defaults(), "unobtainium"),
            Err(EditError::Palette(PaletteError::UnknownBlockType(_)))
        ));
        assert!(bridge.selected().is_none());
    }

    #[test]
    fn stale_node_is_rejected() {
        let (mut store, mut grid, _) = setup();
        let mut bridge = SceneBridge::new();
        let hit = hit_column(&mut store, &grid, 3, 3);
        bridge.click(&mut store, &mut grid, hit, None).unwrap();
        assert!(matches!(
            bridge.click(&mut store, &mut grid, hit, None),
            Err(EditError::UnknownNode(..))
        ));
    }

    #[test]
    fn undo_and_redo_restore_store_and_scene() {
        let (mut store, mut grid, _) = setup();
        let mut bridge = SceneBridge::new();
        let hit = hit_column(&mut store, &grid, 5, 1);
        let original = store.get_block(hit.pos).unwrap();
        bridge.click(&mut store, &mut grid, hit, None).unwrap();

        let undone = bridge.undo(&mut store, &mut grid).unwrap().unwrap();
        assert_eq!(undone.kind(), EditKind::Place);
        assert_eq!(store.get_block(hit.pos).unwrap(), original);
        let node = grid.tile(hit.index).unwrap().node_at(hit.pos).unwrap();
        assert_eq!(Some(&node.kind), original.kind());

        let redone = bridge.redo(&mut store, &mut grid).unwrap().unwrap();
        assert_eq!(redone.kind(), EditKind::Remove);
        assert!(store.get_block(hit.pos).unwrap().is_empty());
        assert!(grid.tile(hit.index).unwrap().node_at(hit.pos).is_none());

        assert!(bridge.redo(&mut store, &mut grid).unwrap().is_none());
    }

    #[test]
    fn undo_of_evicted_edit_updates_store_only() {
        let (mut store, mut grid, _) = setup();
        let mut bridge = SceneBridge::new();
        let hit = hit_column(&mut store, &grid, 5, 1);
        let original = store.get_block(hit.pos).unwrap();
        bridge.click(&mut store, &mut grid, hit, None).unwrap();

        let w = grid.projection().edge() * 8.0;
        grid.pan(glam::DVec2::new(w * 10.0, 0.0));
        for _ in 0..12 {
            grid.maintain(&mut store).unwrap();
        }
        assert!(grid.locate(ChunkCoord::new(0, 0)).is_none());

        let undone = bridge.undo(&mut store, &mut grid).unwrap().unwrap();
        assert_eq!(undone.delta, SceneDelta::Unchanged);
        assert_eq!(store.get_block(hit.pos).unwrap(), original);
    }
}
