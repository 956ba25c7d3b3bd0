use glam::DVec2;
use std::collections::BTreeMap;
use tilescape_author::Stage;
use tilescape_common::{Block, BlockPos, ChunkCoord, RenderBlockPos};
use tilescape_kernel::WorldStore;
use tilescape_render::{GridIndex, Projection};
use tilescape_stream::ViewportGrid;

/// Stage inspector for developer tooling.
///
/// Provides read-only queries for debugging, profiling, and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the stage.
    pub fn summary(stage: &Stage) -> StageSummary {
        let store = stage.store();
        let grid = stage.grid();
        let editor = stage.bridge().editor();
        StageSummary {
            dimension: store.dimension().to_string(),
            seed: store.seed().to_string(),
            height: store.height(),
            ticks: stage.ticks(),
            chunks_loaded: store.chunk_count(),
            dimensions: grid.dimensions(),
            net_shift: grid.net_shift(),
            nodes: grid.node_count(),
            undo_depth: editor.undo_count(),
            redo_depth: editor.redo_count(),
            pending_events: store.events().len(),
            events_processed: stage.events_processed(),
        }
    }

    /// Describe the block at `pos` if its chunk has been generated.
    pub fn inspect_block(store: &WorldStore, pos: BlockPos) -> Option<BlockInfo> {
        let block = store.peek_block(pos)?.clone();
        let projection = Projection::new(store.height());
        let render = projection.data_to_render(pos);
        Some(BlockInfo {
            pos,
            chunk: pos.chunk_coord(),
            block,
            render,
            screen: projection.project(render),
            draw_key: Projection::draw_key(render),
        })
    }

    /// Per-kind node counts of the tile at `index`.
    pub fn inspect_tile(grid: &ViewportGrid, index: GridIndex) -> Option<TileInfo> {
        let tile = grid.tile(index)?;
        let mut kinds = BTreeMap::new();
        for node in tile.nodes() {
            *kinds.entry(node.kind.to_string()).or_insert(0) += 1;
        }
        Some(TileInfo {
            index: tile.index(),
            chunk: tile.chunk(),
            origin: tile.origin(),
            nodes: tile.node_count(),
            kinds,
        })
    }

    /// Every generated chunk, in coordinate order.
    pub fn list_chunks(store: &WorldStore) -> Vec<ChunkCoord> {
        store.chunks().map(|c| c.coord()).collect()
    }
}

/// Summary of stage state for the inspector.
#[derive(Debug, Clone)]
pub struct StageSummary {
    pub dimension: String,
    pub seed: String,
    pub height: i32,
    pub ticks: u64,
    pub chunks_loaded: usize,
    /// `(rows, cols)` of the viewport window.
    pub dimensions: (usize, usize),
    pub net_shift: (i32, i32),
    pub nodes: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub pending_events: usize,
    pub events_processed: u64,
}

impl std::fmt::Display for StageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: dimension={} seed={:?} height={} ticks={} chunks={} window={}x{} \
             shift=({}, {}) nodes={} undo={} redo={} pending_events={} events_processed={}",
            self.dimension,
            self.seed,
            self.height,
            self.ticks,
            self.chunks_loaded,
            self.dimensions.0,
            self.dimensions.1,
            self.net_shift.0,
            self.net_shift.1,
            self.nodes,
            self.undo_depth,
            self.redo_depth,
            self.pending_events,
            self.events_processed,
        )
    }
}

/// Detailed info about a single block.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub pos: BlockPos,
    pub chunk: ChunkCoord,
    pub block: Block,
    pub render: RenderBlockPos,
    pub screen: DVec2,
    pub draw_key: i64,
}

impl std::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Block {} chunk={} {} render=({}, {}, {}) screen=({:.2}, {:.2}) key={}",
            self.pos,
            self.chunk,
            self.block,
            self.render.x,
            self.render.y,
            self.render.z,
            self.screen.x,
            self.screen.y,
            self.draw_key,
        )
    }
}

/// Node breakdown of one tile.
#[derive(Debug, Clone)]
pub struct TileInfo {
    pub index: GridIndex,
    pub chunk: ChunkCoord,
    pub origin: DVec2,
    pub nodes: usize,
    pub kinds: BTreeMap<String, usize>,
}

impl std::fmt::Display for TileInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tile {} chunk={} origin=({:.1}, {:.1}) nodes={}",
            self.index, self.chunk, self.origin.x, self.origin.y, self.nodes
        )?;
        for (kind, count) in &self.kinds {
            write!(f, " {kind}={count}")?;
        }
        Ok(())
    }
}
