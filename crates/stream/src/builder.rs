use tilescape_common::{Block, ChunkCoord};
use tilescape_kernel::WorldStore;
use tilescape_render::{GridIndex, Projection, Tile};

use crate::grid::StreamError;

/// Build the tile for `chunk` from the current store contents.
///
/// Every non-empty block gets a node; fully enclosed blocks are not culled.
pub fn build_tile(
    store: &mut WorldStore,
    projection: Projection,
    chunk: ChunkCoord,
    index: GridIndex,
) -> Result<Tile, StreamError> {
    let _span = tracing::trace_span!("build_tile", %chunk).entered();
    WorldStore::check_chunk(chunk)?;
    let mut tile = Tile::new(chunk, index, projection);
    let (min, max) = tile.world_box();
    let blocks = store.get_block_array(min, max)?;
    for (pos, block) in blocks.iter() {
        if let Block::Material(kind) = block {
            tile.upsert_block(pos, kind.clone());
        }
    }
    Ok(tile)
}
