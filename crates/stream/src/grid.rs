use glam::DVec2;
use std::collections::VecDeque;
use std::time::Instant;
use tilescape_common::{Block, BlockPos, ChunkCoord, NodeId, TILE_SIZE};
use tilescape_kernel::{WorldError, WorldStore};
use tilescape_render::{Frame, GridIndex, Projection, Tile, polygon_contains};

use crate::builder::build_tile;
use crate::config::ViewportConfig;
use crate::stats::{MaintenanceTimer, StreamStats};

/// Tiles of drift past an edge's share of the margin before it is shifted:
/// half a tile plus half a tile of hysteresis, so a camera resting on the
/// boundary cannot make the window oscillate.
const SHIFT_THRESHOLD: f64 = 0.5 + 0.5;

/// Errors from streaming and scene maintenance.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    World(#[from] WorldError),
    /// Matrix adjacency could not resolve a tile that must be loaded. This
    /// is a sizing bug (margin too small for the edit horizon), not a user
    /// error.
    #[error("grid invariant violated: no tile for chunk {target} reachable from {from}")]
    GridInvariantViolation { from: GridIndex, target: ChunkCoord },
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
}

/// An edge of the tile matrix. A boundary predicate is named after the edge
/// that has drifted too far out of view; that edge is evicted and the
/// opposite edge receives fresh tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// A resolved pointer hit on a block node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHit {
    pub index: GridIndex,
    pub node: NodeId,
    pub pos: BlockPos,
}

/// Change applied to the scene when a block is re-derived from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneDelta {
    Added { index: GridIndex, node: NodeId },
    Removed { index: GridIndex, node: NodeId },
    Unchanged,
}

/// The sliding window of tiles around the camera.
///
/// Rows run along data y and columns along data x. Tile `(r, c)` covers
/// chunk `(center.x - cols/2 + c + net_x_shift, center.y - rows/2 + r +
/// net_y_shift)`. Display order is matrix order, row-major.
#[derive(Debug)]
pub struct ViewportGrid {
    config: ViewportConfig,
    projection: Projection,
    tiles: VecDeque<VecDeque<Tile>>,
    rows: usize,
    cols: usize,
    center: ChunkCoord,
    net_x_shift: i32,
    net_y_shift: i32,
    /// Scene-space position of the viewport center.
    camera: DVec2,
    /// Half extent of the viewport measured in tiles along each lattice axis.
    view_half: DVec2,
    /// Render-space height of the plane on which edges are measured.
    reference_y: f64,
    stats: StreamStats,
    timer: MaintenanceTimer,
}

impl ViewportGrid {
    /// Build the full window centered on `center`, pulling every tile from
    /// the store.
    pub fn new(
        store: &mut WorldStore,
        config: ViewportConfig,
        center: ChunkCoord,
    ) -> Result<Self, StreamError> {
        let _span = tracing::info_span!("viewport_init", %center).entered();
        config.validate()?;
        WorldStore::check_chunk(center)?;
        let projection = Projection::with_zoom(store.height(), config.zoom);
        let view_half = view_half_extent(&projection, DVec2::new(config.width, config.height));
        let cols = (2.0 * view_half.x).ceil() as usize + config.margin_tiles;
        let rows = (2.0 * view_half.y).ceil() as usize + config.margin_tiles;
        let reference_y = store.height() as f64 / 2.0;
        let half_tile = TILE_SIZE as f64 / 2.0;
        let camera = projection.project_point(glam::DVec3::new(
            center.x as f64 * TILE_SIZE as f64 + half_tile,
            reference_y,
            center.y as f64 * TILE_SIZE as f64 + half_tile,
        ));

        let mut grid = Self {
            config,
            projection,
            tiles: VecDeque::with_capacity(rows),
            rows,
            cols,
            center,
            net_x_shift: 0,
            net_y_shift: 0,
            camera,
            view_half,
            reference_y,
            stats: StreamStats::default(),
            timer: MaintenanceTimer::default(),
        };

        for r in 0..rows {
            let mut row = VecDeque::with_capacity(cols);
            for c in 0..cols {
                let index = GridIndex::new(r, c);
                row.push_back(build_tile(store, projection, grid.chunk_at(index), index)?);
            }
            grid.tiles.push_back(row);
        }
        grid.stats.total_tiles = rows * cols;
        tracing::info!(rows, cols, nodes = grid.node_count(), "viewport initialized");
        Ok(grid)
    }

    /// `(rows, cols)` of the tile matrix. Fixed for the grid's lifetime.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn center(&self) -> ChunkCoord {
        self.center
    }

    /// Cumulative shift from the initial window, in tiles, as `(x, y)`.
    pub fn net_shift(&self) -> (i32, i32) {
        (self.net_x_shift, self.net_y_shift)
    }

    pub fn camera(&self) -> DVec2 {
        self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Statistics of the last maintenance pass.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn timer(&self) -> &MaintenanceTimer {
        &self.timer
    }

    /// Chunk covered by the tile at `(0, 0)`.
    pub fn origin_chunk(&self) -> ChunkCoord {
        ChunkCoord::new(
            self.center.x - (self.cols / 2) as i32 + self.net_x_shift,
            self.center.y - (self.rows / 2) as i32 + self.net_y_shift,
        )
    }

    /// Chunk the tile at `index` should cover under the current offsets.
    pub fn chunk_at(&self, index: GridIndex) -> ChunkCoord {
        let origin = self.origin_chunk();
        ChunkCoord::new(origin.x + index.col as i32, origin.y + index.row as i32)
    }

    pub fn tile(&self, index: GridIndex) -> Option<&Tile> {
        self.tiles.get(index.row).and_then(|row| row.get(index.col))
    }

    /// Tiles in display order (row-major).
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter().flat_map(|row| row.iter())
    }

    pub fn node_count(&self) -> usize {
        self.tiles().map(Tile::node_count).sum()
    }

    /// Index of the tile covering `chunk`, computed from the window offsets.
    pub fn locate(&self, chunk: ChunkCoord) -> Option<GridIndex> {
        let origin = self.origin_chunk();
        let col = chunk.x as i64 - origin.x as i64;
        let row = chunk.y as i64 - origin.y as i64;
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        Some(GridIndex::new(row as usize, col as usize))
    }

    /// Resolve the tile covering `target` by matrix adjacency from the tile
    /// at `from`.
    pub fn adjacent(
        &self,
        from: GridIndex,
        target: ChunkCoord,
    ) -> Result<GridIndex, StreamError> {
        let violation = || StreamError::GridInvariantViolation { from, target };
        let here = self.tile(from).ok_or_else(violation)?.chunk();
        let row = from.row as i64 + target.y as i64 - here.y as i64;
        let col = from.col as i64 + target.x as i64 - here.x as i64;
        if row < 0 || col < 0 {
            return Err(violation());
        }
        let index = GridIndex::new(row as usize, col as usize);
        match self.tile(index) {
            Some(tile) if tile.chunk() == target && tile.index() == index => Ok(index),
            _ => Err(violation()),
        }
    }

    /// Move the camera by `delta` scene pixels. Takes effect at the next
    /// maintenance pass.
    pub fn pan(&mut self, delta: DVec2) {
        self.camera += delta;
    }

    pub fn set_camera(&mut self, camera: DVec2) {
        self.camera = camera;
    }

    /// Camera position in fractional chunk coordinates.
    pub fn camera_chunk(&self) -> DVec2 {
        self.projection.screen_to_chunk(self.camera, self.reference_y)
    }

    /// Evaluate the four boundary predicates against the current camera.
    ///
    /// Distances are measured along the tile lattice axes, so the shear the
    /// projection gives rows does not leak into the column test.
    pub fn boundary_triggers(&self) -> Vec<Edge> {
        let cam = self.camera_chunk();
        let origin = self.origin_chunk();
        let (ox, oy) = (origin.x as f64, origin.y as f64);
        let (cols, rows) = (self.cols as f64, self.rows as f64);
        let slack = (DVec2::new(cols, rows) - 2.0 * self.view_half) / 2.0;
        let threshold = slack + DVec2::splat(SHIFT_THRESHOLD);

        let left_out = (cam.x - self.view_half.x) - ox;
        let right_out = (ox + cols) - (cam.x + self.view_half.x);
        let top_out = (cam.y - self.view_half.y) - oy;
        let bottom_out = (oy + rows) - (cam.y + self.view_half.y);

        let mut fired = Vec::with_capacity(2);
        if left_out > threshold.x {
            fired.push(Edge::Left);
        } else if right_out > threshold.x {
            fired.push(Edge::Right);
        }
        if top_out > threshold.y {
            fired.push(Edge::Top);
        } else if bottom_out > threshold.y {
            fired.push(Edge::Bottom);
        }
        fired
    }

    /// Per-tick maintenance: run one shift for each boundary predicate that
    /// fires, then reindex every tile.
    pub fn maintain(&mut self, store: &mut WorldStore) -> Result<&StreamStats, StreamError> {
        let _span = tracing::info_span!("viewport_maintain").entered();
        let frame_start = Instant::now();
        let mut stats = StreamStats::default();

        for edge in self.boundary_triggers() {
            self.shift(store, edge, &mut stats)?;
            stats.shifts.push(edge);
        }
        if stats.shifted() {
            self.reindex();
        }

        stats.total_tiles = self.rows * self.cols;
        stats.frame_time = frame_start.elapsed();
        self.timer.record(stats.frame_time);
        tracing::trace!(
            shifts = stats.shifts.len(),
            built = stats.tiles_built_this_frame,
            evicted = stats.tiles_evicted_this_frame,
            "viewport maintenance complete"
        );
        self.stats = stats;
        Ok(&self.stats)
    }

    /// Replace one edge of the window. New tiles are built before anything is
    /// evicted so a failed build leaves the matrix untouched.
    fn shift(
        &mut self,
        store: &mut WorldStore,
        edge: Edge,
        stats: &mut StreamStats,
    ) -> Result<(), StreamError> {
        let (dx, dy) = match edge {
            Edge::Left => (1, 0),
            Edge::Right => (-1, 0),
            Edge::Top => (0, 1),
            Edge::Bottom => (0, -1),
        };
        let origin = self.origin_chunk();
        let next = ChunkCoord::new(origin.x + dx, origin.y + dy);
        let (rows, cols) = (self.rows, self.cols);

        let incoming_indices: Vec<GridIndex> = match edge {
            Edge::Left => (0..rows).map(|r| GridIndex::new(r, cols - 1)).collect(),
            Edge::Right => (0..rows).map(|r| GridIndex::new(r, 0)).collect(),
            Edge::Top => (0..cols).map(|c| GridIndex::new(rows - 1, c)).collect(),
            Edge::Bottom => (0..cols).map(|c| GridIndex::new(0, c)).collect(),
        };
        let mut incoming = Vec::with_capacity(incoming_indices.len());
        for index in incoming_indices {
            let chunk = ChunkCoord::new(next.x + index.col as i32, next.y + index.row as i32);
            incoming.push(build_tile(store, self.projection, chunk, index)?);
        }

        self.net_x_shift += dx;
        self.net_y_shift += dy;
        stats.tiles_built_this_frame += incoming.len();
        stats.nodes_built_this_frame += incoming.iter().map(Tile::node_count).sum::<usize>();

        let evicted: Vec<Tile> = match edge {
            Edge::Left => self
                .tiles
                .iter_mut()
                .zip(incoming)
                .filter_map(|(row, tile)| {
                    row.push_back(tile);
                    row.pop_front()
                })
                .collect(),
            Edge::Right => self
                .tiles
                .iter_mut()
                .zip(incoming)
                .filter_map(|(row, tile)| {
                    row.push_front(tile);
                    row.pop_back()
                })
                .collect(),
            Edge::Top => {
                self.tiles.push_back(incoming.into());
                self.tiles.pop_front().map(Vec::from).unwrap_or_default()
            }
            Edge::Bottom => {
                self.tiles.push_front(incoming.into());
                self.tiles.pop_back().map(Vec::from).unwrap_or_default()
            }
        };

        stats.tiles_evicted_this_frame += evicted.len();
        stats.nodes_evicted_this_frame += evicted.iter().map(Tile::node_count).sum::<usize>();
        stats.evicted.extend(evicted.iter().map(Tile::chunk));
        tracing::debug!(
            ?edge,
            net_x = self.net_x_shift,
            net_y = self.net_y_shift,
            evicted = evicted.len(),
            "viewport shifted"
        );
        Ok(())
    }

    /// Stamp every tile with its current matrix position.
    fn reindex(&mut self) {
        for (r, row) in self.tiles.iter_mut().enumerate() {
            for (c, tile) in row.iter_mut().enumerate() {
                tile.set_index(GridIndex::new(r, c));
            }
        }
        debug_assert!(
            self.tiles().all(|t| t.chunk() == self.chunk_at(t.index())),
            "tile coverage diverged from window offsets"
        );
    }

    /// Re-derive the node for `pos` in the tile at `index` from the store's
    /// committed state.
    pub fn refresh_block(
        &mut self,
        store: &mut WorldStore,
        index: GridIndex,
        pos: BlockPos,
    ) -> Result<SceneDelta, StreamError> {
        let block = store.get_block(pos)?;
        let tile = self
            .tiles
            .get_mut(index.row)
            .and_then(|row| row.get_mut(index.col))
            .filter(|tile| tile.contains(pos))
            .ok_or(StreamError::GridInvariantViolation {
                from: index,
                target: pos.chunk_coord(),
            })?;

        let delta = match block {
            Block::Empty => match tile.remove_block(pos) {
                Some(node) => SceneDelta::Removed {
                    index,
                    node: node.id,
                },
                None => SceneDelta::Unchanged,
            },
            Block::Material(kind) => SceneDelta::Added {
                index,
                node: tile.upsert_block(pos, kind),
            },
        };
        tracing::debug!(%pos, ?delta, "scene refreshed");
        Ok(delta)
    }

    /// Front-most block node under a viewport pixel, if any.
    pub fn pick(&self, point: DVec2) -> Option<NodeHit> {
        let scene = self.camera - DVec2::new(self.config.width, self.config.height) / 2.0 + point;
        let edge = self.projection.edge();
        let mut best: Option<(i64, NodeHit)> = None;
        for tile in self.tiles() {
            for node in tile.nodes() {
                if best.is_some_and(|(key, _)| node.draw_key <= key) {
                    continue;
                }
                let d = scene - node.screen;
                if d.x < -edge || d.x > edge || d.y < 0.0 || d.y > 2.0 * edge {
                    continue;
                }
                let outline = self.projection.block_outline(tile.render_pos(node));
                if polygon_contains(&outline, scene) {
                    let hit = NodeHit {
                        index: tile.index(),
                        node: node.id,
                        pos: tile.block_pos(node),
                    };
                    best = Some((node.draw_key, hit));
                }
            }
        }
        best.map(|(_, hit)| hit)
    }

    /// Viewport pixel at which a scene-space point appears.
    pub fn to_viewport(&self, scene: DVec2) -> DVec2 {
        scene - self.camera + DVec2::new(self.config.width, self.config.height) / 2.0
    }

    /// Snapshot of the live tiles for a renderer.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            tiles: self.tiles().collect(),
            camera: self.camera,
            viewport: DVec2::new(self.config.width, self.config.height),
        }
    }
}

/// Half extent of a `size` pixel viewport in tiles along the lattice axes.
fn view_half_extent(projection: &Projection, size: DVec2) -> DVec2 {
    let inverse = projection.tile_basis().inverse();
    let h = size / 2.0;
    [DVec2::new(h.x, h.y), DVec2::new(h.x, -h.y)]
        .into_iter()
        .map(|corner| (inverse * corner).abs())
        .fold(DVec2::ZERO, DVec2::max)
}
