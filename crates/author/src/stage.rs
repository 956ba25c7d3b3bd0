use glam::DVec2;
use std::collections::BTreeMap;
use tilescape_common::{BlockKind, ChunkCoord};
use tilescape_input::{Action, FacingLatch};
use tilescape_kernel::{WorldEvent, WorldStore};
use tilescape_render::{Palette, Renderer};
use tilescape_stream::{StreamStats, ViewportGrid};

use crate::bridge::{EditError, EditOutcome, SceneBridge};
use crate::config::StageConfig;

/// One running world view: the store, the window over it, the palette, and
/// the input state that drives edits.
///
/// Constructed once at startup and passed to whoever needs it.
#[derive(Debug)]
pub struct Stage {
    store: WorldStore,
    grid: ViewportGrid,
    palette: Palette,
    latch: FacingLatch,
    bridge: SceneBridge,
    ticks: u64,
    /// World events drained by the last tick.
    recent_events: Vec<WorldEvent>,
    events_processed: u64,
}

impl Stage {
    /// Bootstrap the world and the window, centered on `center` or on the
    /// configured chunk.
    ///
    /// Rejects a config with a non-positive height or a degenerate viewport,
    /// and a center whose window would leave the addressable world.
    pub fn init(config: &StageConfig, center: Option<ChunkCoord>) -> Result<Self, EditError> {
        let center = center.unwrap_or(config.center);
        let _span = tracing::info_span!("init_stage", seed = %config.world.seed, %center).entered();
        config.validate()?;

        let mut palette = Palette::with_defaults();
        palette.add_new_block_type(&config.palette)?;

        let mut store = WorldStore::from_config(&config.world);
        let grid = ViewportGrid::new(&mut store, config.viewport.clone(), center)?;

        let mut bridge = SceneBridge::new();
        if let Some(name) = &config.selected {
            bridge.select_block_type(&palette, name)?;
        }

        tracing::info!(
            chunks = store.chunk_count(),
            nodes = grid.node_count(),
            "stage ready"
        );
        Ok(Self {
            store,
            grid,
            palette,
            latch: FacingLatch::new(),
            bridge,
            ticks: 0,
            recent_events: Vec::new(),
            events_processed: 0,
        })
    }

    /// Per-frame maintenance of the window.
    ///
    /// Drains the store's event log afterwards, so the log only ever holds
    /// what happened since the previous tick.
    pub fn tick(&mut self) -> Result<&StreamStats, EditError> {
        self.ticks += 1;
        let stats = self.grid.maintain(&mut self.store)?;
        self.recent_events = self.store.drain_events();
        self.events_processed += self.recent_events.len() as u64;
        tracing::trace!(events = self.recent_events.len(), "world events drained");
        Ok(stats)
    }

    pub fn pan(&mut self, delta: DVec2) {
        self.grid.pan(delta);
    }

    pub fn key_down(&mut self, key: char) {
        self.latch.key_down(key);
    }

    pub fn key_up(&mut self, key: char) {
        self.latch.key_up(key);
    }

    /// Inventory notification: use `name` for subsequent placements.
    pub fn select_block_type(&mut self, name: &str) -> Result<BlockKind, EditError> {
        self.bridge.select_block_type(&self.palette, name)
    }

    /// Extend the placeable palette with `name -> #rrggbb` entries.
    pub fn add_new_block_type(
        &mut self,
        delta: &BTreeMap<String, String>,
    ) -> Result<Vec<BlockKind>, EditError> {
        Ok(self.palette.add_new_block_type(delta)?)
    }

    /// Pointer press at a viewport pixel. Returns `None` if nothing was hit.
    pub fn pointer_down(&mut self, point: DVec2) -> Result<Option<EditOutcome>, EditError> {
        let Some(hit) = self.grid.pick(point) else {
            tracing::trace!(x = point.x, y = point.y, "pointer missed");
            return Ok(None);
        };
        let facing = self.latch.current();
        self.bridge
            .click(&mut self.store, &mut self.grid, hit, facing)
            .map(Some)
    }

    pub fn undo(&mut self) -> Result<Option<EditOutcome>, EditError> {
        self.bridge.undo(&mut self.store, &mut self.grid)
    }

    pub fn redo(&mut self) -> Result<Option<EditOutcome>, EditError> {
        self.bridge.redo(&mut self.store, &mut self.grid)
    }

    /// Dispatch an abstract UI action. Returns the edit it caused, if any.
    pub fn handle(&mut self, action: Action) -> Result<Option<EditOutcome>, EditError> {
        match action {
            Action::Pan(delta) => self.pan(delta),
            Action::PointerDown(point) => return self.pointer_down(point),
            Action::KeyDown(key) => self.key_down(key),
            Action::KeyUp(key) => self.key_up(key),
            Action::SelectBlockType(name) => {
                self.select_block_type(&name)?;
            }
            Action::Undo => return self.undo(),
            Action::Redo => return self.redo(),
            Action::Noop => {}
        }
        Ok(None)
    }

    /// Render the current window with `renderer`.
    pub fn render<R: Renderer>(&self, renderer: &R) -> R::Output {
        renderer.render(&self.grid.frame(), &self.palette)
    }

    pub fn store(&self) -> &WorldStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorldStore {
        &mut self.store
    }

    pub fn grid(&self) -> &ViewportGrid {
        &self.grid
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn latch(&self) -> &FacingLatch {
        &self.latch
    }

    pub fn bridge(&self) -> &SceneBridge {
        &self.bridge
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// World events drained by the last tick, oldest first.
    pub fn recent_events(&self) -> &[WorldEvent] {
        &self.recent_events
    }

    /// Total world events drained over the stage's lifetime.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }
}
