//! Rendering Adapter: coordinate transforms, palette, and the scene tiles the
//! viewport streams in and out.
//!
//! # Invariants
//! - Renderers never mutate world truth; scene nodes derive from the store.
//! - Screen positions are always derived from render positions, never stored
//!   as ground truth.
//! - Depth is resolved solely by the integer draw key (painter's order).

mod palette;
mod projection;
mod renderer;
mod scene;

pub use palette::{Palette, PaletteEntry, PaletteError, Rgb, SHADE_STEP, color_variants};
pub use projection::{
    BLOCK_EDGE, DRAW_KEY_DEPTH_WEIGHT, DRAW_KEY_HEIGHT_WEIGHT, PROJECTION_ANGLE, Projection,
    polygon_contains,
};
pub use renderer::{
    DebugTextRenderer, DrawCommand, DrawListRenderer, Face, FaceSide, Frame, Renderer,
};
pub use scene::{BlockNode, GridIndex, Tile};
