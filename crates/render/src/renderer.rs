use glam::{DVec2, DVec3};
use std::fmt::Write as _;
use tilescape_common::{BlockKind, NodeId, RenderBlockPos};

use crate::palette::Palette;
use crate::projection::Projection;
use crate::scene::Tile;

/// What a renderer sees for one frame: the live tiles in matrix order and
/// the viewport over the scene.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub tiles: Vec<&'a Tile>,
    /// Scene-space position of the viewport center.
    pub camera: DVec2,
    /// Viewport size in pixels.
    pub viewport: DVec2,
}

impl Frame<'_> {
    /// Convert a scene-space point to viewport pixels.
    pub fn to_viewport(&self, scene: DVec2) -> DVec2 {
        scene - self.camera + self.viewport / 2.0
    }

    pub fn node_count(&self) -> usize {
        self.tiles.iter().map(|t| t.node_count()).sum()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads a frame and the palette and produces output. It never
/// touches the world store.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &Frame<'_>, palette: &Palette) -> Self::Output;
}

/// Human-readable frame summary for CLI output, logging, and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &Frame<'_>, palette: &Palette) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame (tiles={}, nodes={}) ===",
            frame.tiles.len(),
            frame.node_count()
        );
        let _ = writeln!(
            out,
            "Camera: ({:.1}, {:.1}) viewport={}x{}",
            frame.camera.x, frame.camera.y, frame.viewport.x, frame.viewport.y
        );
        for tile in &frame.tiles {
            let mut kinds: Vec<(&BlockKind, usize)> = Vec::new();
            for node in tile.nodes() {
                match kinds.iter_mut().find(|(k, _)| *k == &node.kind) {
                    Some((_, n)) => *n += 1,
                    None => kinds.push((&node.kind, 1)),
                }
            }
            kinds.sort();
            let summary: Vec<String> = kinds
                .iter()
                .map(|(k, n)| format!("{k}({})x{n}", palette.shades(k)[0]))
                .collect();
            let _ = writeln!(
                out,
                "  tile {} chunk={} nodes={} [{}]",
                tile.index(),
                tile.chunk(),
                tile.node_count(),
                summary.join(", ")
            );
        }
        out
    }
}

/// Which visible face of a block a polygon covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    Top,
    Front,
    Side,
}

/// One filled quad in viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub side: FaceSide,
    pub points: [DVec2; 4],
    pub color: String,
}

/// Everything needed to paint one block.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub node: NodeId,
    pub draw_key: i64,
    pub kind: BlockKind,
    pub faces: [Face; 3],
}

/// Emits painter-ordered face polygons for every on-screen block.
#[derive(Debug, Default)]
pub struct DrawListRenderer;

impl DrawListRenderer {
    pub fn new() -> Self {
        Self
    }

    fn faces(
        proj: &Projection,
        r: RenderBlockPos,
        frame: &Frame<'_>,
        shades: &[String; 3],
    ) -> [Face; 3] {
        let base = DVec3::new(r.x as f64, r.y as f64, r.z as f64);
        let quad = |corners: [DVec3; 4]| {
            corners.map(|c| frame.to_viewport(proj.project_point(base + c)))
        };
        [
            Face {
                side: FaceSide::Top,
                points: quad([
                    DVec3::new(0.0, 0.0, 0.0),
                    DVec3::new(1.0, 0.0, 0.0),
                    DVec3::new(1.0, 0.0, 1.0),
                    DVec3::new(0.0, 0.0, 1.0),
                ]),
                color: shades[0].clone(),
            },
            Face {
                side: FaceSide::Front,
                points: quad([
                    DVec3::new(0.0, 0.0, 1.0),
                    DVec3::new(1.0, 0.0, 1.0),
                    DVec3::new(1.0, 1.0, 1.0),
                    DVec3::new(0.0, 1.0, 1.0),
                ]),
                color: shades[1].clone(),
            },
            Face {
                side: FaceSide::Side,
                points: quad([
                    DVec3::new(1.0, 0.0, 0.0),
                    DVec3::new(1.0, 1.0, 0.0),
                    DVec3::new(1.0, 1.0, 1.0),
                    DVec3::new(1.0, 0.0, 1.0),
                ]),
                color: shades[2].clone(),
            },
        ]
    }
}

impl Renderer for DrawListRenderer {
    type Output = Vec<DrawCommand>;

    fn render(&self, frame: &Frame<'_>, palette: &Palette) -> Vec<DrawCommand> {
        let _span = tracing::trace_span!("draw_list").entered();
        let mut commands = Vec::new();
        for tile in &frame.tiles {
            let proj = tile.projection();
            for node in tile.nodes() {
                let r = tile.render_pos(node);
                let outline: Vec<DVec2> = proj
                    .block_outline(r)
                    .into_iter()
                    .map(|p| frame.to_viewport(p))
                    .collect();
                let on_screen = outline.iter().any(|p| {
                    p.x >= 0.0 && p.y >= 0.0 && p.x <= frame.viewport.x && p.y <= frame.viewport.y
                });
                if !on_screen {
                    continue;
                }
                commands.push(DrawCommand {
                    node: node.id,
                    draw_key: node.draw_key,
                    kind: node.kind.clone(),
                    faces: Self::faces(proj, r, frame, palette.shades(&node.kind)),
                });
            }
        }
        commands.sort_by_key(|c| c.draw_key);
        commands
    }
}
