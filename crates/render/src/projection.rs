use glam::{DMat2, DVec2, DVec3};
use std::f64::consts::PI;
use tilescape_common::{BlockPos, RenderBlockPos, TILE_SIZE};

/// Fixed projection angle θ.
pub const PROJECTION_ANGLE: f64 = 5.0 * PI / 12.0;
/// Block edge length in pixels at unit zoom.
pub const BLOCK_EDGE: f64 = 30.0;
/// Weight of `x + z` in the draw key.
pub const DRAW_KEY_DEPTH_WEIGHT: i64 = 100_000;
/// Weight of render `y` in the draw key.
pub const DRAW_KEY_HEIGHT_WEIGHT: i64 = 10;

/// Maps between data, render and screen space.
///
/// ```text
/// render = (data.x, H - 1 - data.z, data.y)
/// screenX = L·x − cos(θ)·L·z
/// screenY = (2/3)·L·y + sin(θ)·L·z
/// ```
///
/// There is no camera matrix and no perspective divide; screen positions
/// are in scene pixels and the viewport pans over them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    height: i32,
    edge: f64,
    cos: f64,
    sin: f64,
}

impl Projection {
    /// Projection for a world of `height` layers at unit zoom.
    pub fn new(height: i32) -> Self {
        Self::with_zoom(height, 1.0)
    }

    pub fn with_zoom(height: i32, zoom: f64) -> Self {
        assert!(zoom > 0.0, "zoom must be positive");
        Self {
            height,
            edge: BLOCK_EDGE * zoom,
            cos: PROJECTION_ANGLE.cos(),
            sin: PROJECTION_ANGLE.sin(),
        }
    }

    /// World height H.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Block edge length L in pixels, zoom applied.
    pub fn edge(&self) -> f64 {
        self.edge
    }

    pub fn data_to_render(&self, p: BlockPos) -> RenderBlockPos {
        RenderBlockPos::new(p.x, self.height - 1 - p.z, p.y)
    }

    pub fn render_to_data(&self, r: RenderBlockPos) -> BlockPos {
        BlockPos::new(r.x, r.z, self.height - 1 - r.y)
    }

    /// Screen position of a block's render-space corner.
    pub fn project(&self, r: RenderBlockPos) -> DVec2 {
        self.project_point(DVec3::new(r.x as f64, r.y as f64, r.z as f64))
    }

    /// Screen position of an arbitrary render-space point.
    pub fn project_point(&self, p: DVec3) -> DVec2 {
        let l = self.edge;
        DVec2::new(
            l * p.x - self.cos * l * p.z,
            (2.0 / 3.0) * l * p.y + self.sin * l * p.z,
        )
    }

    /// Painter's-order key: lower keys are drawn first.
    pub fn draw_key(r: RenderBlockPos) -> i64 {
        (r.x as i64 + r.z as i64) * DRAW_KEY_DEPTH_WEIGHT - r.y as i64 * DRAW_KEY_HEIGHT_WEIGHT
    }

    /// Screen-space step of one tile along data x (columns) and data y
    /// (rows), as the columns of a matrix.
    pub fn tile_basis(&self) -> DMat2 {
        let t = TILE_SIZE as f64;
        let col = self.project_point(DVec3::new(t, 0.0, 0.0));
        let row = self.project_point(DVec3::new(0.0, 0.0, t));
        DMat2::from_cols(col, row)
    }

    /// Fractional chunk coordinates of the screen point `s`, taken on the
    /// horizontal plane at render height `render_y`.
    pub fn screen_to_chunk(&self, s: DVec2, render_y: f64) -> DVec2 {
        let plane = self.project_point(DVec3::new(0.0, render_y, 0.0));
        self.tile_basis().inverse() * (s - plane)
    }

    /// Convex screen outline of the unit cube at `r`.
    pub fn block_outline(&self, r: RenderBlockPos) -> Vec<DVec2> {
        let base = DVec3::new(r.x as f64, r.y as f64, r.z as f64);
        let mut corners = Vec::with_capacity(8);
        for dx in [0.0, 1.0] {
            for dy in [0.0, 1.0] {
                for dz in [0.0, 1.0] {
                    corners.push(self.project_point(base + DVec3::new(dx, dy, dz)));
                }
            }
        }
        convex_hull(corners)
    }
}

/// Andrew's monotone chain. Returns the hull counter-clockwise in a y-up
/// frame, without repeating the first point.
fn convex_hull(mut points: Vec<DVec2>) -> Vec<DVec2> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }
    let cross = |o: DVec2, a: DVec2, b: DVec2| (a - o).perp_dot(b - o);

    let mut hull: Vec<DVec2> = Vec::with_capacity(points.len() * 2);
    for &p in &points {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in points.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Whether `p` lies inside (or on) the convex polygon `poly`.
pub fn polygon_contains(poly: &[DVec2], p: DVec2) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut sign = 0.0f64;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let c = (b - a).perp_dot(p - a);
        if c.abs() < f64::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = c.signum();
        } else if c.signum() != sign {
            return false;
        }
    }
    true
}
