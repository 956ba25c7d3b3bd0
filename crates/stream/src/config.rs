use serde::{Deserialize, Serialize};

use crate::grid::StreamError;

/// Viewport sizing: pixel extent of the visible area plus the extra tiles
/// kept loaded around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Visible width in pixels.
    pub width: f64,
    /// Visible height in pixels.
    pub height: f64,
    /// Extra tiles per axis beyond those needed to cover the viewport.
    pub margin_tiles: usize,
    /// Scale applied to the block edge length.
    pub zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            margin_tiles: 5,
            zoom: 1.0,
        }
    }
}

impl ViewportConfig {
    /// Reject sizes and zoom levels no projection can be built from.
    pub fn validate(&self) -> Result<(), StreamError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.zoom) {
            return Err(StreamError::InvalidViewport(format!(
                "zoom must be positive and finite, got {}",
                self.zoom
            )));
        }
        if !positive(self.width) || !positive(self.height) {
            return Err(StreamError::InvalidViewport(format!(
                "size must be positive and finite, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}
