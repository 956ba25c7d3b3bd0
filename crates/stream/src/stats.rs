use std::collections::VecDeque;
use std::time::Duration;
use tilescape_common::ChunkCoord;

use crate::grid::Edge;

/// What one maintenance pass did.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    /// Boundary predicates that fired, in the order their shifts ran.
    pub shifts: Vec<Edge>,
    pub tiles_built_this_frame: usize,
    pub tiles_evicted_this_frame: usize,
    pub nodes_built_this_frame: usize,
    pub nodes_evicted_this_frame: usize,
    /// Chunks whose tiles left the window this frame.
    pub evicted: Vec<ChunkCoord>,
    pub total_tiles: usize,
    pub frame_time: Duration,
}

impl StreamStats {
    pub fn shifted(&self) -> bool {
        !self.shifts.is_empty()
    }
}

/// Rolling window of maintenance durations.
#[derive(Debug, Clone)]
pub struct MaintenanceTimer {
    samples: VecDeque<Duration>,
    window: usize,
}

impl MaintenanceTimer {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "timer window must be positive");
        Self {
            samples: VecDeque::with_capacity(window),
            window,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.samples.iter().copied().min().unwrap_or_default()
    }
}

impl Default for MaintenanceTimer {
    fn default() -> Self {
        Self::new(120)
    }
}
