//! Render statistics snapshot, refreshed once per rendered frame.

use std::time::Duration;

/// Counts and timings from the last pool update. Visible counts lag the
/// draw calls by one frame (they are measured during the fill pass).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Point-instance entries currently tracked.
    pub instances: usize,
    /// Instances that passed the last visibility pass.
    pub visible_instances: usize,
    /// Line entries currently tracked.
    pub lines: usize,
    /// Lines that passed the last visibility pass.
    pub visible_lines: usize,
    /// Time spent writing batch buffers last frame.
    pub time_filling_buffers: Duration,
    /// Time spent in frustum/distance culling last frame.
    pub time_culling: Duration,
}

impl RenderStats {
    pub fn total(&self) -> usize {
        self.instances + self.lines
    }

    pub fn total_visible(&self) -> usize {
        self.visible_instances + self.visible_lines
    }
}
