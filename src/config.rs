//! Global per-frame configuration toggles.
//!
//! Read by the frame orchestrator at the start of every render tick; all
//! fields can change between frames.

use glam::Vec4;

use crate::colors;

/// Global debug-draw settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugDrawConfig {
    /// Test entry bounds against the resolved camera frustums.
    pub frustum_culling: bool,
    /// Hide entries farther than this from the nearest camera. `0.0`
    /// disables distance culling.
    pub culling_distance: f32,
    /// Always cull against the scene camera even when a custom view or
    /// auxiliary views are set.
    pub force_use_camera_from_scene: bool,
    /// Skip the whole render-phase update, leaving the last batched frame
    /// on screen and expiring nothing.
    pub freeze_render: bool,
    /// Draw a one-frame overlay (spheres/cubes) around every visible
    /// entry's bounding volume.
    pub visible_instance_bounds: bool,
    /// Render-layer mask forwarded to the sink.
    pub render_layers: u32,
    /// Default color of the hit marker and the pre-hit segment of
    /// `draw_line_hit`.
    pub line_hit_color: Vec4,
    /// Default color of the post-hit segment of `draw_line_hit`.
    pub line_after_hit_color: Vec4,
}

impl Default for DebugDrawConfig {
    fn default() -> Self {
        Self {
            frustum_culling: true,
            culling_distance: 0.0,
            force_use_camera_from_scene: false,
            freeze_render: false,
            visible_instance_bounds: false,
            render_layers: 1,
            line_hit_color: colors::RED,
            line_after_hit_color: colors::GREEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DebugDrawConfig::default();
        assert!(config.frustum_culling);
        assert_eq!(config.culling_distance, 0.0);
        assert_eq!(config.render_layers, 1);
        assert!(!config.freeze_render);
    }
}
