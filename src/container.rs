//! Frame orchestration: drives the pool through the per-frame pipeline and
//! hands the batched buffers to the host's [`RenderSink`].

use std::mem;

use glam::{Affine3A, Mat4, Quat, Vec3};

use crate::colors;
use crate::config::DebugDrawConfig;
use crate::entry::{InstanceType, ProcessType};
use crate::math::{Aabb, Frustum, SphereBounds};
use crate::pool::{DistanceCullingData, GeometryPool};
use crate::render::{InstanceBuffers, LineVertex, RenderSink};
use crate::stats::RenderStats;

/// One view the overlay is culled against.
#[derive(Debug, Clone, Copy)]
pub struct ViewData {
    /// Combined view-projection matrix, used for frustum extraction.
    pub view_projection: Mat4,
    /// World-space camera position, used for distance culling.
    pub position: Vec3,
    /// Far-plane distance, used to size "infinite" planes.
    pub far_plane: f32,
}

impl ViewData {
    pub fn new(view_projection: Mat4, position: Vec3, far_plane: f32) -> Self {
        Self {
            view_projection,
            position,
            far_plane,
        }
    }
}

/// The candidate views for a frame, by origin.
///
/// Resolution order: explicit overrides win unless
/// [`DebugDrawConfig::force_use_camera_from_scene`] is set or no override was
/// supplied, in which case the scene views are used; auxiliary views are the
/// fallback when both are empty.
#[derive(Debug, Clone, Default)]
pub struct ViewSet {
    pub scene: Vec<ViewData>,
    pub overrides: Vec<ViewData>,
    pub auxiliary: Vec<ViewData>,
}

impl ViewSet {
    fn resolve(&self, config: &DebugDrawConfig) -> &[ViewData] {
        if config.force_use_camera_from_scene || self.overrides.is_empty() {
            if !self.scene.is_empty() {
                &self.scene
            } else {
                &self.auxiliary
            }
        } else {
            &self.overrides
        }
    }
}

/// One frame's batched output, detached from the container.
///
/// The sink must never be called while the container lock is held: a sink
/// that issues `draw_*` calls of its own would relock the container and
/// deadlock. The frame driver takes the filled buffers out, releases the
/// lock, submits, and hands the buffers back with
/// [`GeometryContainer::restore_buffers`] so their allocations are reused.
pub struct FrameBuffers {
    instance_buffers: InstanceBuffers,
    line_vertices: Vec<LineVertex>,
    layer_mask: Option<u32>,
}

impl FrameBuffers {
    /// Hand every buffer (and a changed layer mask, if any) to the sink.
    pub fn submit(&self, sink: &mut dyn RenderSink) {
        if let Some(mask) = self.layer_mask {
            sink.set_render_layer_mask(mask);
        }
        for ty in InstanceType::ALL {
            let data = self.instance_buffers.get(ty);
            sink.set_instance_buffer(ty, data, data.len());
        }
        sink.set_line_buffer(&self.line_vertices);
    }
}

/// Owns the pool plus the reusable frame buffers and runs the frame pipeline.
pub struct GeometryContainer {
    pool: GeometryPool,
    instance_buffers: InstanceBuffers,
    line_vertices: Vec<LineVertex>,
    /// True once a frame has been rendered since the last physics-phase
    /// sweep; gates that sweep to at most once per rendered frame.
    is_frame_rendered: bool,
    last_layer_mask: Option<u32>,
    /// Scratch for the bounds-overlay pass.
    overlay_spheres: Vec<SphereBounds>,
    overlay_boxes: Vec<Aabb>,
}

impl GeometryContainer {
    pub fn new() -> Self {
        Self {
            pool: GeometryPool::new(),
            instance_buffers: InstanceBuffers::new(),
            line_vertices: Vec::new(),
            is_frame_rendered: false,
            last_layer_mask: None,
            overlay_spheres: Vec::new(),
            overlay_boxes: Vec::new(),
        }
    }

    pub fn pool_mut(&mut self) -> &mut GeometryPool {
        &mut self.pool
    }

    pub fn pool(&self) -> &GeometryPool {
        &self.pool
    }

    pub fn stats(&self) -> RenderStats {
        self.pool.stats()
    }

    /// The render-phase tick. Runs culling, the bounds overlay, buffer
    /// filling and the render-phase expiration sweep.
    ///
    /// Returns the detached frame output for the caller to submit after
    /// releasing the container lock, plus the primary resolved view.
    /// Returns `None` on a frozen frame, when there is nothing to submit.
    pub fn update_geometry(
        &mut self,
        delta: f32,
        enabled: bool,
        config: &DebugDrawConfig,
        views: &ViewSet,
    ) -> Option<(FrameBuffers, Option<ViewData>)> {
        if config.freeze_render {
            // Keep whatever the sink last received on screen, untouched.
            return None;
        }

        if !enabled {
            self.pool.reset_visible_counters();
            self.instance_buffers.reset();
            self.line_vertices.clear();
            return Some((self.detach_buffers(None), None));
        }

        let layer_mask = if self.last_layer_mask != Some(config.render_layers) {
            self.last_layer_mask = Some(config.render_layers);
            Some(config.render_layers)
        } else {
            None
        };

        let views = views.resolve(config);
        let frustums: Vec<Frustum> = if config.frustum_culling {
            views
                .iter()
                .map(|v| Frustum::from_view_projection(&v.view_projection))
                .collect()
        } else {
            Vec::new()
        };
        let distance = DistanceCullingData::new(
            config.culling_distance,
            views.iter().map(|v| v.position).collect(),
        );

        self.pool.update_visibility(&frustums, &distance);

        if config.visible_instance_bounds {
            self.add_bounds_overlay();
        }

        self.pool.fill_lines_data(&mut self.line_vertices, delta);
        self.pool.fill_instance_data(&mut self.instance_buffers, delta);

        self.pool.scan_visible_instances();
        self.pool.update_expiration(delta, ProcessType::Process);
        self.pool.reset_counter(delta, ProcessType::Process);
        self.is_frame_rendered = true;
        Some((self.detach_buffers(layer_mask), views.first().copied()))
    }

    fn detach_buffers(&mut self, layer_mask: Option<u32>) -> FrameBuffers {
        FrameBuffers {
            instance_buffers: mem::take(&mut self.instance_buffers),
            line_vertices: mem::take(&mut self.line_vertices),
            layer_mask,
        }
    }

    /// Return the buffers taken by [`update_geometry`](Self::update_geometry)
    /// after submission, keeping their allocations for the next frame.
    pub fn restore_buffers(&mut self, frame: FrameBuffers) {
        self.instance_buffers = frame.instance_buffers;
        self.line_vertices = frame.line_vertices;
    }

    /// Start of a physics tick. The counter reset is gated so it runs at
    /// most once per rendered frame, however many physics ticks elapse.
    pub fn physics_tick_start(&mut self, delta: f32) {
        if self.is_frame_rendered {
            self.pool.reset_counter(delta, ProcessType::Physics);
            self.is_frame_rendered = false;
        }
    }

    /// End of a physics tick: the physics-phase expiration sweep. Entries
    /// created during a physics tick are only removable once a render frame
    /// has drawn them, so running this every tick cannot starve them.
    pub fn physics_tick_end(&mut self, delta: f32) {
        self.pool.update_expiration(delta, ProcessType::Physics);
    }

    /// Drop every outstanding entry.
    pub fn clear(&mut self) {
        self.pool.clear_pool();
    }

    /// Add a one-shot wireframe around every visible entry's culling volume:
    /// a sphere for instance entries, a box for line entries (whose cull
    /// volume is their axis-aligned bounding box).
    ///
    /// Two passes over the pool: the read-only scan cannot run concurrently
    /// with insertion, so bounds are collected first and inserted after.
    fn add_bounds_overlay(&mut self) {
        self.overlay_spheres.clear();
        self.overlay_boxes.clear();
        let spheres = &mut self.overlay_spheres;
        let boxes = &mut self.overlay_boxes;
        self.pool.for_each_instance(|entry| {
            if entry.state.is_visible && !entry.state.is_expired() {
                spheres.push(entry.bounds);
            }
        });
        self.pool.for_each_line(|entry| {
            if entry.state.is_visible && !entry.state.is_expired() {
                boxes.push(entry.bounds);
            }
        });

        for i in 0..self.overlay_spheres.len() {
            let bounds = self.overlay_spheres[i];
            let transform = Affine3A::from_scale_rotation_translation(
                Vec3::splat(bounds.radius * 2.0),
                Quat::IDENTITY,
                bounds.center,
            );
            self.pool
                .add_or_update_instance(
                    InstanceType::Sphere,
                    None,
                    ProcessType::Process,
                    0.0,
                    transform,
                    colors::DEBUG_BOUNDS,
                    glam::Vec4::ZERO,
                    bounds,
                )
                .state
                .is_used_one_time = true;
        }
        for i in 0..self.overlay_boxes.len() {
            let aabb = self.overlay_boxes[i];
            // The corner-origin unit cube scaled by the extents lands on the
            // box exactly.
            let transform = Affine3A::from_scale_rotation_translation(
                aabb.size,
                Quat::IDENTITY,
                aabb.position,
            );
            self.pool
                .add_or_update_instance(
                    InstanceType::Cube,
                    None,
                    ProcessType::Process,
                    0.0,
                    transform,
                    colors::DEBUG_BOUNDS,
                    glam::Vec4::ZERO,
                    aabb.enclosing_sphere(),
                )
                .state
                .is_used_one_time = true;
        }
    }
}

impl Default for GeometryContainer {
    fn default() -> Self {
        Self::new()
    }
}
