//! The process-wide debug-draw context.
//!
//! A [`DebugDrawer`] owns the geometry container behind one lock, the global
//! config, and the per-thread scope-config store. It is explicitly
//! constructed and cheaply shareable behind an `Arc`; there is no global
//! singleton. All `draw_*` methods (see the `draw_api` module) and the frame
//! driving methods take `&self` and may be called from any thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::{Vec3, Vec4};
use parking_lot::{Mutex, RwLock};

use crate::config::DebugDrawConfig;
use crate::container::{GeometryContainer, ViewData, ViewSet};
use crate::entry::{InstanceType, ProcessType};
use crate::math::SphereBounds;
use crate::render::RenderSink;
use crate::scope_config::{ScopeConfigData, ScopeConfigStore, ScopedConfig};
use crate::stats::RenderStats;

/// Far-plane distance assumed before the first frame resolves a real view.
const DEFAULT_FAR_PLANE: f32 = 1000.0;

pub struct DebugDrawer {
    container: Mutex<GeometryContainer>,
    config: RwLock<DebugDrawConfig>,
    scope_store: ScopeConfigStore,
    enabled: AtomicBool,
    /// Set between the physics tick start/end calls; entries created while
    /// it holds belong to the physics lifecycle clock.
    in_physics_tick: AtomicBool,
    /// Primary view of the last rendered frame, for view-relative draws.
    last_view: Mutex<Option<ViewData>>,
}

impl DebugDrawer {
    pub fn new() -> Self {
        Self::with_config(DebugDrawConfig::default())
    }

    pub fn with_config(config: DebugDrawConfig) -> Self {
        Self {
            container: Mutex::new(GeometryContainer::new()),
            config: RwLock::new(config),
            scope_store: ScopeConfigStore::new(ScopeConfigData::default()),
            enabled: AtomicBool::new(true),
            in_physics_tick: AtomicBool::new(false),
            last_view: Mutex::new(None),
        }
    }

    /// While disabled, `draw_*` calls are cheap no-ops and frames submit
    /// empty buffers.
    pub fn debug_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_debug_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn config(&self) -> DebugDrawConfig {
        *self.config.read()
    }

    pub fn set_config(&self, config: DebugDrawConfig) {
        *self.config.write() = config;
    }

    pub fn update_config(&self, f: impl FnOnce(&mut DebugDrawConfig)) {
        f(&mut self.config.write());
    }

    /// Push a scoped draw config for the calling thread. Draws made on this
    /// thread use it until the returned guard drops.
    pub fn scoped_config(&self) -> ScopedConfig<'_> {
        self.scope_store.scoped()
    }

    pub fn default_scope_config(&self) -> Arc<ScopeConfigData> {
        self.scope_store.default_config()
    }

    pub fn set_default_scope_config(&self, config: ScopeConfigData) {
        self.scope_store.set_default_config(config);
    }

    /// Render-phase tick. Call once per rendered frame.
    ///
    /// The sink runs with the container unlocked, so it may issue `draw_*`
    /// calls of its own; those land in the next frame.
    pub fn process(&self, delta: f32, views: &ViewSet, sink: &mut dyn RenderSink) {
        let config = self.config();
        let update =
            self.container
                .lock()
                .update_geometry(delta, self.debug_enabled(), &config, views);
        let Some((frame, resolved)) = update else {
            return;
        };

        frame.submit(sink);
        self.container.lock().restore_buffers(frame);

        if resolved.is_some() {
            *self.last_view.lock() = resolved;
        }
    }

    /// Call at the start of every physics tick.
    pub fn physics_process_start(&self, delta: f32) {
        self.in_physics_tick.store(true, Ordering::Relaxed);
        self.container.lock().physics_tick_start(delta);
    }

    /// Call at the end of every physics tick.
    pub fn physics_process_end(&self, delta: f32) {
        self.container.lock().physics_tick_end(delta);
        self.in_physics_tick.store(false, Ordering::Relaxed);
    }

    /// Drop every outstanding entry immediately.
    pub fn clear_all(&self) {
        self.container.lock().clear();
    }

    pub fn render_stats(&self) -> RenderStats {
        self.container.lock().stats()
    }

    pub(crate) fn scope_snapshot(&self) -> Arc<ScopeConfigData> {
        self.scope_store.scoped_config_for_current_thread()
    }

    pub(crate) fn current_process_type(&self) -> ProcessType {
        if self.in_physics_tick.load(Ordering::Relaxed) {
            ProcessType::Physics
        } else {
            ProcessType::Process
        }
    }

    pub(crate) fn far_plane(&self) -> f32 {
        self.last_view
            .lock()
            .map(|v| v.far_plane)
            .unwrap_or(DEFAULT_FAR_PLANE)
    }

    pub(crate) fn last_camera_position(&self) -> Option<Vec3> {
        self.last_view.lock().map(|v| v.position)
    }

    pub(crate) fn add_instance(
        &self,
        instance_type: InstanceType,
        identity: Option<u64>,
        duration: f32,
        transform: glam::Affine3A,
        color: Vec4,
        custom_color: Vec4,
        bounds: SphereBounds,
    ) {
        if !self.debug_enabled() {
            return;
        }
        let process_type = self.current_process_type();
        self.container.lock().pool_mut().add_or_update_instance(
            instance_type,
            identity,
            process_type,
            duration,
            transform,
            color,
            custom_color,
            bounds,
        );
    }

    pub(crate) fn add_line(
        &self,
        identity: Option<u64>,
        duration: f32,
        points: Vec<Vec3>,
        color: Vec4,
    ) {
        if !self.debug_enabled() {
            return;
        }
        let process_type = self.current_process_type();
        self.container
            .lock()
            .pool_mut()
            .add_or_update_line(identity, process_type, duration, points, color);
    }
}

impl Default for DebugDrawer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Affine3A;

    #[test]
    fn disabled_drawer_ignores_draw_calls() {
        let drawer = DebugDrawer::new();
        drawer.set_debug_enabled(false);
        drawer.add_instance(
            InstanceType::Sphere,
            None,
            1.0,
            Affine3A::IDENTITY,
            Vec4::ONE,
            Vec4::ZERO,
            SphereBounds::new(Vec3::ZERO, 0.5),
        );
        drawer.add_line(None, 1.0, vec![Vec3::ZERO, Vec3::ONE], Vec4::ONE);
        assert_eq!(drawer.render_stats().instances, 0);
        assert_eq!(drawer.render_stats().lines, 0);
    }

    #[test]
    fn physics_tick_window_tags_entries() {
        let drawer = DebugDrawer::new();
        assert_eq!(drawer.current_process_type(), ProcessType::Process);
        drawer.physics_process_start(0.016);
        assert_eq!(drawer.current_process_type(), ProcessType::Physics);
        drawer.physics_process_end(0.016);
        assert_eq!(drawer.current_process_type(), ProcessType::Process);
    }

    #[test]
    fn shared_across_threads() {
        let drawer = Arc::new(DebugDrawer::new());
        let mut handles = Vec::new();
        for t in 0..4u64 {
            let drawer = Arc::clone(&drawer);
            handles.push(std::thread::spawn(move || {
                for i in 0..50u64 {
                    drawer.add_instance(
                        InstanceType::Cube,
                        Some(t * 1000 + i),
                        1.0,
                        Affine3A::IDENTITY,
                        Vec4::ONE,
                        Vec4::ZERO,
                        SphereBounds::new(Vec3::ZERO, 0.5),
                    );
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(drawer.render_stats().instances, 200);
    }
}
