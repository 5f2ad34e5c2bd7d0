//! The geometry pool: every outstanding debug-draw request lives here.
//!
//! Point-instance entries are partitioned per [`InstanceType`] so batching
//! by mesh is O(1) per type; line entries live in one flat collection.
//! Repeated `draw_*` calls with the same identity key refresh their entry in
//! place instead of allocating a new one, keeping steady-state frames
//! allocation-free.
//!
//! None of these operations report errors: malformed geometric input is
//! clamped to safe defaults (and warned about once per class), because a
//! debug overlay must never destabilize the host.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::{Affine3A, Vec3, Vec4};

use crate::entry::{
    DelayedRendererInstance, DelayedRendererLine, ExpirationState, InstanceType, ProcessType,
};
use crate::math::{Aabb, Frustum, SphereBounds};
use crate::render::{InstanceBuffers, InstanceData, LineVertex};
use crate::stats::RenderStats;

/// Bounding sizes are clamped to this so culling tests stay well-defined.
pub const MIN_BOUNDS_SIZE: f32 = 1e-4;

static WARNED_BAD_TRANSFORM: AtomicBool = AtomicBool::new(false);
static WARNED_BAD_COLOR: AtomicBool = AtomicBool::new(false);
static WARNED_BAD_BOUNDS: AtomicBool = AtomicBool::new(false);

fn warn_once(flag: &AtomicBool, what: &str) {
    if !flag.swap(true, Ordering::Relaxed) {
        log::warn!("debug draw received {what}; clamping to a safe default (reported once)");
    }
}

fn sanitize_transform(transform: Affine3A) -> Affine3A {
    if transform.is_finite() {
        transform
    } else {
        warn_once(&WARNED_BAD_TRANSFORM, "a non-finite transform");
        Affine3A::IDENTITY
    }
}

fn sanitize_color(color: Vec4) -> Vec4 {
    if color.is_finite() {
        color
    } else {
        warn_once(&WARNED_BAD_COLOR, "a non-finite color");
        Vec4::ZERO
    }
}

fn sanitize_sphere(bounds: SphereBounds) -> SphereBounds {
    let center = if bounds.center.is_finite() {
        bounds.center
    } else {
        warn_once(&WARNED_BAD_BOUNDS, "non-finite bounds");
        Vec3::ZERO
    };
    let radius = if bounds.radius.is_finite() {
        bounds.radius.max(MIN_BOUNDS_SIZE)
    } else {
        warn_once(&WARNED_BAD_BOUNDS, "non-finite bounds");
        MIN_BOUNDS_SIZE
    };
    SphereBounds::new(center, radius)
}

fn sanitize_aabb(bounds: Aabb) -> Aabb {
    let position = if bounds.position.is_finite() {
        bounds.position
    } else {
        warn_once(&WARNED_BAD_BOUNDS, "non-finite bounds");
        Vec3::ZERO
    };
    let size = if bounds.size.is_finite() {
        bounds.size.max(Vec3::splat(MIN_BOUNDS_SIZE))
    } else {
        warn_once(&WARNED_BAD_BOUNDS, "non-finite bounds");
        Vec3::splat(MIN_BOUNDS_SIZE)
    };
    Aabb::new(position, size)
}

/// Camera positions and the distance beyond which entries are hidden.
#[derive(Debug, Clone, Default)]
pub struct DistanceCullingData {
    pub culling_distance: f32,
    pub camera_positions: Vec<Vec3>,
}

impl DistanceCullingData {
    pub fn new(culling_distance: f32, camera_positions: Vec<Vec3>) -> Self {
        Self {
            culling_distance,
            camera_positions,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    fn is_enabled(&self) -> bool {
        self.culling_distance > 0.0 && !self.camera_positions.is_empty()
    }

    fn is_within_distance(&self, point: Vec3) -> bool {
        let limit = self.culling_distance * self.culling_distance;
        self.camera_positions
            .iter()
            .any(|cam| cam.distance_squared(point) <= limit)
    }
}

/// One instance type's entries plus its identity index.
///
/// Removal is swap-based; the index entry of the entry moved into the hole
/// is rewritten to keep lookups exact.
#[derive(Default)]
struct InstanceCollection {
    entries: Vec<DelayedRendererInstance>,
    index: HashMap<u64, usize>,
}

impl InstanceCollection {
    fn remove_at(&mut self, i: usize) {
        if let Some(key) = self.entries[i].identity {
            self.index.remove(&key);
        }
        self.entries.swap_remove(i);
        if let Some(moved) = self.entries.get(i) {
            if let Some(key) = moved.identity {
                self.index.insert(key, i);
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

#[derive(Default)]
struct LineCollection {
    entries: Vec<DelayedRendererLine>,
    index: HashMap<u64, usize>,
}

impl LineCollection {
    fn remove_at(&mut self, i: usize) {
        if let Some(key) = self.entries[i].identity {
            self.index.remove(&key);
        }
        self.entries.swap_remove(i);
        if let Some(moved) = self.entries.get(i) {
            if let Some(key) = moved.identity {
                self.index.insert(key, i);
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// The pool of all live debug-draw entries.
pub struct GeometryPool {
    instances: [InstanceCollection; InstanceType::COUNT],
    lines: LineCollection,
    visible_instances: usize,
    visible_lines: usize,
    time_filling_buffers: Duration,
    time_culling: Duration,
    /// Completed ticks per phase, for diagnostics.
    ticks: [u64; 2],
}

impl GeometryPool {
    pub fn new() -> Self {
        Self {
            instances: std::array::from_fn(|_| InstanceCollection::default()),
            lines: LineCollection::default(),
            visible_instances: 0,
            visible_lines: 0,
            time_filling_buffers: Duration::ZERO,
            time_culling: Duration::ZERO,
            ticks: [0, 0],
        }
    }

    /// Create a new entry, or refresh the existing one reachable by
    /// `(instance_type, identity)`. Returns the entry for final tweaks
    /// (e.g. marking it single-frame).
    #[allow(clippy::too_many_arguments)]
    pub fn add_or_update_instance(
        &mut self,
        instance_type: InstanceType,
        identity: Option<u64>,
        process_type: ProcessType,
        duration: f32,
        transform: Affine3A,
        color: Vec4,
        custom_color: Vec4,
        bounds: SphereBounds,
    ) -> &mut DelayedRendererInstance {
        let transform = sanitize_transform(transform);
        let color = sanitize_color(color);
        let custom_color = sanitize_color(custom_color);
        let bounds = sanitize_sphere(bounds);
        let duration = if duration.is_finite() { duration } else { 0.0 };

        let collection = &mut self.instances[instance_type.index()];
        if let Some(i) = identity.and_then(|key| collection.index.get(&key).copied()) {
            let entry = &mut collection.entries[i];
            entry.transform = transform;
            entry.color = color;
            entry.custom_color = custom_color;
            entry.bounds = bounds;
            entry.state.refresh(duration, process_type);
            return entry;
        }

        collection.entries.push(DelayedRendererInstance {
            instance_type,
            transform,
            color,
            custom_color,
            bounds,
            state: ExpirationState::new(duration, process_type),
            identity,
        });
        let i = collection.entries.len() - 1;
        if let Some(key) = identity {
            collection.index.insert(key, i);
        }
        &mut collection.entries[i]
    }

    /// Line counterpart of [`add_or_update_instance`](Self::add_or_update_instance);
    /// `points` ownership moves into the pool.
    pub fn add_or_update_line(
        &mut self,
        identity: Option<u64>,
        process_type: ProcessType,
        duration: f32,
        mut points: Vec<Vec3>,
        color: Vec4,
    ) -> &mut DelayedRendererLine {
        for p in &mut points {
            if !p.is_finite() {
                warn_once(&WARNED_BAD_BOUNDS, "a non-finite line point");
                *p = Vec3::ZERO;
            }
        }
        let color = sanitize_color(color);
        let bounds = sanitize_aabb(Aabb::from_points(&points));
        let duration = if duration.is_finite() { duration } else { 0.0 };

        if let Some(i) = identity.and_then(|key| self.lines.index.get(&key).copied()) {
            let entry = &mut self.lines.entries[i];
            entry.points = points;
            entry.color = color;
            entry.bounds = bounds;
            entry.state.refresh(duration, process_type);
            return entry;
        }

        self.lines.entries.push(DelayedRendererLine {
            points,
            color,
            bounds,
            state: ExpirationState::new(duration, process_type),
            identity,
        });
        let i = self.lines.entries.len() - 1;
        if let Some(key) = identity {
            self.lines.index.insert(key, i);
        }
        &mut self.lines.entries[i]
    }

    /// Recompute `is_visible` for every entry.
    ///
    /// An entry is visible when it intersects *any* supplied frustum (an
    /// empty list disables culling) and, if distance culling is enabled,
    /// lies within the culling distance of the nearest camera.
    pub fn update_visibility(&mut self, frustums: &[Frustum], distance: &DistanceCullingData) {
        let started = Instant::now();
        // New timing window; both fill passes accumulate into it.
        self.time_filling_buffers = Duration::ZERO;

        for collection in &mut self.instances {
            for entry in &mut collection.entries {
                let mut visible =
                    frustums.is_empty() || frustums.iter().any(|f| f.intersects_sphere(&entry.bounds));
                if visible && distance.is_enabled() {
                    visible = distance.is_within_distance(entry.bounds.center);
                }
                entry.state.is_visible = visible;
            }
        }
        for entry in &mut self.lines.entries {
            let mut visible =
                frustums.is_empty() || frustums.iter().any(|f| f.intersects_aabb(&entry.bounds));
            if visible && distance.is_enabled() {
                visible = distance.is_within_distance(entry.bounds.center());
            }
            entry.state.is_visible = visible;
        }

        self.time_culling = started.elapsed();
    }

    /// Write every visible, non-expired instance into its type's dense
    /// buffer and mark all non-expired entries as drawn this frame.
    ///
    /// Order within a buffer is undefined; instancing makes it immaterial.
    pub fn fill_instance_data(&mut self, buffers: &mut InstanceBuffers, _delta: f32) {
        let started = Instant::now();
        buffers.reset();

        for ty in InstanceType::ALL {
            let collection = &mut self.instances[ty.index()];
            let buffer = buffers.get_mut(ty);
            for entry in &mut collection.entries {
                if entry.state.is_expired() {
                    continue;
                }
                if entry.state.is_visible {
                    buffer.push(InstanceData::new(
                        &entry.transform,
                        entry.color,
                        entry.custom_color,
                    ));
                }
                // Even a culled entry has had its frame; one-shot entries
                // must not outlive it.
                entry.state.was_drawn = true;
            }
        }

        self.time_filling_buffers += started.elapsed();
    }

    /// Concatenate every visible, non-expired line entry into one shared
    /// vertex buffer, with per-line color.
    pub fn fill_lines_data(&mut self, out: &mut Vec<LineVertex>, _delta: f32) {
        let started = Instant::now();
        out.clear();

        for entry in &mut self.lines.entries {
            if entry.state.is_expired() {
                continue;
            }
            if entry.state.is_visible {
                let color = entry.color.to_array();
                out.extend(entry.points.iter().map(|p| LineVertex {
                    position: p.to_array(),
                    color,
                }));
            }
            entry.state.was_drawn = true;
        }

        self.time_filling_buffers += started.elapsed();
    }

    /// Remove expired entries of the given phase and advance the remaining
    /// lifetime of the survivors by `delta`.
    pub fn update_expiration(&mut self, delta: f32, process_type: ProcessType) {
        for collection in &mut self.instances {
            let mut i = 0;
            while i < collection.entries.len() {
                let entry = &mut collection.entries[i];
                if entry.state.process_type != process_type {
                    i += 1;
                    continue;
                }
                if entry.state.is_expired() {
                    collection.remove_at(i);
                } else {
                    entry.state.expiration_time -= delta;
                    i += 1;
                }
            }
        }

        let mut i = 0;
        while i < self.lines.entries.len() {
            let entry = &mut self.lines.entries[i];
            if entry.state.process_type != process_type {
                i += 1;
                continue;
            }
            if entry.state.is_expired() {
                self.lines.remove_at(i);
            } else {
                entry.state.expiration_time -= delta;
                i += 1;
            }
        }
    }

    /// Per-phase end-of-tick bookkeeping.
    pub fn reset_counter(&mut self, _delta: f32, process_type: ProcessType) {
        self.ticks[process_type.index()] = self.ticks[process_type.index()].wrapping_add(1);
    }

    /// Recompute the visible-entry statistics.
    pub fn scan_visible_instances(&mut self) {
        self.visible_instances = self
            .instances
            .iter()
            .flat_map(|c| c.entries.iter())
            .filter(|e| e.state.is_visible && !e.state.is_expired())
            .count();
        self.visible_lines = self
            .lines
            .entries
            .iter()
            .filter(|e| e.state.is_visible && !e.state.is_expired())
            .count();
    }

    /// Zero the visibility statistics (used when drawing is disabled).
    pub fn reset_visible_counters(&mut self) {
        self.visible_instances = 0;
        self.visible_lines = 0;
        self.time_culling = Duration::ZERO;
        self.time_filling_buffers = Duration::ZERO;
    }

    /// Read-only iteration over every instance entry. Callbacks must not
    /// mutate pool structure; collect first, mutate after.
    pub fn for_each_instance(&self, mut f: impl FnMut(&DelayedRendererInstance)) {
        for collection in &self.instances {
            for entry in &collection.entries {
                f(entry);
            }
        }
    }

    /// Read-only iteration over every line entry.
    pub fn for_each_line(&self, mut f: impl FnMut(&DelayedRendererLine)) {
        for entry in &self.lines.entries {
            f(entry);
        }
    }

    /// Empty all collections unconditionally.
    pub fn clear_pool(&mut self) {
        for collection in &mut self.instances {
            collection.clear();
        }
        self.lines.clear();
        self.visible_instances = 0;
        self.visible_lines = 0;
    }

    pub fn instance_count(&self) -> usize {
        self.instances.iter().map(|c| c.entries.len()).sum()
    }

    pub fn line_count(&self) -> usize {
        self.lines.entries.len()
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            instances: self.instance_count(),
            visible_instances: self.visible_instances,
            lines: self.line_count(),
            visible_lines: self.visible_lines,
            time_filling_buffers: self.time_filling_buffers,
            time_culling: self.time_culling,
        }
    }
}

impl Default for GeometryPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn sphere_at(pool: &mut GeometryPool, key: Option<u64>, pos: Vec3, duration: f32) {
        pool.add_or_update_instance(
            InstanceType::Sphere,
            key,
            ProcessType::Process,
            duration,
            Affine3A::from_translation(pos),
            Vec4::ONE,
            Vec4::ZERO,
            SphereBounds::new(pos, 0.5),
        );
    }

    fn render_frame(pool: &mut GeometryPool, buffers: &mut InstanceBuffers, delta: f32) {
        pool.update_visibility(&[], &DistanceCullingData::disabled());
        let mut lines = Vec::new();
        pool.fill_lines_data(&mut lines, delta);
        pool.fill_instance_data(buffers, delta);
        pool.scan_visible_instances();
        pool.update_expiration(delta, ProcessType::Process);
        pool.reset_counter(delta, ProcessType::Process);
    }

    #[test]
    fn same_identity_never_duplicates() {
        let mut pool = GeometryPool::new();
        for i in 0..100 {
            sphere_at(&mut pool, Some(42), Vec3::splat(i as f32), 1.0);
        }
        assert_eq!(pool.instance_count(), 1);
    }

    #[test]
    fn distinct_identities_coexist() {
        let mut pool = GeometryPool::new();
        sphere_at(&mut pool, Some(1), Vec3::ZERO, 1.0);
        sphere_at(&mut pool, Some(2), Vec3::ONE, 1.0);
        sphere_at(&mut pool, None, Vec3::ONE, 1.0);
        sphere_at(&mut pool, None, Vec3::ONE, 1.0);
        assert_eq!(pool.instance_count(), 4);
    }

    #[test]
    fn same_identity_different_type_is_separate() {
        let mut pool = GeometryPool::new();
        sphere_at(&mut pool, Some(7), Vec3::ZERO, 1.0);
        pool.add_or_update_instance(
            InstanceType::Cube,
            Some(7),
            ProcessType::Process,
            1.0,
            Affine3A::IDENTITY,
            Vec4::ONE,
            Vec4::ZERO,
            SphereBounds::new(Vec3::ZERO, 0.5),
        );
        assert_eq!(pool.instance_count(), 2);
    }

    #[test]
    fn duration_expiry_sequence() {
        let mut pool = GeometryPool::new();
        let mut buffers = InstanceBuffers::new();
        sphere_at(&mut pool, Some(1), Vec3::ZERO, 2.0);

        render_frame(&mut pool, &mut buffers, 1.0);
        assert_eq!(buffers.get(InstanceType::Sphere).len(), 1);

        render_frame(&mut pool, &mut buffers, 1.5);
        assert_eq!(buffers.get(InstanceType::Sphere).len(), 1);

        // Total elapsed 2.5 > 2.0: gone from the output.
        render_frame(&mut pool, &mut buffers, 0.1);
        assert_eq!(buffers.get(InstanceType::Sphere).len(), 0);
        assert_eq!(pool.instance_count(), 0);
    }

    #[test]
    fn zero_duration_lasts_exactly_one_frame() {
        let mut pool = GeometryPool::new();
        let mut buffers = InstanceBuffers::new();
        sphere_at(&mut pool, None, Vec3::ZERO, 0.0);

        render_frame(&mut pool, &mut buffers, 0.016);
        assert_eq!(buffers.get(InstanceType::Sphere).len(), 1);
        assert_eq!(pool.instance_count(), 0);
    }

    #[test]
    fn physics_entry_survives_until_rendered() {
        let mut pool = GeometryPool::new();
        let mut buffers = InstanceBuffers::new();
        pool.add_or_update_instance(
            InstanceType::Cube,
            Some(1),
            ProcessType::Physics,
            0.0,
            Affine3A::IDENTITY,
            Vec4::ONE,
            Vec4::ZERO,
            SphereBounds::new(Vec3::ZERO, 0.5),
        );

        // Several physics sweeps before any render frame: entry survives.
        for _ in 0..3 {
            pool.update_expiration(1.0 / 60.0, ProcessType::Physics);
        }
        assert_eq!(pool.instance_count(), 1);

        // A render frame draws it (render-phase sweep ignores physics entries).
        render_frame(&mut pool, &mut buffers, 1.0 / 60.0);
        assert_eq!(buffers.get(InstanceType::Cube).len(), 1);
        assert_eq!(pool.instance_count(), 1);

        // The next physics sweep finally retires it.
        pool.update_expiration(1.0 / 60.0, ProcessType::Physics);
        assert_eq!(pool.instance_count(), 0);
    }

    #[test]
    fn refresh_rearms_expiration() {
        let mut pool = GeometryPool::new();
        let mut buffers = InstanceBuffers::new();
        sphere_at(&mut pool, Some(5), Vec3::ZERO, 0.0);
        render_frame(&mut pool, &mut buffers, 0.016);
        assert_eq!(pool.instance_count(), 0);

        sphere_at(&mut pool, Some(5), Vec3::ZERO, 0.0);
        // Refreshed before the sweep: still one entry, drawn again.
        sphere_at(&mut pool, Some(5), Vec3::ONE, 0.0);
        assert_eq!(pool.instance_count(), 1);
        render_frame(&mut pool, &mut buffers, 0.016);
        assert_eq!(pool.instance_count(), 0);
    }

    #[test]
    fn one_time_entry_removed_despite_long_duration() {
        let mut pool = GeometryPool::new();
        let mut buffers = InstanceBuffers::new();
        pool.add_or_update_instance(
            InstanceType::Sphere,
            None,
            ProcessType::Process,
            100.0,
            Affine3A::IDENTITY,
            Vec4::ONE,
            Vec4::ZERO,
            SphereBounds::new(Vec3::ZERO, 0.5),
        )
        .state
        .is_used_one_time = true;

        render_frame(&mut pool, &mut buffers, 0.016);
        assert_eq!(buffers.get(InstanceType::Sphere).len(), 1);
        assert_eq!(pool.instance_count(), 0);
    }

    #[test]
    fn culled_one_frame_entry_does_not_leak() {
        let mut pool = GeometryPool::new();
        let mut buffers = InstanceBuffers::new();
        sphere_at(&mut pool, None, Vec3::new(0.0, 0.0, 500.0), 0.0);

        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        pool.update_visibility(&[Frustum::from_view_projection(&proj)], &DistanceCullingData::disabled());
        pool.fill_instance_data(&mut buffers, 0.016);
        assert_eq!(buffers.get(InstanceType::Sphere).len(), 0);

        pool.update_expiration(0.016, ProcessType::Process);
        assert_eq!(pool.instance_count(), 0);
    }

    #[test]
    fn empty_frustum_list_disables_culling() {
        let mut pool = GeometryPool::new();
        sphere_at(&mut pool, Some(1), Vec3::splat(1e6), 1.0);
        pool.update_visibility(&[], &DistanceCullingData::disabled());
        pool.scan_visible_instances();
        assert_eq!(pool.stats().visible_instances, 1);
    }

    #[test]
    fn visible_in_any_of_two_frustums() {
        let mut pool = GeometryPool::new();
        // Looking down -Z and +Z respectively.
        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let forward = Frustum::from_view_projection(&proj);
        let backward = Frustum::from_view_projection(
            &(proj * Mat4::from_rotation_y(std::f32::consts::PI)),
        );

        sphere_at(&mut pool, Some(1), Vec3::new(0.0, 0.0, -10.0), 1.0);
        sphere_at(&mut pool, Some(2), Vec3::new(0.0, 0.0, 10.0), 1.0);
        sphere_at(&mut pool, Some(3), Vec3::new(0.0, 500.0, 0.0), 1.0);

        pool.update_visibility(&[forward, backward], &DistanceCullingData::disabled());
        pool.scan_visible_instances();
        assert_eq!(pool.stats().visible_instances, 2);
    }

    #[test]
    fn distance_culling_hides_far_entries() {
        let mut pool = GeometryPool::new();
        sphere_at(&mut pool, Some(1), Vec3::new(0.0, 0.0, -5.0), 1.0);
        sphere_at(&mut pool, Some(2), Vec3::new(0.0, 0.0, -50.0), 1.0);

        pool.update_visibility(
            &[],
            &DistanceCullingData::new(10.0, vec![Vec3::ZERO]),
        );
        pool.scan_visible_instances();
        assert_eq!(pool.stats().visible_instances, 1);
    }

    #[test]
    fn line_visibility_uses_aabb() {
        let mut pool = GeometryPool::new();
        pool.add_or_update_line(
            Some(1),
            ProcessType::Process,
            1.0,
            vec![Vec3::new(-1.0, 0.0, -10.0), Vec3::new(1.0, 0.0, -10.0)],
            Vec4::ONE,
        );
        pool.add_or_update_line(
            Some(2),
            ProcessType::Process,
            1.0,
            vec![Vec3::new(-1.0, 0.0, 50.0), Vec3::new(1.0, 0.0, 50.0)],
            Vec4::ONE,
        );

        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        pool.update_visibility(&[Frustum::from_view_projection(&proj)], &DistanceCullingData::disabled());

        let mut out = Vec::new();
        pool.fill_lines_data(&mut out, 0.016);
        assert_eq!(out.len(), 2); // only the in-view segment
    }

    #[test]
    fn swap_removal_keeps_identity_index_consistent() {
        let mut pool = GeometryPool::new();
        sphere_at(&mut pool, Some(1), Vec3::ZERO, 0.0); // removed first frame
        sphere_at(&mut pool, Some(2), Vec3::ONE, 10.0);
        sphere_at(&mut pool, Some(3), Vec3::splat(2.0), 10.0);

        let mut buffers = InstanceBuffers::new();
        render_frame(&mut pool, &mut buffers, 0.016);
        assert_eq!(pool.instance_count(), 2);

        // Refreshing identity 3 must hit its (relocated) entry, not grow.
        sphere_at(&mut pool, Some(3), Vec3::splat(9.0), 10.0);
        assert_eq!(pool.instance_count(), 2);

        let mut found = Vec3::ZERO;
        pool.for_each_instance(|e| {
            if e.identity == Some(3) {
                found = Vec3::from(e.transform.translation);
            }
        });
        assert_eq!(found, Vec3::splat(9.0));
    }

    #[test]
    fn clear_pool_empties_everything() {
        let mut pool = GeometryPool::new();
        sphere_at(&mut pool, Some(1), Vec3::ZERO, 100.0);
        pool.add_or_update_line(
            None,
            ProcessType::Physics,
            100.0,
            vec![Vec3::ZERO, Vec3::ONE],
            Vec4::ONE,
        );
        pool.clear_pool();
        assert_eq!(pool.instance_count(), 0);
        assert_eq!(pool.line_count(), 0);

        let mut buffers = InstanceBuffers::new();
        let mut lines = Vec::new();
        pool.fill_instance_data(&mut buffers, 0.016);
        pool.fill_lines_data(&mut lines, 0.016);
        for ty in InstanceType::ALL {
            assert!(buffers.get(ty).is_empty());
        }
        assert!(lines.is_empty());
    }

    #[test]
    fn fill_timing_is_independent_of_fill_order() {
        let mut pool = GeometryPool::new();
        sphere_at(&mut pool, Some(1), Vec3::ZERO, 10.0);
        pool.add_or_update_line(
            Some(2),
            ProcessType::Process,
            10.0,
            vec![Vec3::ZERO, Vec3::ONE],
            Vec4::ONE,
        );

        let mut buffers = InstanceBuffers::new();
        let mut lines = Vec::new();

        // Instances first, then lines: the stat must cover both passes.
        pool.update_visibility(&[], &DistanceCullingData::disabled());
        pool.fill_instance_data(&mut buffers, 0.016);
        let instances_only = pool.stats().time_filling_buffers;
        pool.fill_lines_data(&mut lines, 0.016);
        assert!(pool.stats().time_filling_buffers >= instances_only);

        // The next visibility pass opens a fresh window.
        pool.update_visibility(&[], &DistanceCullingData::disabled());
        assert_eq!(pool.stats().time_filling_buffers, Duration::ZERO);
    }

    #[test]
    fn malformed_input_is_clamped_not_rejected() {
        let mut pool = GeometryPool::new();
        let entry = pool.add_or_update_instance(
            InstanceType::Sphere,
            None,
            ProcessType::Process,
            f32::NAN,
            Affine3A::from_translation(Vec3::splat(f32::NAN)),
            Vec4::splat(f32::NAN),
            Vec4::ZERO,
            SphereBounds::new(Vec3::ZERO, 0.0),
        );
        assert!(entry.transform.is_finite());
        assert!(entry.color.is_finite());
        assert!(entry.bounds.radius >= MIN_BOUNDS_SIZE);
        assert_eq!(entry.state.expiration_time, 0.0);

        let line = pool.add_or_update_line(
            None,
            ProcessType::Process,
            0.0,
            vec![Vec3::splat(f32::NAN), Vec3::ONE],
            Vec4::ONE,
        );
        assert!(line.points.iter().all(|p| p.is_finite()));
        assert!(line.bounds.size.cmpge(Vec3::splat(MIN_BOUNDS_SIZE)).all());
    }

    #[test]
    fn line_identity_refresh_takes_new_points() {
        let mut pool = GeometryPool::new();
        pool.add_or_update_line(
            Some(9),
            ProcessType::Process,
            1.0,
            vec![Vec3::ZERO, Vec3::ONE],
            Vec4::ONE,
        );
        pool.add_or_update_line(
            Some(9),
            ProcessType::Process,
            1.0,
            vec![Vec3::ZERO, Vec3::ONE, Vec3::ZERO, Vec3::splat(2.0)],
            Vec4::ONE,
        );
        assert_eq!(pool.line_count(), 1);
        let mut len = 0;
        pool.for_each_line(|l| len = l.points.len());
        assert_eq!(len, 4);
    }
}
