//! The user-facing `draw_*` surface of [`DebugDrawer`].
//!
//! Every method takes an RGBA `color` and a `duration` in seconds
//! (`0.0` = one frame). Calls are keyed by a hash of the shape kind and its
//! geometric parameters, so repeating a call on a later frame refreshes the
//! existing entry in place instead of stacking a new one. Colors and
//! durations are not part of the key and can be animated freely.
//!
//! The scoped config (see [`DebugDrawer::scoped_config`]) resolved at call
//! time decides volumetric thickness, sphere density, and plane sizing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};

use glam::{Affine3A, Mat3, Quat, Vec3, Vec4};

use crate::colors;
use crate::drawer::DebugDrawer;
use crate::entry::InstanceType;
use crate::math::{self, Aabb, Plane, SphereBounds};
use crate::scope_config::ScopeConfigData;

/// How [`DebugDrawer::draw_points`] renders each point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointType {
    Square,
    Sphere,
}

static WARNED_ODD_POINTS: AtomicBool = AtomicBool::new(false);

/// Hashes a shape kind plus its geometric parameters into an identity key.
/// Colors and durations are deliberately excluded.
struct IdentityKey {
    hasher: DefaultHasher,
}

impl IdentityKey {
    fn new(kind: &'static str) -> Self {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        Self { hasher }
    }

    fn f32(mut self, v: f32) -> Self {
        self.hasher.write_u32(v.to_bits());
        self
    }

    fn bool(mut self, v: bool) -> Self {
        self.hasher.write_u8(v as u8);
        self
    }

    fn vec3(self, v: Vec3) -> Self {
        self.f32(v.x).f32(v.y).f32(v.z)
    }

    fn points(self, points: &[Vec3]) -> Self {
        points.iter().fold(self, |key, p| key.vec3(*p))
    }

    fn affine(self, t: &Affine3A) -> Self {
        self.vec3(t.matrix3.x_axis.into())
            .vec3(t.matrix3.y_axis.into())
            .vec3(t.matrix3.z_axis.into())
            .vec3(t.translation.into())
    }

    fn finish(&self) -> u64 {
        self.hasher.finish()
    }
}

/// Derive a sub-key for the `i`-th piece of a compound draw.
fn sub_key(key: u64, i: usize) -> u64 {
    key ^ (i as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

fn custom_channel(scope: &ScopeConfigData) -> Vec4 {
    Vec4::new(scope.thickness, scope.center_brightness, 0.0, 0.0)
}

fn resolve_type(scope: &ScopeConfigData, ty: InstanceType) -> InstanceType {
    if scope.thickness > 0.0 {
        ty.volumetric()
    } else {
        ty
    }
}

/// Transform placing the unit line (origin to `(0, 0, -1)`) onto `a..b`.
fn segment_transform(a: Vec3, b: Vec3) -> Affine3A {
    let basis = math::basis_from_direction(a - b);
    let m = Mat3::from_cols(basis.x_axis, basis.y_axis, basis.z_axis * a.distance(b));
    Affine3A::from_mat3_translation(m, a)
}

fn segment_bounds(a: Vec3, b: Vec3, thickness: f32) -> SphereBounds {
    SphereBounds::new((a + b) * 0.5, a.distance(b) * 0.5 + thickness)
}

/// Transform placing the unit arrowhead (tip at origin, base ring at
/// `z = +1`) at `tip`, pointing along `dir`, scaled by `size`.
fn arrowhead_transform(tip: Vec3, dir: Vec3, size: f32) -> Affine3A {
    let basis = math::basis_from_direction(-dir) * size;
    Affine3A::from_mat3_translation(basis, tip)
}

fn even_points(mut points: Vec<Vec3>) -> Vec<Vec3> {
    if points.len() % 2 != 0 {
        if !WARNED_ODD_POINTS.swap(true, Ordering::Relaxed) {
            log::warn!("odd number of line points; the last one is dropped (reported once)");
        }
        points.pop();
    }
    points
}

fn path_to_segments(path: &[Vec3]) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(path.len().saturating_sub(1) * 2);
    for pair in path.windows(2) {
        points.push(pair[0]);
        points.push(pair[1]);
    }
    points
}

impl DebugDrawer {
    /// Route line segments either to the immediate line buffer or, when the
    /// scoped thickness is non-zero, to per-segment volumetric instances.
    fn push_segments(&self, key: u64, points: Vec<Vec3>, color: Vec4, duration: f32) {
        let points = even_points(points);
        if points.is_empty() {
            return;
        }
        let scope = self.scope_snapshot();
        if scope.thickness > 0.0 {
            let custom = custom_channel(&scope);
            for (i, pair) in points.chunks_exact(2).enumerate() {
                self.add_instance(
                    InstanceType::LineVolumetric,
                    Some(sub_key(key, i)),
                    duration,
                    segment_transform(pair[0], pair[1]),
                    color,
                    custom,
                    segment_bounds(pair[0], pair[1], scope.thickness),
                );
            }
        } else {
            self.add_line(Some(key), duration, points, color);
        }
    }

    fn push_shape(
        &self,
        ty: InstanceType,
        key: u64,
        duration: f32,
        transform: Affine3A,
        color: Vec4,
        bounds: SphereBounds,
    ) {
        let scope = self.scope_snapshot();
        self.add_instance(
            resolve_type(&scope, ty),
            Some(key),
            duration,
            transform,
            color,
            custom_channel(&scope),
            bounds,
        );
    }

    // ---- spheres ----

    pub fn draw_sphere(&self, position: Vec3, radius: f32, color: Vec4, duration: f32) {
        let key = IdentityKey::new("sphere").vec3(position).f32(radius).finish();
        let transform = Affine3A::from_scale_rotation_translation(
            Vec3::splat(radius * 2.0),
            Quat::IDENTITY,
            position,
        );
        self.push_shape(
            self.sphere_type(),
            key,
            duration,
            transform,
            color,
            SphereBounds::new(position, radius),
        );
    }

    /// Sphere from a full transform; the unit mesh has diameter 1.
    pub fn draw_sphere_xf(&self, transform: &Affine3A, color: Vec4, duration: f32) {
        let key = IdentityKey::new("sphere_xf").affine(transform).finish();
        self.push_shape(
            self.sphere_type(),
            key,
            duration,
            *transform,
            color,
            SphereBounds::from_centered_unit_transform(transform),
        );
    }

    fn sphere_type(&self) -> InstanceType {
        if self.scope_snapshot().hd_sphere {
            InstanceType::SphereHd
        } else {
            InstanceType::Sphere
        }
    }

    // ---- cylinders ----

    /// Cylinder from a full transform; the unit mesh is centered, radius
    /// 0.5, height 1, along local Y.
    pub fn draw_cylinder(&self, transform: &Affine3A, color: Vec4, duration: f32) {
        let key = IdentityKey::new("cylinder").affine(transform).finish();
        self.push_shape(
            InstanceType::Cylinder,
            key,
            duration,
            *transform,
            color,
            SphereBounds::from_centered_unit_transform(transform),
        );
    }

    /// Cylinder whose two cap centers are `a` and `b`.
    pub fn draw_cylinder_ab(&self, a: Vec3, b: Vec3, radius: f32, color: Vec4, duration: f32) {
        let key = IdentityKey::new("cylinder_ab")
            .vec3(a)
            .vec3(b)
            .f32(radius)
            .finish();
        let basis = math::basis_from_direction(b - a);
        let diameter = radius * 2.0;
        let m = Mat3::from_cols(
            basis.x_axis * diameter,
            basis.y_axis * diameter,
            basis.z_axis * a.distance(b).max(f32::EPSILON),
        );
        let transform = Affine3A::from_mat3_translation(m, (a + b) * 0.5);
        self.push_shape(
            InstanceType::CylinderAb,
            key,
            duration,
            transform,
            color,
            SphereBounds::from_centered_unit_transform(&transform),
        );
    }

    // ---- boxes ----

    pub fn draw_box(
        &self,
        position: Vec3,
        rotation: Quat,
        size: Vec3,
        color: Vec4,
        is_box_centered: bool,
        duration: f32,
    ) {
        let key = IdentityKey::new("box")
            .vec3(position)
            .vec3(rotation.to_scaled_axis())
            .vec3(size)
            .bool(is_box_centered)
            .finish();
        let transform = Affine3A::from_scale_rotation_translation(size, rotation, position);
        self.push_box_xf(key, &transform, color, is_box_centered, duration);
    }

    /// Box from a full transform. Centered boxes use the unit mesh around
    /// the origin; corner boxes use the `[0, 1]^3` mesh.
    pub fn draw_box_xf(
        &self,
        transform: &Affine3A,
        color: Vec4,
        is_box_centered: bool,
        duration: f32,
    ) {
        let key = IdentityKey::new("box_xf")
            .affine(transform)
            .bool(is_box_centered)
            .finish();
        self.push_box_xf(key, transform, color, is_box_centered, duration);
    }

    fn push_box_xf(
        &self,
        key: u64,
        transform: &Affine3A,
        color: Vec4,
        is_box_centered: bool,
        duration: f32,
    ) {
        let (ty, bounds) = if is_box_centered {
            (
                InstanceType::CubeCentered,
                SphereBounds::from_centered_unit_transform(transform),
            )
        } else {
            (
                InstanceType::Cube,
                SphereBounds::new(
                    transform.transform_point3(Vec3::splat(0.5)),
                    SphereBounds::from_centered_unit_transform(transform).radius,
                ),
            )
        };
        self.push_shape(ty, key, duration, *transform, color, bounds);
    }

    /// Box between `a` and `b`, oriented by `up`.
    ///
    /// With `is_ab_diagonal` the segment is the full corner-to-corner
    /// diagonal (square cross-section); without it `a` and `b` are the
    /// centers of two opposite faces and `up.length()` sets the side of the
    /// square cross-section.
    pub fn draw_box_ab(
        &self,
        a: Vec3,
        b: Vec3,
        up: Vec3,
        color: Vec4,
        is_ab_diagonal: bool,
        duration: f32,
    ) {
        let key = IdentityKey::new("box_ab")
            .vec3(a)
            .vec3(b)
            .vec3(up)
            .bool(is_ab_diagonal)
            .finish();
        let diff = b - a;
        let center = (a + b) * 0.5;

        let transform = if is_ab_diagonal {
            let y = {
                let n = up.normalize_or_zero();
                if n == Vec3::ZERO { Vec3::Y } else { n }
            };
            let vertical = diff.dot(y);
            let horizontal = diff - y * vertical;
            let h_len = horizontal.length();
            let u = if h_len > f32::EPSILON {
                horizontal / h_len
            } else {
                y.any_orthonormal_vector()
            };
            let w = y.cross(u);
            // Rotate the cross-section 45 degrees so its diagonal runs
            // along the horizontal component and a..b spans true corners.
            let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
            let x = (u - w) * inv_sqrt2;
            let z = (u + w) * inv_sqrt2;
            let side = (h_len * inv_sqrt2).max(f32::EPSILON);
            let m = Mat3::from_cols(x * side, y * vertical.abs().max(f32::EPSILON), z * side);
            Affine3A::from_mat3_translation(m, center)
        } else {
            let basis = math::basis_from_direction(diff);
            let side = up.length().max(f32::EPSILON);
            let m = Mat3::from_cols(
                basis.x_axis * side,
                basis.y_axis * side,
                basis.z_axis * diff.length().max(f32::EPSILON),
            );
            Affine3A::from_mat3_translation(m, center)
        };

        self.push_shape(
            InstanceType::CubeCentered,
            key,
            duration,
            transform,
            color,
            SphereBounds::from_centered_unit_transform(&transform),
        );
    }

    pub fn draw_aabb(&self, aabb: Aabb, color: Vec4, duration: f32) {
        let key = IdentityKey::new("aabb")
            .vec3(aabb.position)
            .vec3(aabb.size)
            .finish();
        let transform = Affine3A::from_scale_rotation_translation(
            aabb.size,
            Quat::IDENTITY,
            aabb.position,
        );
        self.push_shape(
            InstanceType::Cube,
            key,
            duration,
            transform,
            color,
            aabb.enclosing_sphere(),
        );
    }

    /// Axis-aligned box with `a` and `b` as its diagonal.
    pub fn draw_aabb_ab(&self, a: Vec3, b: Vec3, color: Vec4, duration: f32) {
        self.draw_aabb(Aabb::new(a.min(b), (b - a).abs()), color, duration);
    }

    // ---- lines ----

    pub fn draw_line(&self, a: Vec3, b: Vec3, color: Vec4, duration: f32) {
        let key = IdentityKey::new("line").vec3(a).vec3(b).finish();
        self.push_segments(key, vec![a, b], color, duration);
    }

    /// Independent segments: `points[0]..points[1]`, `points[2]..points[3]`,
    /// and so on. An odd trailing point is dropped.
    pub fn draw_lines(&self, points: &[Vec3], color: Vec4, duration: f32) {
        let key = IdentityKey::new("lines").points(points).finish();
        self.push_segments(key, points.to_vec(), color, duration);
    }

    /// Polyline through every point of `path` in order.
    pub fn draw_line_path(&self, path: &[Vec3], color: Vec4, duration: f32) {
        if path.len() < 2 {
            return;
        }
        let key = IdentityKey::new("line_path").points(path).finish();
        self.push_segments(key, path_to_segments(path), color, duration);
    }

    pub fn draw_ray(&self, origin: Vec3, direction: Vec3, length: f32, color: Vec4, duration: f32) {
        let end = origin + direction.normalize_or_zero() * length;
        let key = IdentityKey::new("ray")
            .vec3(origin)
            .vec3(direction)
            .f32(length)
            .finish();
        self.push_segments(key, vec![origin, end], color, duration);
    }

    /// Raycast visualization: the segment before the hit, the segment after
    /// it, and a billboard square at the hit point. `None` colors fall back
    /// to the configured hit colors.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line_hit(
        &self,
        start: Vec3,
        end: Vec3,
        hit: Vec3,
        is_hit: bool,
        hit_size: f32,
        hit_color: Option<Vec4>,
        after_hit_color: Option<Vec4>,
        duration: f32,
    ) {
        let config = self.config();
        let hit_color = hit_color.unwrap_or(config.line_hit_color);
        let after_hit_color = after_hit_color.unwrap_or(config.line_after_hit_color);
        let key = IdentityKey::new("line_hit")
            .vec3(start)
            .vec3(end)
            .vec3(hit)
            .bool(is_hit)
            .f32(hit_size)
            .finish();

        if is_hit {
            self.push_segments(sub_key(key, 0), vec![start, hit], hit_color, duration);
            self.push_segments(sub_key(key, 1), vec![hit, end], after_hit_color, duration);
            let transform = Affine3A::from_scale_rotation_translation(
                Vec3::splat(hit_size),
                Quat::IDENTITY,
                hit,
            );
            self.push_shape(
                InstanceType::BillboardSquare,
                sub_key(key, 2),
                duration,
                transform,
                hit_color,
                SphereBounds::new(hit, hit_size),
            );
        } else {
            self.push_segments(key, vec![start, end], hit_color, duration);
        }
    }

    /// Like [`draw_line_hit`](Self::draw_line_hit), with the hit point given
    /// as a `0..=1` fraction along the segment.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line_hit_offset(
        &self,
        start: Vec3,
        end: Vec3,
        is_hit: bool,
        unit_offset_of_hit: f32,
        hit_size: f32,
        hit_color: Option<Vec4>,
        after_hit_color: Option<Vec4>,
        duration: f32,
    ) {
        let t = if unit_offset_of_hit.is_finite() {
            unit_offset_of_hit.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let hit = start + (end - start) * t;
        self.draw_line_hit(
            start,
            end,
            hit,
            is_hit,
            hit_size,
            hit_color,
            after_hit_color,
            duration,
        );
    }

    // ---- arrows ----

    /// Raw arrowhead instance from a full transform (tip at the local
    /// origin, base ring at local `z = +1`).
    pub fn draw_arrowhead(&self, transform: &Affine3A, color: Vec4, duration: f32) {
        let key = IdentityKey::new("arrowhead").affine(transform).finish();
        self.push_shape(
            InstanceType::Arrowhead,
            key,
            duration,
            *transform,
            color,
            SphereBounds::from_centered_unit_transform(transform),
        );
    }

    /// Line from `a` to `b` with an arrowhead at `b`. `arrow_size` is either
    /// absolute or a fraction of the segment length.
    pub fn draw_arrow(
        &self,
        a: Vec3,
        b: Vec3,
        color: Vec4,
        arrow_size: f32,
        is_absolute_size: bool,
        duration: f32,
    ) {
        let key = IdentityKey::new("arrow")
            .vec3(a)
            .vec3(b)
            .f32(arrow_size)
            .bool(is_absolute_size)
            .finish();
        self.push_arrow(key, a, b, color, arrow_size, is_absolute_size, duration);
    }

    pub fn draw_arrow_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        length: f32,
        color: Vec4,
        arrow_size: f32,
        is_absolute_size: bool,
        duration: f32,
    ) {
        let end = origin + direction.normalize_or_zero() * length;
        let key = IdentityKey::new("arrow_ray")
            .vec3(origin)
            .vec3(direction)
            .f32(length)
            .f32(arrow_size)
            .bool(is_absolute_size)
            .finish();
        self.push_arrow(key, origin, end, color, arrow_size, is_absolute_size, duration);
    }

    /// Polyline with an arrowhead at the end of every segment.
    pub fn draw_arrow_path(
        &self,
        path: &[Vec3],
        color: Vec4,
        arrow_size: f32,
        is_absolute_size: bool,
        duration: f32,
    ) {
        if path.len() < 2 {
            return;
        }
        let key = IdentityKey::new("arrow_path")
            .points(path)
            .f32(arrow_size)
            .bool(is_absolute_size)
            .finish();
        for (i, pair) in path.windows(2).enumerate() {
            self.push_arrow(
                sub_key(key, i),
                pair[0],
                pair[1],
                color,
                arrow_size,
                is_absolute_size,
                duration,
            );
        }
    }

    fn push_arrow(
        &self,
        key: u64,
        a: Vec3,
        b: Vec3,
        color: Vec4,
        arrow_size: f32,
        is_absolute_size: bool,
        duration: f32,
    ) {
        self.push_segments(sub_key(key, 100), vec![a, b], color, duration);
        let size = if is_absolute_size {
            arrow_size
        } else {
            arrow_size * a.distance(b)
        };
        let size = size.max(f32::EPSILON);
        let dir = (b - a).normalize_or_zero();
        let scope = self.scope_snapshot();
        self.add_instance(
            resolve_type(&scope, InstanceType::Arrowhead),
            Some(sub_key(key, 101)),
            duration,
            arrowhead_transform(b, dir, size),
            color,
            custom_channel(&scope),
            SphereBounds::new(b - dir * size * 0.5, size * 0.6),
        );
    }

    // ---- points ----

    pub fn draw_points(
        &self,
        points: &[Vec3],
        point_type: PointType,
        size: f32,
        color: Vec4,
        duration: f32,
    ) {
        let key = IdentityKey::new("points")
            .points(points)
            .f32(size)
            .bool(point_type == PointType::Sphere)
            .finish();
        for (i, point) in points.iter().enumerate() {
            self.push_point(sub_key(key, i), *point, point_type, size, color, duration);
        }
    }

    /// Polyline with a point marker at every vertex.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_point_path(
        &self,
        path: &[Vec3],
        point_type: PointType,
        size: f32,
        points_color: Vec4,
        lines_color: Vec4,
        duration: f32,
    ) {
        self.draw_line_path(path, lines_color, duration);
        self.draw_points(path, point_type, size, points_color, duration);
    }

    fn push_point(
        &self,
        key: u64,
        position: Vec3,
        point_type: PointType,
        size: f32,
        color: Vec4,
        duration: f32,
    ) {
        match point_type {
            PointType::Square => {
                let transform = Affine3A::from_scale_rotation_translation(
                    Vec3::splat(size),
                    Quat::IDENTITY,
                    position,
                );
                self.push_shape(
                    InstanceType::BillboardSquare,
                    key,
                    duration,
                    transform,
                    color,
                    SphereBounds::new(position, size),
                );
            }
            PointType::Sphere => {
                let transform = Affine3A::from_scale_rotation_translation(
                    Vec3::splat(size),
                    Quat::IDENTITY,
                    position,
                );
                self.push_shape(
                    self.sphere_type(),
                    key,
                    duration,
                    transform,
                    color,
                    SphereBounds::new(position, size * 0.5),
                );
            }
        }
    }

    // ---- misc ----

    /// Camera-facing square at `position` with side `size`.
    pub fn draw_square(&self, position: Vec3, size: f32, color: Vec4, duration: f32) {
        let key = IdentityKey::new("square").vec3(position).f32(size).finish();
        self.push_point(key, position, PointType::Square, size, color, duration);
    }

    /// Square slab on `plane`, centered on the projection of `anchor` (the
    /// last known camera position when `None`). The side comes from the
    /// scoped `plane_size`, else the camera far plane.
    pub fn draw_plane(&self, plane: Plane, color: Vec4, anchor: Option<Vec3>, duration: f32) {
        let scope = self.scope_snapshot();
        let size = scope.plane_size.unwrap_or_else(|| self.far_plane());
        let anchor = anchor
            .or_else(|| self.last_camera_position())
            .unwrap_or(Vec3::ZERO);
        let center = plane.project(anchor);

        let key = IdentityKey::new("plane")
            .vec3(plane.normal)
            .f32(plane.d)
            .vec3(center)
            .finish();
        let basis = math::basis_from_direction(plane.normal);
        let m = Mat3::from_cols(basis.x_axis * size, basis.y_axis * size, basis.z_axis);
        let transform = Affine3A::from_mat3_translation(m, center);
        self.push_shape(
            InstanceType::Plane,
            key,
            duration,
            transform,
            color,
            SphereBounds::from_centered_unit_transform(&transform),
        );
    }

    /// Position marker: three crossing axis lines.
    pub fn draw_position(&self, transform: &Affine3A, color: Vec4, duration: f32) {
        let key = IdentityKey::new("position").affine(transform).finish();
        self.push_shape(
            InstanceType::Position,
            key,
            duration,
            *transform,
            color,
            SphereBounds::from_centered_unit_transform(transform),
        );
    }

    /// Three axis lines of `transform`'s basis, colored per axis (or
    /// uniformly when `color` is given).
    pub fn draw_gizmo(
        &self,
        transform: &Affine3A,
        color: Option<Vec4>,
        is_centered: bool,
        duration: f32,
    ) {
        let key = IdentityKey::new("gizmo")
            .affine(transform)
            .bool(is_centered)
            .finish();
        let origin = Vec3::from(transform.translation);
        let axes = [
            (Vec3::from(transform.matrix3.x_axis), colors::AXIS_X),
            (Vec3::from(transform.matrix3.y_axis), colors::AXIS_Y),
            (Vec3::from(transform.matrix3.z_axis), colors::AXIS_Z),
        ];
        for (i, (axis, axis_color)) in axes.into_iter().enumerate() {
            let (from, to) = if is_centered {
                (origin - axis * 0.5, origin + axis * 0.5)
            } else {
                (origin, origin + axis)
            };
            self.push_segments(
                sub_key(key, i),
                vec![from, to],
                color.unwrap_or(axis_color),
                duration,
            );
        }
    }

    /// Grid over the parallelogram spanned by `x_size` and `y_size`.
    /// `subdivision` is the cell count per side, clamped to at least 1.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_grid(
        &self,
        origin: Vec3,
        x_size: Vec3,
        y_size: Vec3,
        subdivision: (u32, u32),
        color: Vec4,
        is_centered: bool,
        duration: f32,
    ) {
        let key = IdentityKey::new("grid")
            .vec3(origin)
            .vec3(x_size)
            .vec3(y_size)
            .f32(subdivision.0 as f32)
            .f32(subdivision.1 as f32)
            .bool(is_centered)
            .finish();
        let (nx, ny) = (subdivision.0.max(1), subdivision.1.max(1));
        let corner = if is_centered {
            origin - x_size * 0.5 - y_size * 0.5
        } else {
            origin
        };

        let mut points = Vec::with_capacity(((nx + ny + 2) * 2) as usize);
        for i in 0..=nx {
            let offset = x_size * (i as f32 / nx as f32);
            points.push(corner + offset);
            points.push(corner + offset + y_size);
        }
        for j in 0..=ny {
            let offset = y_size * (j as f32 / ny as f32);
            points.push(corner + offset);
            points.push(corner + offset + x_size);
        }
        self.push_segments(key, points, color, duration);
    }

    /// Grid from a transform: origin = translation, sides = the X and Y
    /// basis vectors.
    pub fn draw_grid_xf(
        &self,
        transform: &Affine3A,
        subdivision: (u32, u32),
        color: Vec4,
        is_centered: bool,
        duration: f32,
    ) {
        self.draw_grid(
            transform.translation.into(),
            transform.matrix3.x_axis.into(),
            transform.matrix3.y_axis.into(),
            subdivision,
            color,
            is_centered,
            duration,
        );
    }

    /// Wireframe of the view volume bounded by the six planes, given in
    /// `[near, far, left, top, right, bottom]` order. Degenerate plane sets
    /// draw nothing.
    pub fn draw_camera_frustum_planes(&self, planes: &[Plane; 6], color: Vec4, duration: f32) {
        let Some(corners) = math::frustum_corners(planes) else {
            return;
        };
        let key = planes
            .iter()
            .fold(IdentityKey::new("camera_frustum"), |k, p| {
                k.vec3(p.normal).f32(p.d)
            })
            .finish();

        let [ntl, ntr, nbr, nbl, ftl, ftr, fbr, fbl] = corners;
        let points = vec![
            ntl, ntr, ntr, nbr, nbr, nbl, nbl, ntl, // near face
            ftl, ftr, ftr, fbr, fbr, fbl, fbl, ftl, // far face
            ntl, ftl, ntr, ftr, nbr, fbr, nbl, fbl, // connecting edges
        ];
        self.push_segments(key, points, color, duration);
    }

    /// Wireframe of the view volume of a view-projection matrix.
    pub fn draw_camera_frustum(&self, view_projection: &glam::Mat4, color: Vec4, duration: f32) {
        let f = math::Frustum::from_view_projection(view_projection);
        let [left, right, bottom, top, near, far] = f.planes;
        self.draw_camera_frustum_planes(&[near, far, left, top, right, bottom], color, duration);
    }
}
