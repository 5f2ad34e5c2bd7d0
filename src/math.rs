//! Bounding volumes, frustum planes, and the intersection tests used for
//! visibility culling.
//!
//! Plane normals point *inward*: a point is inside a [`Frustum`] when its
//! signed distance to every plane is non-negative. A volume is rejected as
//! soon as it lies entirely on the outer (negative) side of any one plane.

use glam::{Affine3A, Mat4, Vec3};

/// A plane in the form `normal · p + d = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Create a plane from a (not necessarily unit) normal and offset,
    /// normalizing both.
    pub fn new(normal: Vec3, d: f32) -> Self {
        let len = normal.length();
        if len <= f32::EPSILON || !len.is_finite() {
            // Degenerate input: fall back to an "everything inside" plane.
            return Self {
                normal: Vec3::Y,
                d: f32::MAX,
            };
        }
        Self {
            normal: normal / len,
            d: d / len,
        }
    }

    /// Create a plane passing through `point` with the given normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize_or_zero();
        Self::new(n, -n.dot(point))
    }

    /// Signed distance from a point to the plane (positive on the normal side).
    #[inline]
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Orthogonal projection of a point onto the plane.
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.distance_to(point)
    }
}

/// Bounding sphere used by point-instance entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBounds {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereBounds {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Enclosing sphere of a transformed unit cube centered at the origin.
    ///
    /// Conservative (half the scaled diagonal), which is what culling wants.
    pub fn from_centered_unit_transform(transform: &Affine3A) -> Self {
        let scale = Vec3::new(
            Vec3::from(transform.matrix3.x_axis).length(),
            Vec3::from(transform.matrix3.y_axis).length(),
            Vec3::from(transform.matrix3.z_axis).length(),
        );
        Self {
            center: Vec3::from(transform.translation),
            radius: scale.length() * 0.5,
        }
    }
}

/// Axis-aligned box stored as min corner + size, used by line entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub position: Vec3,
    pub size: Vec3,
}

impl Aabb {
    pub fn new(position: Vec3, size: Vec3) -> Self {
        Self { position, size }
    }

    /// Smallest box enclosing all points. Empty input yields a zero box.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        if points.is_empty() {
            return Self::new(Vec3::ZERO, Vec3::ZERO);
        }
        Self::new(min, max - min)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.position + self.size * 0.5
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.position + self.size
    }

    /// Sphere enclosing the box.
    pub fn enclosing_sphere(&self) -> SphereBounds {
        SphereBounds::new(self.center(), self.size.length() * 0.5)
    }
}

/// Six planes of a view volume, normals pointing inward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract the six planes from a view-projection matrix
    /// (Gribb-Hartmann, depth range `[0, 1]` as produced by
    /// `Mat4::perspective_rh`).
    ///
    /// Plane order: left, right, bottom, top, near, far.
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let plane = |v: glam::Vec4| Plane::new(v.truncate(), v.w);
        Self {
            planes: [
                plane(r3 + r0), // left
                plane(r3 - r0), // right
                plane(r3 + r1), // bottom
                plane(r3 - r1), // top
                plane(r2),      // near
                plane(r3 - r2), // far
            ],
        }
    }

    /// True unless the sphere lies entirely on the outer side of any plane.
    pub fn intersects_sphere(&self, bounds: &SphereBounds) -> bool {
        for plane in &self.planes {
            if plane.distance_to(bounds.center) < -bounds.radius {
                return false;
            }
        }
        true
    }

    /// True unless the box lies entirely on the outer side of any plane.
    ///
    /// Uses the p-vertex (the corner furthest along the plane normal): if
    /// even that corner is outside, the whole box is.
    pub fn intersects_aabb(&self, bounds: &Aabb) -> bool {
        let min = bounds.position;
        let max = bounds.max();
        for plane in &self.planes {
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { max.x } else { min.x },
                if plane.normal.y >= 0.0 { max.y } else { min.y },
                if plane.normal.z >= 0.0 { max.z } else { min.z },
            );
            if plane.distance_to(p) < 0.0 {
                return false;
            }
        }
        true
    }
}

/// Intersection point of three planes, if they are not near-parallel.
pub fn three_plane_intersection(a: &Plane, b: &Plane, c: &Plane) -> Option<Vec3> {
    let bc = b.normal.cross(c.normal);
    let denom = a.normal.dot(bc);
    if denom.abs() <= 1e-6 {
        return None;
    }
    let ca = c.normal.cross(a.normal);
    let ab = a.normal.cross(b.normal);
    Some((bc * -a.d + ca * -b.d + ab * -c.d) / denom)
}

/// Corners of a frustum given as `[near, far, left, top, right, bottom]`
/// planes (the order cameras hand them over in).
///
/// Returns near `[TL, TR, BR, BL]` then far `[TL, TR, BR, BL]`, or `None`
/// if the planes are degenerate.
pub fn frustum_corners(planes: &[Plane; 6]) -> Option<[Vec3; 8]> {
    let [near, far, left, top, right, bottom] = planes;
    Some([
        three_plane_intersection(near, top, left)?,
        three_plane_intersection(near, top, right)?,
        three_plane_intersection(near, bottom, right)?,
        three_plane_intersection(near, bottom, left)?,
        three_plane_intersection(far, top, left)?,
        three_plane_intersection(far, top, right)?,
        three_plane_intersection(far, bottom, right)?,
        three_plane_intersection(far, bottom, left)?,
    ])
}

/// Pack an affine transform into the three rows of a 3x4 instance matrix
/// (basis columns | origin), the layout instanced buffers consume.
pub fn transform_rows(transform: &Affine3A) -> [[f32; 4]; 3] {
    let m = &transform.matrix3;
    let t = transform.translation;
    [
        [m.x_axis.x, m.y_axis.x, m.z_axis.x, t.x],
        [m.x_axis.y, m.y_axis.y, m.z_axis.y, t.y],
        [m.x_axis.z, m.y_axis.z, m.z_axis.z, t.z],
    ]
}

/// Right-handed orthonormal basis whose Z axis points along `dir`.
///
/// `dir` does not need to be normalized; a zero direction falls back to +Z.
pub fn basis_from_direction(dir: Vec3) -> glam::Mat3 {
    let z = dir.normalize_or_zero();
    let z = if z == Vec3::ZERO { Vec3::Z } else { z };
    let x = z.any_orthonormal_vector();
    let y = z.cross(x);
    glam::Mat3::from_cols(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn test_frustum() -> Frustum {
        // Camera at origin looking down -Z, 90 degree fov, near 0.1, far 100.
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        Frustum::from_view_projection(&proj)
    }

    #[test]
    fn plane_distance_signs() {
        let plane = Plane::from_point_normal(Vec3::ZERO, Vec3::Y);
        assert!(plane.distance_to(Vec3::new(0.0, 2.0, 0.0)) > 0.0);
        assert!(plane.distance_to(Vec3::new(0.0, -2.0, 0.0)) < 0.0);
        assert!(plane.distance_to(Vec3::new(5.0, 0.0, -3.0)).abs() < 1e-6);
    }

    #[test]
    fn plane_projection() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        let projected = plane.project(Vec3::new(3.0, 7.0, -2.0));
        assert!((projected - Vec3::new(3.0, 1.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn degenerate_plane_accepts_everything() {
        let plane = Plane::new(Vec3::ZERO, 1.0);
        assert!(plane.distance_to(Vec3::splat(1e10)) > 0.0);
    }

    #[rstest]
    #[case(Vec3::new(0.0, 0.0, -10.0), 1.0, true)] // in front of the camera
    #[case(Vec3::new(0.0, 0.0, 10.0), 1.0, false)] // behind the camera
    #[case(Vec3::new(0.0, 0.0, -200.0), 1.0, false)] // past the far plane
    #[case(Vec3::new(50.0, 0.0, -10.0), 1.0, false)] // far off to the side
    #[case(Vec3::new(11.0, 0.0, -10.0), 2.0, true)] // straddles the right plane
    fn sphere_frustum_cases(#[case] center: Vec3, #[case] radius: f32, #[case] expected: bool) {
        let frustum = test_frustum();
        assert_eq!(
            frustum.intersects_sphere(&SphereBounds::new(center, radius)),
            expected
        );
    }

    #[rstest]
    #[case(Vec3::new(-1.0, -1.0, -11.0), Vec3::splat(2.0), true)]
    #[case(Vec3::new(-1.0, -1.0, 5.0), Vec3::splat(2.0), false)]
    #[case(Vec3::new(40.0, -1.0, -11.0), Vec3::splat(2.0), false)]
    fn aabb_frustum_cases(#[case] min: Vec3, #[case] size: Vec3, #[case] expected: bool) {
        let frustum = test_frustum();
        assert_eq!(frustum.intersects_aabb(&Aabb::new(min, size)), expected);
    }

    #[test]
    fn aabb_from_points() {
        let bounds = Aabb::from_points(&[
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-1.0, 5.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
        ]);
        assert_eq!(bounds.position, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max(), Vec3::new(1.0, 5.0, 4.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 2.5, 2.0));
    }

    #[test]
    fn three_planes_meet_at_unit_corner() {
        let px = Plane::from_point_normal(Vec3::X, Vec3::X);
        let py = Plane::from_point_normal(Vec3::Y, Vec3::Y);
        let pz = Plane::from_point_normal(Vec3::Z, Vec3::Z);
        let p = three_plane_intersection(&px, &py, &pz).unwrap();
        assert!((p - Vec3::ONE).length() < 1e-5);
    }

    #[test]
    fn parallel_planes_have_no_intersection() {
        let a = Plane::from_point_normal(Vec3::ZERO, Vec3::Y);
        let b = Plane::from_point_normal(Vec3::Y, Vec3::Y);
        let c = Plane::from_point_normal(Vec3::ZERO, Vec3::X);
        assert!(three_plane_intersection(&a, &b, &c).is_none());
    }

    #[test]
    fn transform_rows_identity() {
        let rows = transform_rows(&Affine3A::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(rows[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rows[1], [0.0, 1.0, 0.0, 2.0]);
        assert_eq!(rows[2], [0.0, 0.0, 1.0, 3.0]);
    }

    #[test]
    fn basis_is_orthonormal() {
        let basis = basis_from_direction(Vec3::new(0.3, -1.2, 0.4));
        assert!((basis.x_axis.length() - 1.0).abs() < 1e-5);
        assert!((basis.y_axis.length() - 1.0).abs() < 1e-5);
        assert!(basis.x_axis.dot(basis.y_axis).abs() < 1e-5);
        assert!(basis.x_axis.dot(basis.z_axis).abs() < 1e-5);
        assert!((basis.x_axis.cross(basis.y_axis) - basis.z_axis).length() < 1e-5);
    }
}
