//! Pure line-list generators for the unit primitive meshes.
//!
//! Hosts feed these into their mesh/instancing setup once at startup; the
//! pool itself only ever references shapes by [`InstanceType`]. All shapes
//! are unit-sized and get their dimensions from per-instance transforms.
//!
//! Conventions: spheres and cylinders have radius 0.5; the corner cube spans
//! `[0, 1]^3`, the centered cube `[-0.5, 0.5]^3`; the arrowhead's tip sits at
//! the origin with its base ring at `z = +1`; the unit line runs from the
//! origin to `(0, 0, -1)`.

use glam::Vec3;

use crate::entry::InstanceType;

const CUBE_CORNERS: [Vec3; 8] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
];

const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

fn edges_to_lines(corners: &[Vec3; 8]) -> Vec<Vec3> {
    let mut lines = Vec::with_capacity(CUBE_EDGES.len() * 2);
    for (a, b) in CUBE_EDGES {
        lines.push(corners[a]);
        lines.push(corners[b]);
    }
    lines
}

/// Unit cube with its origin at a corner (12 edges).
pub fn cube_lines() -> Vec<Vec3> {
    edges_to_lines(&CUBE_CORNERS)
}

/// Unit cube centered at the origin (12 edges).
pub fn centered_cube_lines() -> Vec<Vec3> {
    let corners = CUBE_CORNERS.map(|c| c - Vec3::splat(0.5));
    edges_to_lines(&corners)
}

/// Three axis-aligned lines crossing at the origin, extent 0.5 each way.
pub fn position_lines() -> Vec<Vec3> {
    vec![
        Vec3::new(-0.5, 0.0, 0.0),
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(0.0, 0.0, -0.5),
        Vec3::new(0.0, 0.0, 0.5),
    ]
}

/// Four-sided pyramid, tip at the origin, square base of radius 0.25 at
/// `z = +1` (tip points along -Z when instanced by the draw API).
pub fn arrowhead_lines() -> Vec<Vec3> {
    let tip = Vec3::ZERO;
    let base = [
        Vec3::new(0.25, 0.25, 1.0),
        Vec3::new(-0.25, 0.25, 1.0),
        Vec3::new(-0.25, -0.25, 1.0),
        Vec3::new(0.25, -0.25, 1.0),
    ];
    let mut lines = Vec::with_capacity(16);
    for corner in base {
        lines.push(tip);
        lines.push(corner);
    }
    for i in 0..4 {
        lines.push(base[i]);
        lines.push(base[(i + 1) % 4]);
    }
    lines
}

/// The unit line used by the volumetric line instance: origin to `(0, 0, -1)`.
pub fn line_vertices() -> Vec<Vec3> {
    vec![Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)]
}

/// Latitude/longitude wireframe sphere. `lats` is clamped to at least 2 and
/// `lons` to at least 4.
pub fn sphere_lines(lats: u32, lons: u32, radius: f32) -> Vec<Vec3> {
    let lats = lats.max(2);
    let lons = lons.max(4);
    let mut lines = Vec::new();

    let point = |lat: u32, lon: u32| -> Vec3 {
        let theta = std::f32::consts::PI * lat as f32 / lats as f32;
        let phi = std::f32::consts::TAU * lon as f32 / lons as f32;
        Vec3::new(
            theta.sin() * phi.cos(),
            theta.cos(),
            theta.sin() * phi.sin(),
        ) * radius
    };

    for lat in 0..lats {
        for lon in 0..lons {
            // Meridian segment.
            lines.push(point(lat, lon));
            lines.push(point(lat + 1, lon));
            // Ring segment (skip the degenerate pole ring).
            if lat > 0 {
                lines.push(point(lat, lon));
                lines.push(point(lat, lon + 1));
            }
        }
    }
    lines
}

/// Wireframe cylinder along +Y, height 1 centered at the origin. `edges` is
/// clamped to at least 3; a vertical edge is drawn every
/// `draw_edge_each_n_step` ring steps (clamped to at least 1).
pub fn cylinder_lines(edges: u32, radius: f32, height: f32, draw_edge_each_n_step: u32) -> Vec<Vec3> {
    let edges = edges.max(3);
    let step = draw_edge_each_n_step.max(1);
    let half = height * 0.5;
    let mut lines = Vec::new();

    let ring_point = |i: u32, y: f32| -> Vec3 {
        let angle = std::f32::consts::TAU * i as f32 / edges as f32;
        Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
    };

    for i in 0..edges {
        lines.push(ring_point(i, half));
        lines.push(ring_point(i + 1, half));
        lines.push(ring_point(i, -half));
        lines.push(ring_point(i + 1, -half));
        if i % step == 0 {
            lines.push(ring_point(i, -half));
            lines.push(ring_point(i, half));
        }
    }
    lines
}

/// Corners of the unit centered square in the XY plane (billboards, planes).
pub fn centered_square_corners() -> [Vec3; 4] {
    [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(-0.5, 0.5, 0.0),
    ]
}

/// Canonical wireframe line list for an instance type, or `None` for the
/// solid and volumetric types (hosts extrude those from the same lists).
pub fn wireframe_mesh_for(ty: InstanceType) -> Option<Vec<Vec3>> {
    match ty {
        InstanceType::Cube => Some(cube_lines()),
        InstanceType::CubeCentered => Some(centered_cube_lines()),
        InstanceType::Arrowhead => Some(arrowhead_lines()),
        InstanceType::Position => Some(position_lines()),
        InstanceType::Sphere => Some(sphere_lines(8, 8, 0.5)),
        InstanceType::SphereHd => Some(sphere_lines(16, 16, 0.5)),
        InstanceType::Cylinder => Some(cylinder_lines(16, 0.5, 1.0, 2)),
        InstanceType::CylinderAb => Some(
            // Same cylinder with its axis rotated onto +Z for A-B placement.
            cylinder_lines(16, 0.5, 1.0, 2)
                .into_iter()
                .map(|p| Vec3::new(p.x, -p.z, p.y))
                .collect(),
        ),
        _ => None,
    }
}
