//! Named RGBA color constants for the draw API.

use glam::Vec4;

pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
pub const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
pub const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);
pub const ORANGE: Vec4 = Vec4::new(1.0, 0.65, 0.0, 1.0);
pub const CRIMSON: Vec4 = Vec4::new(0.86, 0.08, 0.24, 1.0);
pub const TRANSPARENT: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.0);

/// Axis colors used by position markers and gizmos (R = X, G = Y, B = Z).
pub const AXIS_X: Vec4 = Vec4::new(0.9, 0.15, 0.15, 1.0);
pub const AXIS_Y: Vec4 = Vec4::new(0.15, 0.9, 0.15, 1.0);
pub const AXIS_Z: Vec4 = Vec4::new(0.15, 0.15, 0.9, 1.0);

/// Color of the one-frame overlay drawn around entry bounds when
/// `visible_instance_bounds` is enabled.
pub const DEBUG_BOUNDS: Vec4 = Vec4::new(0.26, 1.0, 0.43, 1.0);
