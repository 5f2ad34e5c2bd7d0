//! Delayed renderer entries: the per-request records tracked by the pool.
//!
//! Two kinds exist. Point-instance entries ([`DelayedRendererInstance`]) are
//! rendered through GPU instancing, one batch per [`InstanceType`]. Line
//! entries ([`DelayedRendererLine`]) own their vertices and are concatenated
//! into one shared immediate-mode buffer each frame.

use glam::{Affine3A, Vec3, Vec4};

use crate::math::{Aabb, SphereBounds};

/// Which instanced mesh an entry is batched with.
///
/// `*Volumetric` variants are the thick extruded renderings of the same
/// logical shapes, selected when the active scope config has a non-zero
/// thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InstanceType {
    Cube,
    CubeCentered,
    Arrowhead,
    Position,
    Sphere,
    SphereHd,
    Cylinder,
    CylinderAb,
    BillboardSquare,
    Plane,
    LineVolumetric,
    CubeVolumetric,
    CubeCenteredVolumetric,
    ArrowheadVolumetric,
    PositionVolumetric,
    SphereVolumetric,
    SphereHdVolumetric,
    CylinderVolumetric,
    CylinderAbVolumetric,
}

impl InstanceType {
    pub const COUNT: usize = 19;

    pub const ALL: [InstanceType; Self::COUNT] = [
        Self::Cube,
        Self::CubeCentered,
        Self::Arrowhead,
        Self::Position,
        Self::Sphere,
        Self::SphereHd,
        Self::Cylinder,
        Self::CylinderAb,
        Self::BillboardSquare,
        Self::Plane,
        Self::LineVolumetric,
        Self::CubeVolumetric,
        Self::CubeCenteredVolumetric,
        Self::ArrowheadVolumetric,
        Self::PositionVolumetric,
        Self::SphereVolumetric,
        Self::SphereHdVolumetric,
        Self::CylinderVolumetric,
        Self::CylinderAbVolumetric,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The thick counterpart of a wireframe type. Types without one (or
    /// already volumetric) map to themselves.
    pub fn volumetric(self) -> InstanceType {
        match self {
            Self::Cube => Self::CubeVolumetric,
            Self::CubeCentered => Self::CubeCenteredVolumetric,
            Self::Arrowhead => Self::ArrowheadVolumetric,
            Self::Position => Self::PositionVolumetric,
            Self::Sphere => Self::SphereVolumetric,
            Self::SphereHd => Self::SphereHdVolumetric,
            Self::Cylinder => Self::CylinderVolumetric,
            Self::CylinderAb => Self::CylinderAbVolumetric,
            other => other,
        }
    }
}

/// Which tick phase owns an entry's lifecycle clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessType {
    /// The continuous render tick.
    Process,
    /// The discrete physics tick, which may fire zero, one, or many times
    /// per rendered frame.
    Physics,
}

impl ProcessType {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Process => 0,
            Self::Physics => 1,
        }
    }
}

/// Expiration and visibility state shared by both entry kinds.
///
/// An entry only becomes removable once a render frame has processed it
/// (`was_drawn`): a zero-duration entry created inside a physics tick must
/// survive every physics-end sweep until it has been on screen for one full
/// frame, no matter how many physics ticks run in between.
#[derive(Debug, Clone, Copy)]
pub struct ExpirationState {
    /// Remaining lifetime in seconds. `<= 0` means "expire at the end of the
    /// current owning tick phase", not "never expire".
    pub expiration_time: f32,
    pub process_type: ProcessType,
    /// Result of the last visibility pass.
    pub is_visible: bool,
    /// Single-frame entries (e.g. the bounds overlay) are removed after one
    /// drawn frame regardless of remaining lifetime.
    pub is_used_one_time: bool,
    /// Set by the render-phase fill pass for every non-expired entry,
    /// visible or culled.
    pub was_drawn: bool,
}

impl ExpirationState {
    pub fn new(duration: f32, process_type: ProcessType) -> Self {
        Self {
            expiration_time: duration,
            process_type,
            is_visible: true,
            is_used_one_time: false,
            was_drawn: false,
        }
    }

    /// Overwrite lifetime state on an identity refresh.
    pub fn refresh(&mut self, duration: f32, process_type: ProcessType) {
        self.expiration_time = duration;
        self.process_type = process_type;
        self.is_used_one_time = false;
        self.was_drawn = false;
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.was_drawn && (self.expiration_time <= 0.0 || self.is_used_one_time)
    }
}

/// A point-instance debug-draw request.
#[derive(Debug, Clone)]
pub struct DelayedRendererInstance {
    pub instance_type: InstanceType,
    pub transform: Affine3A,
    /// Primary RGBA color.
    pub color: Vec4,
    /// Secondary per-instance channel (thickness, center brightness).
    pub custom_color: Vec4,
    pub bounds: SphereBounds,
    pub state: ExpirationState,
    /// Coalescing key; `None` entries are never matched by later calls.
    pub identity: Option<u64>,
}

/// A line-list debug-draw request. Points are consecutive segment pairs.
#[derive(Debug, Clone)]
pub struct DelayedRendererLine {
    pub points: Vec<Vec3>,
    pub color: Vec4,
    pub bounds: Aabb,
    pub state: ExpirationState,
    pub identity: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_never_expired() {
        let state = ExpirationState::new(0.0, ProcessType::Physics);
        assert!(!state.is_expired());
    }

    #[test]
    fn drawn_zero_duration_expires() {
        let mut state = ExpirationState::new(0.0, ProcessType::Process);
        state.was_drawn = true;
        assert!(state.is_expired());
    }

    #[test]
    fn drawn_entry_with_time_left_survives() {
        let mut state = ExpirationState::new(2.0, ProcessType::Process);
        state.was_drawn = true;
        assert!(!state.is_expired());
    }

    #[test]
    fn one_time_expires_once_drawn_despite_duration() {
        let mut state = ExpirationState::new(100.0, ProcessType::Process);
        state.is_used_one_time = true;
        assert!(!state.is_expired());
        state.was_drawn = true;
        assert!(state.is_expired());
    }

    #[test]
    fn refresh_rearms_state() {
        let mut state = ExpirationState::new(0.0, ProcessType::Process);
        state.was_drawn = true;
        state.is_used_one_time = true;
        assert!(state.is_expired());
        state.refresh(1.0, ProcessType::Process);
        assert!(!state.is_expired());
        assert!(!state.is_used_one_time);
    }

    #[test]
    fn volumetric_mapping() {
        assert_eq!(
            InstanceType::Sphere.volumetric(),
            InstanceType::SphereVolumetric
        );
        assert_eq!(InstanceType::Plane.volumetric(), InstanceType::Plane);
        assert_eq!(
            InstanceType::LineVolumetric.volumetric(),
            InstanceType::LineVolumetric
        );
    }

    #[test]
    fn all_types_have_unique_indices() {
        let mut seen = [false; InstanceType::COUNT];
        for ty in InstanceType::ALL {
            assert!(!seen[ty.index()]);
            seen[ty.index()] = true;
        }
    }
}
