//! The boundary to the host's rendering API.
//!
//! The pool batches entries into plain-old-data buffers; a [`RenderSink`]
//! implementation uploads them however the host renders (multimesh,
//! instanced draw calls, immediate vertex buffer for the lines). The core
//! never calls into GPU APIs itself.

use crate::entry::InstanceType;
use crate::math;
use glam::{Affine3A, Vec4};

/// One GPU instance: 3x4 transform rows, primary color, custom channel.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    /// Rows of the affine transform (basis columns | origin).
    pub transform: [[f32; 4]; 3],
    pub color: [f32; 4],
    /// Secondary channel: `(thickness, center_brightness, 0, 0)` for
    /// volumetric shapes, zero otherwise.
    pub custom: [f32; 4],
}

impl InstanceData {
    pub fn new(transform: &Affine3A, color: Vec4, custom: Vec4) -> Self {
        Self {
            transform: math::transform_rows(transform),
            color: color.to_array(),
            custom: custom.to_array(),
        }
    }
}

/// A line-list vertex: position + color. Consecutive pairs form segments.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Dense per-type instance buffers filled by the pool every frame.
///
/// Buffers are cleared but never deallocated between frames, so steady-state
/// rendering does not allocate.
pub struct InstanceBuffers {
    buffers: [Vec<InstanceData>; InstanceType::COUNT],
}

impl InstanceBuffers {
    pub fn new() -> Self {
        Self {
            buffers: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Clear every buffer, keeping allocations.
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }

    #[inline]
    pub fn get(&self, ty: InstanceType) -> &[InstanceData] {
        &self.buffers[ty.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, ty: InstanceType) -> &mut Vec<InstanceData> {
        &mut self.buffers[ty.index()]
    }
}

impl Default for InstanceBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer of the batched buffers. Implemented by the host renderer.
pub trait RenderSink {
    /// Hand over one instance type's dense buffer and its visible count.
    /// Called once per type per frame (with an empty slice when nothing of
    /// that type is visible).
    fn set_instance_buffer(&mut self, ty: InstanceType, data: &[InstanceData], visible: usize);

    /// Hand over the shared immediate-mode line buffer for the frame.
    fn set_line_buffer(&mut self, vertices: &[LineVertex]);

    /// Render-layer mask changed; forwarded only on change.
    fn set_render_layer_mask(&mut self, mask: u32);
}
