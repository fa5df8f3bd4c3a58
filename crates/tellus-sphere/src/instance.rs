//! Per-face instance record consumed by the GPU instancing pipeline.

use glam::DVec3;

/// Number of floats one [`PatchInstance`] occupies on the wire: level,
/// A, R, S.
pub const FLOATS_PER_INSTANCE: usize = 10;

/// Placement of the reference patch mesh on one visible leaf face.
///
/// `A`, `R = B − A` and `S = C − A` form a basis of the plane containing
/// the face; the vertex shader reconstructs every patch vertex as
/// `A + R·pos.x + S·pos.y` before spherifying. One record is memoized per
/// face the first time it is emitted as a visible leaf; the per-frame
/// instance *list* is rebuilt from scratch every frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PatchInstance {
    /// Subdivision level of the face, as a float for the vertex stream.
    pub level: f32,
    /// First corner of the face.
    pub a: [f32; 3],
    /// Second corner minus the first.
    pub r: [f32; 3],
    /// Third corner minus the first.
    pub s: [f32; 3],
}

impl PatchInstance {
    /// Build an instance from a face's level and its first three corners.
    #[must_use]
    pub fn from_corners(level: u8, a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self {
            level: f32::from(level),
            a: a.as_vec3().to_array(),
            r: (b - a).as_vec3().to_array(),
            s: (c - a).as_vec3().to_array(),
        }
    }
}
