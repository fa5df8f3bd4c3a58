//! Camera state: position, orientation basis and projection parameters.

use glam::{DMat4, DVec3};

/// Orthonormal orientation basis of a camera.
#[derive(Clone, Copy, Debug)]
pub struct CameraBasis {
    /// Direction of increasing screen-x.
    pub right: DVec3,
    /// Direction of increasing screen-y.
    pub up: DVec3,
    /// View direction.
    pub front: DVec3,
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            right: DVec3::X,
            up: DVec3::Y,
            front: DVec3::Z,
        }
    }
}

/// A perspective camera.
///
/// All fields are plain data; the tessellation core reads them once per
/// frame and never mutates them. Movement and orientation controls live in
/// the host application.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Position in world space.
    pub position: DVec3,
    /// Orientation basis (right/up/front), unit length and orthogonal.
    pub basis: CameraBasis,
    /// Vertical field of view in radians.
    pub fov: f64,
    /// Viewport width / height.
    pub aspect_ratio: f64,
    /// Near clip plane distance.
    pub near: f64,
    /// Far clip plane distance.
    pub far: f64,
    /// Viewport width in pixels. Read by the split-distance LUT so the
    /// projected-edge-size target can be expressed in pixels.
    pub viewport_width: f64,
}

impl Camera {
    /// Create a camera at `position` looking along `+Z` with `+Y` up.
    pub fn new(position: DVec3, fov: f64, aspect_ratio: f64, near: f64, far: f64) -> Self {
        Self {
            position,
            basis: CameraBasis::default(),
            fov,
            aspect_ratio,
            near,
            far,
            viewport_width: 1920.0,
        }
    }

    /// Same as [`Camera::new`] with an explicit viewport width in pixels.
    pub fn with_viewport_width(mut self, viewport_width: f64) -> Self {
        self.viewport_width = viewport_width;
        self
    }

    /// View matrix looking along the basis front vector.
    #[must_use]
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_to_lh(self.position, self.basis.front, self.basis.up)
    }

    /// Perspective projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_lh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
