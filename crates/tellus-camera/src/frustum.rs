//! Six-plane view volume, built in a target object's local space.

use glam::{DMat4, DVec3};

use crate::{Camera, Plane};

/// A view frustum as six inward-facing [`Plane`]s.
///
/// The planes are constructed from the camera's basis vectors and
/// near/far/FOV/aspect parameters, with every corner transformed by the
/// inverse model matrix of the object being culled. Culling a face then
/// only needs signed-distance tests on its local-space vertices.
///
/// Must be rebuilt whenever the camera or the target's model matrix
/// changes.
#[derive(Clone, Debug)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Build the frustum for `camera`, expressed in the local space of the
    /// object whose inverse model matrix is `inverse_model`.
    ///
    /// The half-width of the view volume at distance `d` is `tan(fov) * d`;
    /// the half-height is the half-width divided by the aspect ratio.
    #[must_use]
    pub fn new(camera: &Camera, inverse_model: DMat4) -> Self {
        let half_w = camera.fov.tan();

        let near_hw = half_w * camera.near;
        let near_hh = near_hw / camera.aspect_ratio;
        let far_hw = half_w * camera.far;
        let far_hh = far_hw / camera.aspect_ratio;

        let basis = camera.basis;
        let pos = camera.position;

        let near_center = pos + basis.front * camera.near;
        let far_center = pos + basis.front * camera.far;

        // Corners of the near and far rectangles, in the culled object's
        // local space: a/b top-left/top-right, c/d bottom-left/bottom-right.
        let corner = |center: DVec3, hh: f64, hw: f64, sy: f64, sx: f64| {
            inverse_model.transform_point3(center + basis.up * (sy * hh) + basis.right * (sx * hw))
        };

        let na = corner(near_center, near_hh, near_hw, 1.0, -1.0);
        let nb = corner(near_center, near_hh, near_hw, 1.0, 1.0);
        let nc = corner(near_center, near_hh, near_hw, -1.0, -1.0);
        let nd = corner(near_center, near_hh, near_hw, -1.0, 1.0);

        let fa = corner(far_center, far_hh, far_hw, 1.0, -1.0);
        let fb = corner(far_center, far_hh, far_hw, 1.0, 1.0);
        let fc = corner(far_center, far_hh, far_hw, -1.0, -1.0);
        let fd = corner(far_center, far_hh, far_hw, -1.0, 1.0);

        // Orienting every plane toward the volume's interior makes the
        // construction independent of the camera basis handedness.
        let interior = (na + nb + nc + nd + fa + fb + fc + fd) / 8.0;
        let plane = |a, b, c| Plane::from_points(a, b, c).oriented_toward(interior);

        let planes = [
            plane(na, nb, nc), // near
            plane(fb, fa, fd), // far
            plane(fa, na, fc), // left
            plane(nb, fb, nd), // right
            plane(fa, fb, na), // top
            plane(nc, nd, fc), // bottom
        ];

        Self { planes }
    }

    /// The six planes, ordered near/far/left/right/top/bottom.
    #[must_use]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Whether a single point lies inside the view volume.
    #[must_use]
    pub fn contains_point(&self, point: DVec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Whether the convex volume described by `vertices` may intersect the
    /// frustum.
    ///
    /// The volume is excluded only if some single plane has every vertex on
    /// its negative side. This is conservative: volumes outside a frustum
    /// corner but not fully behind any one plane are reported as contained.
    /// Over-inclusion costs a few wasted instances; under-inclusion would
    /// cull visible geometry.
    #[must_use]
    pub fn contains_volume(&self, vertices: &[DVec3]) -> bool {
        for plane in &self.planes {
            if vertices.iter().all(|&v| plane.signed_distance(v) < 0.0) {
                return false;
            }
        }
        true
    }
}
