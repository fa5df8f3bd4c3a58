//! Infinite planes in Hessian normal form, used as frustum half-spaces.

use glam::DVec3;

/// A plane defined by a point and a unit normal.
///
/// Stored in Hessian normal form so the signed distance to any point is a
/// single dot product plus an add.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    point: DVec3,
    normal: DVec3,
    dist_to_origin: f64,
}

impl Plane {
    /// Construct the plane through three points.
    ///
    /// The normal is `(b - a) × (c - a)`, normalized, so winding determines
    /// which side is positive.
    ///
    /// # Panics
    ///
    /// Panics if the three points are collinear (no unique plane exists).
    #[must_use]
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Self {
        let cross = (b - a).cross(c - a);
        assert!(
            cross.length_squared() > 1e-24,
            "cannot construct a plane from aligned points: {a:?}, {b:?}, {c:?}"
        );
        let normal = cross.normalize();

        Self {
            point: a,
            normal,
            dist_to_origin: -a.dot(normal),
        }
    }

    /// Signed distance from `point` to the plane: positive on the side the
    /// normal points toward, negative on the other side.
    #[must_use]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.dist_to_origin
    }

    /// Whether `point` lies on the plane within `eps`.
    #[must_use]
    pub fn contains_point(&self, point: DVec3, eps: f64) -> bool {
        (point - self.point).dot(self.normal).abs() < eps
    }

    /// Return this plane with its normal oriented so that `interior` lies on
    /// the non-negative side.
    #[must_use]
    pub fn oriented_toward(self, interior: DVec3) -> Self {
        if self.signed_distance(interior) < 0.0 {
            Self {
                point: self.point,
                normal: -self.normal,
                dist_to_origin: -self.dist_to_origin,
            }
        } else {
            self
        }
    }

    /// The point this plane was constructed from.
    #[must_use]
    pub fn point(&self) -> DVec3 {
        self.point
    }

    /// The unit normal of the plane.
    #[must_use]
    pub fn normal(&self) -> DVec3 {
        self.normal
    }
}
