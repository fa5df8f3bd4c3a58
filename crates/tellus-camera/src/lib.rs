//! Camera state and view-volume geometry for the sphere tessellation core.
//!
//! The camera is read-only from the tessellation engine's perspective: each
//! frame the sphere reads its position, basis vectors and projection
//! parameters, and rebuilds a [`Frustum`] in the sphere's local space so
//! per-face culling never has to transform face vertices into world space.

mod camera;
mod frustum;
mod plane;

pub use camera::{Camera, CameraBasis};
pub use frustum::Frustum;
pub use plane::Plane;
