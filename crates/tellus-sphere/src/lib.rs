//! Adaptive sphere tessellation.
//!
//! A [`Sphere`] subdivides a base platonic solid (icosahedron or cube)
//! into a forest of recursively splittable faces, sharing vertices
//! through a welding [`VertexPool`]. Each frame, [`Sphere::update`]
//! culls against the horizon and the view frustum, splits faces whose
//! projected triangles would exceed the configured on-screen edge size,
//! and emits one [`PatchInstance`] per visible leaf for GPU instancing.
//!
//! All tessellation runs in `f64`; instances are converted to `f32` at
//! the GPU boundary.

pub mod face;
pub mod instance;
pub mod lut;
pub mod sphere;
pub mod topology;
pub mod vertex_pool;

pub use face::{BoundingShell, Corners, Face};
pub use instance::{FLOATS_PER_INSTANCE, PatchInstance};
pub use lut::{CullingAngleLut, SplitDistanceLut};
pub use sphere::{BoundingBox, Sphere};
pub use topology::Topology;
pub use vertex_pool::VertexPool;
