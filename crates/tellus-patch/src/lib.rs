//! GPU patch rendering for adaptively tessellated spheres.
//!
//! The heavy lifting happens in `tellus-sphere`, which turns a camera
//! into a list of per-face instances each frame. This crate owns what
//! the GPU needs to draw them: the static reference patch mesh, the
//! instance-rate vertex stream, the shared uniform block, and the
//! [`Planet`] type wiring them together. A CPU copy of the shader's
//! geomorphing math lives in [`morph`] for testing.

pub mod geometry;
pub mod instance_buffer;
pub mod morph;
pub mod planet;
pub mod uniforms;

pub use geometry::{PatchMesh, PatchVertex};
pub use instance_buffer::{InstanceBuffer, InstanceList};
pub use morph::{morph_factor, patch_position};
pub use planet::{DrawMode, Planet};
pub use uniforms::{DISTANCE_LUT_SLOTS, PatchUniforms};
