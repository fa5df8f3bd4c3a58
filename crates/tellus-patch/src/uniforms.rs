//! Uniform block shared by all patch draws in a frame.

use bytemuck::{Pod, Zeroable};
use tellus_camera::Camera;
use tellus_config::MAX_LOD_CEILING;
use tellus_sphere::Sphere;

/// Split-distance slots in the uniform block. Uniform-address-space
/// arrays need 16-byte strides, so the values pack four to a `vec4`.
pub const DISTANCE_LUT_SLOTS: usize = MAX_LOD_CEILING as usize / 4;

/// Per-frame uniforms for the patch shader.
///
/// Matrices are column-major; `cam_pos` is the camera transformed into
/// the sphere's local unit space, where all patch math happens.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PatchUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub cam_pos: [f32; 3],
    pub morph_range: f32,
    pub light_dir: [f32; 3],
    pub max_lod: f32,
    /// Split distances packed four to a slot; unused slots stay zero.
    pub distance_lut: [[f32; 4]; DISTANCE_LUT_SLOTS],
}

impl PatchUniforms {
    /// Assemble the block from the sphere's state and a camera.
    ///
    /// # Panics
    ///
    /// Panics if the sphere has not run an update yet, because the
    /// split-distance table does not exist before then.
    #[must_use]
    pub fn new(sphere: &Sphere, camera: &Camera) -> Self {
        let config = sphere.config();

        let mut distance_lut = [[0.0f32; 4]; DISTANCE_LUT_SLOTS];
        for level in 0..config.max_lod {
            let i = usize::from(level);
            distance_lut[i / 4][i % 4] = sphere.split_distance(level) as f32;
        }

        let light_dir = glam::Vec3::new(1.0, 0.7, 0.3).normalize();
        let cam_pos = sphere
            .inverse_model_matrix()
            .transform_point3(camera.position);

        Self {
            model: sphere.model_matrix().as_mat4().to_cols_array_2d(),
            view: camera.view_matrix().as_mat4().to_cols_array_2d(),
            projection: camera.projection_matrix().as_mat4().to_cols_array_2d(),
            cam_pos: cam_pos.as_vec3().to_array(),
            morph_range: config.morph_range as f32,
            light_dir: light_dir.to_array(),
            max_lod: f32::from(config.max_lod),
            distance_lut,
        }
    }

    /// Raw bytes for the uniform buffer write.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
