//! Planet: wires a tessellated sphere to its GPU patch resources.

use tellus_camera::Camera;
use tellus_config::{Config, ConfigError};
use tellus_sphere::{Sphere, Topology};
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::geometry::PatchMesh;
use crate::instance_buffer::{InstanceBuffer, InstanceList};
use crate::uniforms::PatchUniforms;

/// How patch instances are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    #[default]
    Triangles,
    Lines,
    Points,
}

impl DrawMode {
    /// The pipeline topology this mode renders with.
    #[must_use]
    pub fn primitive_topology(self) -> wgpu::PrimitiveTopology {
        match self {
            DrawMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
            DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
            DrawMode::Points => wgpu::PrimitiveTopology::PointList,
        }
    }
}

/// GPU resources for drawing one planet's patches.
struct GpuPatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instances: InstanceBuffer,
}

/// A renderable planet: the adaptive sphere plus its static reference
/// patch mesh and per-frame instance stream.
pub struct Planet {
    sphere: Sphere,
    mesh: PatchMesh,
    instance_list: InstanceList,
    draw_mode: DrawMode,
    gpu: Option<GpuPatch>,
}

impl Planet {
    /// Build a planet from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the sphere configuration fails validation.
    pub fn new(config: &Config, topology: Topology) -> Result<Self, ConfigError> {
        let sphere = Sphere::new(config.sphere.clone(), topology)?;
        let mesh = PatchMesh::generate(topology, config.sphere.patch_levels);
        debug!(
            ?topology,
            patch_vertices = mesh.vertices.len(),
            patch_indices = mesh.indices.len(),
            "planet created"
        );

        let draw_mode = if config.debug.wireframe_mode {
            DrawMode::Lines
        } else {
            DrawMode::Triangles
        };

        Ok(Self {
            sphere,
            mesh,
            instance_list: InstanceList::new(),
            draw_mode,
            gpu: None,
        })
    }

    /// Advance the tessellation for one frame and restock the instance
    /// list. The previous frame's length stays readable through
    /// [`instances_count`](Self::instances_count).
    pub fn update(&mut self, camera: &Camera) {
        self.instance_list.clear();
        let instances = self.sphere.update(camera);
        self.instance_list.extend_from_slice(instances);
    }

    /// Create the GPU buffers. Call once after the first update.
    pub fn upload(&mut self, device: &wgpu::Device) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("patch_vertex_buffer"),
            contents: self.mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("patch_index_buffer"),
            contents: self.mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instances = InstanceBuffer::upload(device, &self.instance_list);

        self.gpu = Some(GpuPatch {
            vertex_buffer,
            index_buffer,
            index_count: self.mesh.indices.len() as u32,
            instances,
        });
    }

    /// Push the current frame's instances to the GPU, reusing the buffer
    /// when it fits.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.instances.reupload(device, queue, &self.instance_list);
        }
    }

    /// Record the instanced draw.
    ///
    /// # Panics
    ///
    /// Panics if [`upload`](Self::upload) has not run yet.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(gpu) = self.gpu.as_ref() else {
            panic!("upload must run before render");
        };

        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        gpu.instances.bind(render_pass, 1);
        render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..gpu.index_count, 0, 0..gpu.instances.instance_count());
    }

    /// Uniform block for the current sphere and camera state.
    #[must_use]
    pub fn uniforms(&self, camera: &Camera) -> PatchUniforms {
        PatchUniforms::new(&self.sphere, camera)
    }

    #[must_use]
    pub fn sphere(&self) -> &Sphere {
        &self.sphere
    }

    #[must_use]
    pub fn sphere_mut(&mut self) -> &mut Sphere {
        &mut self.sphere
    }

    /// The reference patch mesh shared by every instance.
    #[must_use]
    pub fn mesh(&self) -> &PatchMesh {
        &self.mesh
    }

    /// Instances pending for the current frame.
    #[must_use]
    pub fn instance_list(&self) -> &InstanceList {
        &self.instance_list
    }

    /// Number of instances drawn last frame.
    #[must_use]
    pub fn instances_count(&self) -> usize {
        self.instance_list.count()
    }

    #[must_use]
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.draw_mode = mode;
    }
}
