//! Per-frame instance buffer management.
//!
//! Instances accumulate on the CPU during the sphere walk, upload in one
//! write each frame, and the accumulation list clears after the draw is
//! recorded. `count` snapshots the number drawn so the host can report
//! it after the list is gone.

use tellus_sphere::{FLOATS_PER_INSTANCE, PatchInstance};
use tracing::trace;
use wgpu::util::DeviceExt;

/// CPU-side accumulation list for one patch's instances.
#[derive(Debug, Default)]
pub struct InstanceList {
    instances: Vec<PatchInstance>,
    /// Count drawn at the last snapshot, kept past [`clear`](Self::clear).
    count: usize,
}

impl InstanceList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instance.
    pub fn push(&mut self, instance: PatchInstance) {
        self.instances.push(instance);
    }

    /// Append a whole frame's worth of instances.
    pub fn extend_from_slice(&mut self, instances: &[PatchInstance]) {
        self.instances.extend_from_slice(instances);
    }

    /// Snapshot the current length into [`count`](Self::count) and empty
    /// the list for the next frame.
    pub fn clear(&mut self) {
        self.count = self.instances.len();
        self.instances.clear();
    }

    /// Number of instances at the last [`clear`](Self::clear).
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[must_use]
    pub fn instances(&self) -> &[PatchInstance] {
        &self.instances
    }

    /// Raw bytes for buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// GPU instance buffer with write-on-update reuse.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity_bytes: u64,
    instance_count: u32,
}

impl InstanceBuffer {
    /// Create the buffer and upload an initial instance list.
    pub fn upload(device: &wgpu::Device, list: &InstanceList) -> Self {
        let bytes = list.as_bytes();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("patch_instance_buffer"),
            contents: bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            capacity_bytes: bytes.len() as u64,
            instance_count: list.len() as u32,
        }
    }

    /// Upload a new frame's instances into the existing buffer if it
    /// fits, or recreate it.
    ///
    /// Returns `true` when the existing allocation was reused.
    pub fn reupload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        list: &InstanceList,
    ) -> bool {
        let bytes = list.as_bytes();
        if bytes.len() as u64 <= self.capacity_bytes {
            queue.write_buffer(&self.buffer, 0, bytes);
            self.instance_count = list.len() as u32;
            true
        } else {
            trace!(
                from = self.capacity_bytes,
                to = bytes.len(),
                "instance buffer grown"
            );
            *self = Self::upload(device, list);
            false
        }
    }

    /// Bind as the instance-rate vertex stream at the given slot.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        let used = u64::from(self.instance_count)
            * (FLOATS_PER_INSTANCE * std::mem::size_of::<f32>()) as u64;
        render_pass.set_vertex_buffer(slot, self.buffer.slice(..used));
    }

    /// Number of instances the buffer currently holds.
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Allocated size in bytes, for memory tracking.
    #[must_use]
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// Instance-rate vertex layout: `level` at location 2, `A`, `R`, `S`
    /// at locations 3 to 5.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        const FLOAT: u64 = std::mem::size_of::<f32>() as u64;
        wgpu::VertexBufferLayout {
            array_stride: FLOATS_PER_INSTANCE as u64 * FLOAT,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: VertexFormat::Float32,
                },
                VertexAttribute {
                    offset: FLOAT,
                    shader_location: 3,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: 4 * FLOAT,
                    shader_location: 4,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: 7 * FLOAT,
                    shader_location: 5,
                    format: VertexFormat::Float32x3,
                },
            ],
        }
    }
}
