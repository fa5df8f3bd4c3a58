//! Reference patch meshes.
//!
//! One static mesh per topology is generated once at startup and drawn
//! instanced for every visible leaf face. Vertices live in the face's
//! barycentric plane basis; the vertex shader reconstructs world
//! positions as `A + R·pos.x + S·pos.y` per instance, then nudges each
//! vertex by its morph offset scaled by the camera-distance morph factor
//! so child patches fade in without popping.

use bytemuck::{Pod, Zeroable};
use tellus_sphere::Topology;

/// One vertex of the reference patch mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PatchVertex {
    /// Position in the face plane basis, both components in `[0, 1]`.
    pub pos: [f32; 2],
    /// Offset toward the vertex's position in the parent tessellation,
    /// in the same basis. Zero for vertices the parent also has.
    pub morph: [f32; 2],
}

impl PatchVertex {
    /// Vertex buffer layout: `pos` at location 0, `morph` at location 1.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PatchVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x2,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// CPU-side reference patch mesh, ready for upload.
#[derive(Clone, Debug)]
pub struct PatchMesh {
    pub vertices: Vec<PatchVertex>,
    pub indices: Vec<u32>,
}

impl PatchMesh {
    /// Generate the reference mesh for a topology.
    ///
    /// `levels` controls the internal subdivision of the triangular patch
    /// and is ignored by the quad patch, whose four-quadrant mesh is
    /// fixed.
    #[must_use]
    pub fn generate(topology: Topology, levels: u32) -> Self {
        match topology {
            Topology::Ico => Self::triangular(levels),
            Topology::Quad => Self::quad(),
        }
    }

    /// Uniformly subdivided triangle covering the plane-basis simplex
    /// `x + y ≤ 1`, with `2^levels + 1` vertex rows.
    ///
    /// Morph offsets follow the row/column parity: a vertex introduced by
    /// the finest subdivision points at the coarser vertex it emerged
    /// from, vertices the parent tessellation already has get zero.
    fn triangular(levels: u32) -> Self {
        let rows = (1usize << levels) + 1;
        let delta = 1.0 / (rows - 1) as f32;

        let mut vertices = Vec::with_capacity(rows * (rows + 1) / 2);
        let mut indices = Vec::new();

        let mut row_start = 0u32;
        let mut next_row_start = 0u32;
        for row in 0..rows {
            let cols = rows - row;
            next_row_start += cols as u32;
            for col in 0..cols {
                let pos = [
                    col as f32 / (rows - 1) as f32,
                    row as f32 / (rows - 1) as f32,
                ];

                let morph = if row % 2 == 0 {
                    if col % 2 == 1 {
                        [-delta, 0.0]
                    } else {
                        [0.0, 0.0]
                    }
                } else if col % 2 == 0 {
                    [0.0, delta]
                } else {
                    [delta, -delta]
                };

                vertices.push(PatchVertex { pos, morph });

                if row < rows - 1 && col < cols - 1 {
                    let col = col as u32;
                    indices.extend_from_slice(&[
                        row_start + col,
                        next_row_start + col,
                        row_start + col + 1,
                    ]);
                    if col + 2 < cols as u32 {
                        indices.extend_from_slice(&[
                            next_row_start + col,
                            next_row_start + col + 1,
                            row_start + col + 1,
                        ]);
                    }
                }
            }
            row_start = next_row_start;
        }

        Self { vertices, indices }
    }

    /// Fixed four-quadrant quad patch.
    ///
    /// Each quadrant is wound starting from its outer corner, and each
    /// mid-edge or center vertex carries the morph offset that collapses
    /// it onto that corner's coarser tessellation:
    ///
    /// ```text
    /// (0,1)---+---(1,1)
    ///   |     |     |
    ///   +-----+-----+
    ///   |     |     |
    /// (0,0)---+---(1,0)
    /// ```
    fn quad() -> Self {
        const P: [[f32; 2]; 9] = [
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.5, 0.0],
            [0.5, 0.5],
            [0.0, 0.5],
            [1.0, 0.5],
            [0.5, 1.0],
        ];

        let v = |p: usize, morph: [f32; 2]| PatchVertex { pos: P[p], morph };
        let vertices = vec![
            // quadrant anchored at (0, 0)
            v(0, [0.0, 0.0]),
            v(4, [0.5, 0.0]),
            v(5, [0.5, 0.5]),
            v(6, [0.0, 0.5]),
            // quadrant anchored at (1, 0)
            v(4, [-0.5, 0.0]),
            v(1, [0.0, 0.0]),
            v(7, [0.0, 0.5]),
            v(5, [-0.5, 0.5]),
            // quadrant anchored at (1, 1)
            v(5, [-0.5, -0.5]),
            v(7, [0.0, -0.5]),
            v(2, [0.0, 0.0]),
            v(8, [-0.5, 0.0]),
            // quadrant anchored at (0, 1)
            v(6, [0.0, -0.5]),
            v(5, [0.5, -0.5]),
            v(8, [0.5, 0.0]),
            v(3, [0.0, 0.0]),
        ];

        let indices = vec![
            0, 1, 2, 2, 3, 0, //
            4, 5, 6, 6, 7, 4, //
            8, 9, 10, 10, 11, 8, //
            12, 13, 14, 14, 15, 12,
        ];

        Self { vertices, indices }
    }

    /// Vertex data as raw bytes for buffer upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for buffer upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
