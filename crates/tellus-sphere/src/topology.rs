//! Base polyhedron topologies: icosahedron and cube.
//!
//! The two topologies differ in how face centroids map onto the sphere
//! (icosphere faces project, quadsphere faces stay on the cube and are
//! spherified in the vertex shader), in their root face sets, and in the
//! opening angle their horizon-culling LUT is derived from.

use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};

use crate::face::{Corners, Face};
use crate::vertex_pool::VertexPool;

/// Which base polyhedron a sphere subdivides.
///
/// Selected once at sphere construction; faces dispatch on it outside the
/// hot traversal loop (split geometry and centroid mapping differ per
/// topology).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    /// 20 triangular root faces on an icosahedron.
    Ico,
    /// 6 quad root faces on a cube.
    Quad,
}

/// Icosahedron vertices: the three mutually-orthogonal golden rectangles,
/// pre-normalized (components are `1/|(1, φ, 0)|` and `φ/|(1, φ, 0)|`).
const ICOSAHEDRON_VERTICES: [f64; 36] = [
    -0.525_731_112_119_133_6, 0.850_650_808_352_04, 0.0,
    0.525_731_112_119_133_6, 0.850_650_808_352_04, 0.0,
    -0.525_731_112_119_133_6, -0.850_650_808_352_04, 0.0,
    0.525_731_112_119_133_6, -0.850_650_808_352_04, 0.0,
    0.0, -0.525_731_112_119_133_6, 0.850_650_808_352_04,
    0.0, 0.525_731_112_119_133_6, 0.850_650_808_352_04,
    0.0, -0.525_731_112_119_133_6, -0.850_650_808_352_04,
    0.0, 0.525_731_112_119_133_6, -0.850_650_808_352_04,
    0.850_650_808_352_04, 0.0, -0.525_731_112_119_133_6,
    0.850_650_808_352_04, 0.0, 0.525_731_112_119_133_6,
    -0.850_650_808_352_04, 0.0, -0.525_731_112_119_133_6,
    -0.850_650_808_352_04, 0.0, 0.525_731_112_119_133_6,
];

/// The 20 icosahedron faces, counter-clockwise from outside.
const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Cube corners at ±1. Deliberately *not* normalized: quadsphere faces
/// stay on the cube on the CPU and are spherified per vertex on the GPU.
const CUBE_VERTICES: [f64; 24] = [
    -1.0, -1.0, -1.0,
    1.0, -1.0, -1.0,
    1.0, 1.0, -1.0,
    -1.0, 1.0, -1.0,
    -1.0, -1.0, 1.0,
    -1.0, 1.0, 1.0,
    1.0, 1.0, 1.0,
    1.0, -1.0, 1.0,
];

/// The 6 cube faces as corner loops, outward winding.
const CUBE_FACES: [[u32; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 3, 5, 4],
    [1, 7, 6, 2],
    [3, 2, 6, 5],
    [0, 4, 7, 1],
];

impl Topology {
    /// Vertex pool seeded with this topology's base polyhedron.
    #[must_use]
    pub fn base_pool(self) -> VertexPool {
        match self {
            Topology::Ico => VertexPool::from_flat(&ICOSAHEDRON_VERTICES),
            Topology::Quad => VertexPool::from_flat(&CUBE_VERTICES),
        }
    }

    /// The root faces of the subdivision forest: 20 triangles for the
    /// icosphere, 6 quads for the quadsphere.
    #[must_use]
    pub fn root_faces(self) -> Vec<Face> {
        match self {
            Topology::Ico => ICOSAHEDRON_FACES
                .iter()
                .map(|&[a, b, c]| Face::root(Corners::Tri([a, b, c])))
                .collect(),
            Topology::Quad => CUBE_FACES
                .iter()
                .map(|&[a, b, c, d]| Face::root(Corners::quad_from_loop(a, b, c, d)))
                .collect(),
        }
    }

    /// Map a point derived from face corners onto the unit sphere.
    ///
    /// Icosphere corners live on the unit sphere already, so interpolated
    /// points only need normalizing. Quadsphere points stay on the cube;
    /// the spherification happens in the vertex shader.
    #[must_use]
    pub fn map_to_unit_sphere(self, v: DVec3) -> DVec3 {
        match self {
            Topology::Ico => v.normalize(),
            Topology::Quad => v,
        }
    }

    /// Opening angle of one face for horizon-culling LUT derivation:
    /// 60° for equilateral icosphere triangles, 90° for quad faces.
    #[must_use]
    pub fn opening_angle(self) -> f64 {
        match self {
            Topology::Ico => FRAC_PI_3,
            Topology::Quad => FRAC_PI_2,
        }
    }

    /// Number of root faces.
    #[must_use]
    pub fn root_face_count(self) -> usize {
        match self {
            Topology::Ico => 20,
            Topology::Quad => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Icosahedron base vertices already lie on the unit sphere.
    #[test]
    fn test_icosahedron_vertices_are_unit() {
        let pool = Topology::Ico.base_pool();
        assert_eq!(pool.len(), 12);
        for i in 0..12 {
            let len = pool.vertex_at(i).length();
            assert!((len - 1.0).abs() < 1e-12, "vertex {i} has length {len}");
        }
    }

    /// The icosphere has 20 root faces, the quadsphere 6.
    #[test]
    fn test_root_face_counts() {
        assert_eq!(Topology::Ico.root_faces().len(), 20);
        assert_eq!(Topology::Quad.root_faces().len(), 6);
    }

    /// Every icosahedron edge is shared by exactly two root faces.
    #[test]
    fn test_icosahedron_edges_shared_twice() {
        let mut edge_counts = std::collections::HashMap::new();
        for face in &ICOSAHEDRON_FACES {
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let edge = (a.min(b), a.max(b));
                *edge_counts.entry(edge).or_insert(0u32) += 1;
            }
        }
        assert_eq!(edge_counts.len(), 30);
        for (edge, count) in edge_counts {
            assert_eq!(count, 2, "edge {edge:?} shared by {count} faces");
        }
    }

    /// Every cube edge is shared by exactly two root faces.
    #[test]
    fn test_cube_edges_shared_twice() {
        let mut edge_counts = std::collections::HashMap::new();
        for face in &CUBE_FACES {
            for i in 0..4 {
                let a = face[i];
                let b = face[(i + 1) % 4];
                let edge = (a.min(b), a.max(b));
                *edge_counts.entry(edge).or_insert(0u32) += 1;
            }
        }
        assert_eq!(edge_counts.len(), 12);
        for (edge, count) in edge_counts {
            assert_eq!(count, 2, "edge {edge:?} shared by {count} faces");
        }
    }

    /// The unit-sphere mapping normalizes for the icosphere and is the
    /// identity for the quadsphere.
    #[test]
    fn test_map_to_unit_sphere() {
        let v = DVec3::new(2.0, 0.0, 0.0);
        assert_eq!(Topology::Ico.map_to_unit_sphere(v), DVec3::X);
        assert_eq!(Topology::Quad.map_to_unit_sphere(v), v);
    }

    /// Every cube face winds the same way: the basis cross product
    /// `(b−a) × (d−a)` points toward the cube interior for all six faces,
    /// so instancing sees a consistent orientation.
    #[test]
    fn test_cube_faces_wind_consistently() {
        let pool = Topology::Quad.base_pool();
        for face in &CUBE_FACES {
            let [a, b, c, d] = face.map(|i| pool.vertex_at(i));
            let center = (a + b + c + d) / 4.0;
            let normal = (b - a).cross(d - a);
            assert!(
                normal.dot(center) < 0.0,
                "face {face:?} breaks the winding convention"
            );
        }
    }
}
