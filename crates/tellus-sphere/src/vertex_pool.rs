//! Deduplicated, append-only pool of subdivision vertices.
//!
//! Adjacent faces independently compute the midpoint of their shared edge
//! during subdivision. Without welding, the mesh would carry duplicate
//! unconnected vertices along every edge, breaking morph continuity and
//! wasting memory. The pool collapses numerically-coincident positions by
//! hashing each position at a fixed decimal precision, an O(1) alternative
//! to a spatial index that works because subdivision only ever produces a
//! bounded, discrete set of points per level.

use std::collections::HashMap;

use glam::DVec3;

/// Number of decimal digits kept by the position hash.
///
/// Two positions equal up to this precision collapse to one index. On a
/// unit sphere this welds midpoints computed from either side of an edge
/// while keeping genuinely distinct subdivision points apart through far
/// more levels than `max_lod` ever allows. Coarser precision risks false
/// merges; finer precision risks failing to weld midpoints that differ
/// only by floating-point noise.
const HASH_DIGITS: usize = 5;

/// A growable set of 3D positions with position-hash deduplication.
///
/// Grows monotonically for the life of its sphere; subdivision only adds
/// vertices, so nothing is ever removed.
#[derive(Debug, Default, Clone)]
pub struct VertexPool {
    /// Flattened positions, 3 floats per vertex.
    positions: Vec<f64>,
    /// Quantized position key → vertex index.
    index_map: HashMap<String, u32>,
}

impl VertexPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool seeded with flattened base-polyhedron positions.
    ///
    /// The seed vertices are registered in the dedup map so later
    /// subdivision cannot re-add a base corner under a new index.
    #[must_use]
    pub fn from_flat(flat: &[f64]) -> Self {
        debug_assert!(flat.len() % 3 == 0, "flattened positions come in triples");
        let mut pool = Self::new();
        for chunk in flat.chunks_exact(3) {
            pool.add_vertex(DVec3::new(chunk[0], chunk[1], chunk[2]));
        }
        pool
    }

    fn hash(v: DVec3) -> String {
        format!(
            "{:.digits$}:{:.digits$}:{:.digits$}",
            v.x,
            v.y,
            v.z,
            digits = HASH_DIGITS
        )
    }

    /// Add a position, returning its index.
    ///
    /// Idempotent for positions equal up to the hash precision: the
    /// existing index is returned and the pool does not grow.
    pub fn add_vertex(&mut self, v: DVec3) -> u32 {
        let key = Self::hash(v);
        if let Some(&idx) = self.index_map.get(&key) {
            return idx;
        }

        self.positions.extend_from_slice(&[v.x, v.y, v.z]);
        let idx = (self.positions.len() / 3 - 1) as u32;
        self.index_map.insert(key, idx);
        idx
    }

    /// Position at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds. Indices handed out by
    /// [`VertexPool::add_vertex`] are always valid; anything else is a
    /// caller bug.
    #[must_use]
    pub fn vertex_at(&self, index: u32) -> DVec3 {
        let i = index as usize * 3;
        DVec3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    /// Number of distinct vertices in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    /// Whether the pool holds no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Adding the same position twice returns the same index and does not
    /// grow the pool.
    #[test]
    fn test_add_vertex_idempotent() {
        let mut pool = VertexPool::new();
        let v = DVec3::new(0.1, -0.2, 0.3);

        let a = pool.add_vertex(v);
        let b = pool.add_vertex(v);
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    /// Positions equal up to the hash precision merge to one index.
    #[test]
    fn test_positions_merge_at_hash_precision() {
        let mut pool = VertexPool::new();
        let a = pool.add_vertex(DVec3::new(0.123456, 0.0, 0.0));
        let b = pool.add_vertex(DVec3::new(0.123457, 0.0, 0.0));
        assert_eq!(a, b, "positions that round to the same key must weld");
        assert_eq!(pool.len(), 1);
    }

    /// Positions that differ beyond the precision stay distinct.
    #[test]
    fn test_distinct_positions_get_distinct_indices() {
        let mut pool = VertexPool::new();
        let a = pool.add_vertex(DVec3::new(0.1234, 0.0, 0.0));
        let b = pool.add_vertex(DVec3::new(0.1235, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
    }

    /// `vertex_at` returns the stored position.
    #[test]
    fn test_vertex_at_roundtrip() {
        let mut pool = VertexPool::new();
        let v = DVec3::new(1.0, 2.0, 3.0);
        let idx = pool.add_vertex(v);
        assert_eq!(pool.vertex_at(idx), v);
    }

    /// Seeding from a flat slice assigns consecutive indices in order.
    #[test]
    fn test_from_flat_preserves_order() {
        let pool = VertexPool::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.vertex_at(0), DVec3::ZERO);
        assert_eq!(pool.vertex_at(1), DVec3::X);
        assert_eq!(pool.vertex_at(2), DVec3::Y);
    }

    /// Midpoints computed from either side of a shared edge weld together.
    #[test]
    fn test_shared_edge_midpoints_weld() {
        let mut pool = VertexPool::new();
        let a = DVec3::new(-0.5257311121191336, 0.85065080835204, 0.0);
        let b = DVec3::new(0.5257311121191336, 0.85065080835204, 0.0);

        // Two faces computing the midpoint independently, in opposite
        // corner order.
        let m1 = pool.add_vertex(a.lerp(b, 0.5));
        let m2 = pool.add_vertex(b.lerp(a, 0.5));
        assert_eq!(m1, m2);
    }
}
