//! Per-level lookup tables driving split and horizon-cull decisions.
//!
//! Both tables are derived once from sphere configuration and camera
//! projection state, then read on every face visit. They must be
//! regenerated whenever the field of view or the viewport width changes;
//! reading a table that was never generated is a programmer error and
//! panics rather than returning a silently-wrong default.

use tellus_camera::Camera;
use tellus_config::SphereConfig;

use crate::topology::Topology;

/// For each LOD level, the local-space camera distance below which a face
/// at that level splits into its children.
///
/// Solves `arctan(edge_size[level] / dist) / fov > max_edge_size / viewport_width`
/// for `dist`, with the base edge length halving per level, so the
/// projected edge stays under `max_edge_size` pixels.
#[derive(Clone, Debug)]
pub struct SplitDistanceLut {
    distances: Vec<f64>,
}

impl SplitDistanceLut {
    /// Generate the table from the base-polyhedron edge length at level 0.
    pub fn generate(config: &SphereConfig, camera: &Camera, base_edge: f64) -> Self {
        let max_screen_fraction = config.max_edge_size / camera.viewport_width;

        let mut edge_size = base_edge;
        let mut distances = Vec::with_capacity(config.max_lod as usize);
        for _ in 0..config.max_lod {
            distances.push(edge_size / (max_screen_fraction * camera.fov).tan());
            edge_size /= 2.0;
        }

        Self { distances }
    }

    /// Split distance for `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= max_lod`. Traversal never asks for a level at or
    /// past the ceiling because `should_split` short-circuits there first.
    #[must_use]
    pub fn distance(&self, level: u8) -> f64 {
        self.distances[level as usize]
    }

    /// All distances, coarsest level first.
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }
}

/// For each LOD level, the horizon back-face culling threshold.
///
/// `sin(opening + acos(radius / (radius + max_terrain_height)))`, with the
/// angle halving per level: finer faces subtend smaller angles, and the
/// terrain-height term keeps displaced geometry near the silhouette from
/// being culled. The opening angle is topology-specific (60° triangles,
/// 90° quads).
#[derive(Clone, Debug)]
pub struct CullingAngleLut {
    angles: Vec<f64>,
}

impl CullingAngleLut {
    /// Generate the table; `max_lod + 1` entries so leaves at the ceiling
    /// level still have a threshold.
    pub fn generate(config: &SphereConfig, topology: Topology) -> Self {
        let terrain_angle =
            (config.radius / (config.radius + config.max_terrain_height)).acos();

        let mut angle = topology.opening_angle() + terrain_angle;
        let mut angles = Vec::with_capacity(config.max_lod as usize + 1);
        for _ in 0..=config.max_lod {
            angles.push(angle.sin());
            angle /= 2.0;
        }

        Self { angles }
    }

    /// Culling threshold for `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level > max_lod`; levels past the ceiling cannot exist.
    #[must_use]
    pub fn angle(&self, level: u8) -> f64 {
        self.angles[level as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn test_camera() -> Camera {
        Camera::new(DVec3::ZERO, 50f64.to_radians(), 16.0 / 9.0, 0.1, 5000.0)
    }

    /// Split distances strictly decrease with level: finer faces split at
    /// closer range.
    #[test]
    fn test_split_distances_strictly_decreasing() {
        let config = SphereConfig {
            max_lod: 8,
            ..SphereConfig::default()
        };
        let lut = SplitDistanceLut::generate(&config, &test_camera(), 1.05);

        assert_eq!(lut.distances().len(), 8);
        for level in 1..8u8 {
            assert!(
                lut.distance(level) < lut.distance(level - 1),
                "distance must shrink: level {level}"
            );
        }
    }

    /// Each level's distance is exactly half the previous one (the edge
    /// halves, the projection target is fixed).
    #[test]
    fn test_split_distances_halve() {
        let config = SphereConfig::default();
        let lut = SplitDistanceLut::generate(&config, &test_camera(), 2.0);

        for level in 1..config.max_lod {
            let ratio = lut.distance(level) / lut.distance(level - 1);
            assert!((ratio - 0.5).abs() < 1e-12);
        }
    }

    /// A wider viewport makes the pixel target a smaller fraction of the
    /// screen, so faces split from farther away.
    #[test]
    fn test_wider_viewport_splits_sooner() {
        let config = SphereConfig::default();
        let narrow = SplitDistanceLut::generate(&config, &test_camera(), 1.0);
        let wide = SplitDistanceLut::generate(
            &config,
            &test_camera().with_viewport_width(3840.0),
            1.0,
        );
        assert!(wide.distance(0) > narrow.distance(0));
    }

    /// The culling LUT has `max_lod + 1` entries and the threshold halves
    /// in angle per level.
    #[test]
    fn test_culling_angles_follow_halved_angle() {
        let config = SphereConfig {
            max_lod: 6,
            max_terrain_height: 0.0,
            ..SphereConfig::default()
        };
        let lut = CullingAngleLut::generate(&config, Topology::Ico);

        let mut angle = Topology::Ico.opening_angle();
        for level in 0..=6u8 {
            assert!((lut.angle(level) - angle.sin()).abs() < 1e-12);
            angle /= 2.0;
        }
    }

    /// Terrain height widens the culling angle at every level, keeping
    /// displaced silhouette geometry visible.
    #[test]
    fn test_terrain_height_widens_threshold() {
        let flat = SphereConfig {
            radius: 1000.0,
            max_terrain_height: 0.0,
            ..SphereConfig::default()
        };
        let mountainous = SphereConfig {
            radius: 1000.0,
            max_terrain_height: 100.0,
            ..SphereConfig::default()
        };

        let flat_lut = CullingAngleLut::generate(&flat, Topology::Ico);
        let high_lut = CullingAngleLut::generate(&mountainous, Topology::Ico);

        // Level 0 angle is sin(60° + x) with x > 0; past 90° the sine can
        // wrap back down, so compare at a finer level where angles are
        // small and monotone.
        assert!(high_lut.angle(3) > flat_lut.angle(3));
    }

    /// Quad topology derives from a 90° opening, icosphere from 60°.
    #[test]
    fn test_topology_specific_opening() {
        let config = SphereConfig {
            max_terrain_height: 0.0,
            ..SphereConfig::default()
        };
        let ico = CullingAngleLut::generate(&config, Topology::Ico);
        let quad = CullingAngleLut::generate(&config, Topology::Quad);

        assert!((ico.angle(0) - 60f64.to_radians().sin()).abs() < 1e-12);
        assert!((quad.angle(0) - 1.0).abs() < 1e-12);
    }
}
