//! The sphere: owns the subdivision forest, the shared vertex pool, the
//! per-level look-up tables and the local-to-world transform, and turns a
//! camera into a per-frame list of patch instances.

use glam::{DMat4, DQuat, DVec3};
use tellus_camera::{Camera, Frustum};
use tellus_config::{ConfigError, SphereConfig};
use tracing::{debug, trace};

use crate::face::{Face, TraversalContext};
use crate::instance::PatchInstance;
use crate::lut::{CullingAngleLut, SplitDistanceLut};
use crate::topology::Topology;
use crate::vertex_pool::VertexPool;

/// World-space axis-aligned bounds of the sphere including the maximum
/// terrain displacement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

/// An adaptively tessellated sphere.
///
/// Faces are tessellated in the sphere's local unit space; the model
/// matrix carries radius, orientation and center into world space. The
/// camera is transformed the opposite way each frame, so every split and
/// culling decision happens in local space with unit-sphere geometry.
pub struct Sphere {
    config: SphereConfig,
    topology: Topology,
    pool: VertexPool,
    faces: Vec<Face>,
    center: DVec3,
    orientation: DQuat,
    model_matrix: DMat4,
    inverse_model_matrix: DMat4,
    matrix_dirty: bool,
    first_update: bool,
    split_lut: Option<SplitDistanceLut>,
    cull_lut: Option<CullingAngleLut>,
    frustum: Option<Frustum>,
    instances: Vec<PatchInstance>,
}

impl Sphere {
    /// Build a sphere from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration fails
    /// validation, before any geometry is generated.
    pub fn new(config: SphereConfig, topology: Topology) -> Result<Self, ConfigError> {
        config.validate()?;

        let pool = topology.base_pool();
        let faces = topology.root_faces();
        let center = DVec3::from_array(config.center);
        let [x, y, z, w] = config.orientation;
        let orientation = DQuat::from_xyzw(x, y, z, w).normalize();

        debug!(
            ?topology,
            radius = config.radius,
            max_lod = config.max_lod,
            roots = faces.len(),
            "sphere created"
        );

        let mut sphere = Self {
            config,
            topology,
            pool,
            faces,
            center,
            orientation,
            model_matrix: DMat4::IDENTITY,
            inverse_model_matrix: DMat4::IDENTITY,
            matrix_dirty: false,
            first_update: true,
            split_lut: None,
            cull_lut: None,
            frustum: None,
            instances: Vec::new(),
        };
        sphere.recompute_matrices();
        Ok(sphere)
    }

    fn recompute_matrices(&mut self) {
        self.model_matrix = DMat4::from_scale_rotation_translation(
            DVec3::splat(self.config.radius),
            self.orientation,
            self.center,
        );
        self.inverse_model_matrix = self.model_matrix.inverse();
        self.matrix_dirty = false;
    }

    /// Regenerate both per-level look-up tables for the given camera.
    ///
    /// Runs automatically on the first [`update`](Self::update); call it
    /// again after the camera's field of view or viewport width changes.
    pub fn update_look_up_tables(&mut self, camera: &Camera) {
        // The base edge is the same for every root face, so the first
        // face's leading edge stands in for all of them.
        let corners = self.faces[0].corners().as_slice();
        let base_edge = self
            .pool
            .vertex_at(corners[0])
            .distance(self.pool.vertex_at(corners[1]));

        self.split_lut = Some(SplitDistanceLut::generate(&self.config, camera, base_edge));
        self.cull_lut = Some(CullingAngleLut::generate(&self.config, self.topology));
        debug!(base_edge, "look-up tables regenerated");
    }

    /// Split distance for a subdivision level.
    ///
    /// # Panics
    ///
    /// Panics when called before the look-up tables exist, or with a
    /// level at or above `max_lod`.
    #[must_use]
    pub fn split_distance(&self, level: u8) -> f64 {
        let Some(lut) = &self.split_lut else {
            panic!("update_look_up_tables must run before split_distance");
        };
        lut.distance(level)
    }

    /// Horizon-culling angle threshold for a subdivision level.
    ///
    /// # Panics
    ///
    /// Panics when called before the look-up tables exist, or with a
    /// level above `max_lod`.
    #[must_use]
    pub fn culling_angle(&self, level: u8) -> f64 {
        let Some(lut) = &self.cull_lut else {
            panic!("update_look_up_tables must run before culling_angle");
        };
        lut.angle(level)
    }

    /// Advance the tessellation for one frame.
    ///
    /// Rebuilds the frustum and the camera's local-space position, then
    /// walks every root face: invisible subtrees are pruned, faces closer
    /// than their level's split distance are subdivided, and each visible
    /// stable leaf contributes one instance. The returned slice is valid
    /// until the next update.
    pub fn update(&mut self, camera: &Camera) -> &[PatchInstance] {
        if self.first_update {
            self.update_look_up_tables(camera);
            self.first_update = false;
        }
        if self.matrix_dirty {
            self.recompute_matrices();
        }

        self.frustum = Some(Frustum::new(camera, self.inverse_model_matrix));
        let camera_local = self.inverse_model_matrix.transform_point3(camera.position);

        let topology = self.topology;
        let max_lod = self.config.max_lod;
        let height_ratio = self.config.max_terrain_height / self.config.radius;

        self.instances.clear();
        let Sphere {
            pool,
            faces,
            split_lut,
            cull_lut,
            frustum,
            instances,
            ..
        } = self;
        let (Some(split_lut), Some(cull_lut), Some(frustum)) =
            (split_lut.as_ref(), cull_lut.as_ref(), frustum.as_ref())
        else {
            panic!("look-up tables and frustum must exist during update");
        };

        let mut ctx = TraversalContext {
            pool,
            topology,
            split_lut,
            cull_lut,
            frustum,
            camera_local,
            max_lod,
            height_ratio,
        };
        for face in faces.iter_mut() {
            face.update_patch_instances(&mut ctx, instances);
        }

        trace!(
            instances = self.instances.len(),
            vertices = self.pool.len(),
            "sphere updated"
        );
        &self.instances
    }

    /// The instance list produced by the most recent update.
    #[must_use]
    pub fn instances(&self) -> &[PatchInstance] {
        &self.instances
    }

    /// Number of instances produced by the most recent update.
    #[must_use]
    pub fn instances_count(&self) -> usize {
        self.instances.len()
    }

    /// Move the sphere's center. Takes effect on the next update.
    pub fn set_center(&mut self, center: DVec3) {
        self.center = center;
        self.matrix_dirty = true;
    }

    /// Reorient the sphere. Takes effect on the next update.
    pub fn set_orientation(&mut self, orientation: DQuat) {
        self.orientation = orientation.normalize();
        self.matrix_dirty = true;
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    #[must_use]
    pub fn center(&self) -> DVec3 {
        self.center
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub fn config(&self) -> &SphereConfig {
        &self.config
    }

    /// Local-to-world transform: scale by radius, rotate, translate.
    #[must_use]
    pub fn model_matrix(&self) -> DMat4 {
        self.model_matrix
    }

    #[must_use]
    pub fn inverse_model_matrix(&self) -> DMat4 {
        self.inverse_model_matrix
    }

    /// The frustum built by the most recent update, in local space.
    #[must_use]
    pub fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }

    /// World-space bounds including maximum terrain displacement.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let extent = DVec3::splat(self.config.radius + self.config.max_terrain_height);
        BoundingBox {
            min: self.center - extent,
            max: self.center + extent,
        }
    }

    /// Total number of faces in the forest, all levels included.
    #[must_use]
    pub fn face_count(&self) -> usize {
        fn count(face: &Face) -> usize {
            1 + face
                .children()
                .map_or(0, |ch| ch.iter().map(count).sum::<usize>())
        }
        self.faces.iter().map(count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: DVec3) -> Camera {
        Camera::new(position, 30f64.to_radians(), 16.0 / 9.0, 0.1, 5000.0)
    }

    fn unit_ico_sphere() -> Sphere {
        Sphere::new(SphereConfig::default(), Topology::Ico).expect("default config is valid")
    }

    /// An invalid configuration is rejected before any geometry exists.
    #[test]
    fn test_invalid_config_rejected() {
        let config = SphereConfig {
            radius: -1.0,
            ..SphereConfig::default()
        };
        assert!(Sphere::new(config, Topology::Ico).is_err());
    }

    /// The first update initializes the look-up tables on its own.
    #[test]
    fn test_first_update_initializes_luts() {
        let mut sphere = unit_ico_sphere();
        let camera = camera_at(DVec3::new(0.0, 0.0, -10.0));

        sphere.update(&camera);
        assert!(sphere.split_distance(0) > 0.0);
        assert!(sphere.culling_angle(0) > 0.0);
    }

    /// Reading a look-up table before any update is a programmer error.
    #[test]
    #[should_panic(expected = "update_look_up_tables")]
    fn test_lut_read_before_update_panics() {
        let sphere = unit_ico_sphere();
        sphere.split_distance(0);
    }

    /// Two updates from the same camera produce identical instance lists.
    #[test]
    fn test_update_is_deterministic() {
        let mut sphere = unit_ico_sphere();
        let camera = camera_at(DVec3::new(0.0, 0.0, -4.0));

        let first: Vec<PatchInstance> = sphere.update(&camera).to_vec();
        let second: Vec<PatchInstance> = sphere.update(&camera).to_vec();
        assert_eq!(first, second);
    }

    /// A distant camera sees coarse detail; a close camera sees more
    /// instances, and never a level beyond the ceiling.
    #[test]
    fn test_detail_scales_with_distance() {
        let mut sphere = unit_ico_sphere();
        let max_lod = f32::from(sphere.config().max_lod);

        let far = sphere.update(&camera_at(DVec3::new(0.0, 0.0, -100.0))).len();
        let near_instances = sphere.update(&camera_at(DVec3::new(0.0, 0.0, -1.2)));
        let near = near_instances.len();

        assert!(far > 0, "sphere in view must emit instances");
        assert!(near > far, "closer camera must emit more instances");
        assert!(
            near_instances.iter().all(|i| i.level <= max_lod),
            "no instance may exceed max_lod"
        );
    }

    /// A camera looking away from the sphere gets an empty list, and a
    /// later update facing it again repopulates the list.
    #[test]
    fn test_instances_rebuilt_each_frame() {
        let mut sphere = unit_ico_sphere();

        let facing = camera_at(DVec3::new(0.0, 0.0, -10.0));
        assert!(!sphere.update(&facing).is_empty());

        // Behind the camera: it sits past the sphere looking further away.
        let looking_away = camera_at(DVec3::new(0.0, 0.0, 10.0));
        assert!(sphere.update(&looking_away).is_empty());

        assert!(!sphere.update(&facing).is_empty());
    }

    /// Moving the center re-derives the model matrix on the next update.
    #[test]
    fn test_center_change_updates_matrices() {
        let mut sphere = unit_ico_sphere();
        let camera = camera_at(DVec3::new(0.0, 0.0, -10.0));
        sphere.update(&camera);

        let new_center = DVec3::new(100.0, 0.0, 0.0);
        sphere.set_center(new_center);
        sphere.update(&camera);

        assert_eq!(sphere.model_matrix().w_axis.truncate(), new_center);
        let local = sphere
            .inverse_model_matrix()
            .transform_point3(new_center);
        assert!(local.length() < 1e-9, "center maps to the local origin");
    }

    /// The bounding box covers the sphere plus terrain headroom.
    #[test]
    fn test_bounding_box_includes_terrain() {
        let config = SphereConfig {
            radius: 10.0,
            center: [1.0, 2.0, 3.0],
            max_terrain_height: 2.5,
            ..SphereConfig::default()
        };
        let sphere = Sphere::new(config, Topology::Quad).expect("valid config");

        let bb = sphere.bounding_box();
        assert_eq!(bb.min, DVec3::new(-11.5, -10.5, -9.5));
        assert_eq!(bb.max, DVec3::new(13.5, 14.5, 15.5));
    }

    /// The number of emitted instances equals the number of faces that
    /// are visible leaves under the same frame's decisions, recounted by
    /// a traversal that emits nothing.
    #[test]
    fn test_instance_count_matches_visible_leaves() {
        let mut sphere = unit_ico_sphere();
        let camera = camera_at(DVec3::new(0.0, 0.0, -3.0));
        let emitted = sphere.update(&camera).len();
        assert!(emitted > 0);

        let camera_local = sphere
            .inverse_model_matrix
            .transform_point3(camera.position);
        let topology = sphere.topology;
        let max_lod = sphere.config.max_lod;
        let height_ratio = sphere.config.max_terrain_height / sphere.config.radius;
        let Sphere {
            pool,
            faces,
            split_lut,
            cull_lut,
            frustum,
            ..
        } = &mut sphere;
        let (Some(split_lut), Some(cull_lut), Some(frustum)) =
            (split_lut.as_ref(), cull_lut.as_ref(), frustum.as_ref())
        else {
            panic!("update must have produced tables and frustum");
        };
        let mut ctx = TraversalContext {
            pool,
            topology,
            split_lut,
            cull_lut,
            frustum,
            camera_local,
            max_lod,
            height_ratio,
        };

        fn visible_leaves(face: &mut Face, ctx: &mut TraversalContext<'_>) -> usize {
            if !face.is_visible(ctx) {
                return 0;
            }
            if face.should_split(ctx) {
                face.children_mut().map_or(0, |children| {
                    children
                        .iter_mut()
                        .map(|child| visible_leaves(child, ctx))
                        .sum()
                })
            } else {
                1
            }
        }
        let counted: usize = faces
            .iter_mut()
            .map(|face| visible_leaves(face, &mut ctx))
            .sum();
        assert_eq!(counted, emitted);
    }

    /// Faces persist across updates: the forest only ever grows.
    #[test]
    fn test_forest_grows_monotonically() {
        let mut sphere = unit_ico_sphere();

        sphere.update(&camera_at(DVec3::new(0.0, 0.0, -2.0)));
        let after_near = sphere.face_count();

        sphere.update(&camera_at(DVec3::new(0.0, 0.0, -100.0)));
        assert_eq!(
            sphere.face_count(),
            after_near,
            "zooming out must not free split faces"
        );
    }
}
