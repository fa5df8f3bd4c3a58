//! Recursive sphere faces: split/merge-free quadrant subdivision with
//! visibility and LOD decisions.
//!
//! A face is a node of the subdivision forest. It is either a leaf or has
//! exactly four children that fully and exactly cover its extent. Children
//! are created lazily on first split and never destroyed: memory grows
//! monotonically with visited detail, and every memoized per-face value
//! (centroid, bounding shell, patch instance) stays valid for the face's
//! whole lifetime.

use glam::DVec3;
use tellus_camera::Frustum;

use crate::instance::PatchInstance;
use crate::lut::{CullingAngleLut, SplitDistanceLut};
use crate::topology::Topology;
use crate::vertex_pool::VertexPool;

/// Corner indices of a face, in plane-basis order.
///
/// The first three indices always span the plane containing the face:
/// the patch instance basis is `A = corners[0]`, `R = corners[1] − A`,
/// `S = corners[2] − A`. For quads this means the stored order is
/// `[a, b, d, c]` for a corner loop `a → b → c → d`, so the two
/// neighbors of `a` come first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corners {
    /// A triangular face (icosphere).
    Tri([u32; 3]),
    /// A quad face (quadsphere), stored in basis order.
    Quad([u32; 4]),
}

impl Corners {
    /// Build quad corners from a winding-order loop `a → b → c → d`.
    #[must_use]
    pub fn quad_from_loop(a: u32, b: u32, c: u32, d: u32) -> Self {
        Corners::Quad([a, b, d, c])
    }

    /// The corner indices as a slice, basis order.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        match self {
            Corners::Tri(idx) => idx,
            Corners::Quad(idx) => idx,
        }
    }
}

/// Inner and outer vertex rings used for frustum testing.
///
/// The inner ring sits on the unit sphere; the outer ring is inflated by
/// `max_terrain_height / radius` so displaced terrain cannot be culled
/// while its base face is off screen.
#[derive(Clone, Debug)]
pub struct BoundingShell {
    /// Ring on the unit sphere.
    pub inner: Vec<DVec3>,
    /// Ring inflated by the terrain-height ratio.
    pub outer: Vec<DVec3>,
}

/// Everything a face needs to make split and visibility decisions during
/// one traversal: the shared vertex pool, the frame's frustum and
/// local-space camera position, and the sphere's per-level tables.
pub(crate) struct TraversalContext<'a> {
    pub pool: &'a mut VertexPool,
    pub topology: Topology,
    pub split_lut: &'a SplitDistanceLut,
    pub cull_lut: &'a CullingAngleLut,
    pub frustum: &'a Frustum,
    /// Camera position transformed into the sphere's local (unit) space.
    pub camera_local: DVec3,
    pub max_lod: u8,
    /// `max_terrain_height / radius`.
    pub height_ratio: f64,
}

/// One node of the subdivision forest.
#[derive(Clone, Debug)]
pub struct Face {
    corners: Corners,
    level: u8,
    children: Option<Box<[Face; 4]>>,
    centroid: Option<DVec3>,
    shell: Option<BoundingShell>,
    instance: Option<PatchInstance>,
}

impl Face {
    fn new(corners: Corners, level: u8) -> Self {
        Self {
            corners,
            level,
            children: None,
            centroid: None,
            shell: None,
            instance: None,
        }
    }

    /// A root face at level 0.
    #[must_use]
    pub(crate) fn root(corners: Corners) -> Self {
        Self::new(corners, 0)
    }

    /// Depth of this face below its root. Immutable after construction.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Corner indices into the vertex pool.
    #[must_use]
    pub fn corners(&self) -> &Corners {
        &self.corners
    }

    /// Whether this face has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The four children, if this face has been split.
    #[must_use]
    pub fn children(&self) -> Option<&[Face; 4]> {
        self.children.as_deref()
    }

    /// Mutable access to the children, for external forest walks.
    pub fn children_mut(&mut self) -> Option<&mut [Face; 4]> {
        self.children.as_deref_mut()
    }

    /// Centroid of the corner positions, mapped to the unit sphere.
    ///
    /// Memoized forever: corner indices never change after construction.
    pub(crate) fn centroid(&mut self, pool: &VertexPool, topology: Topology) -> DVec3 {
        let corners = self.corners;
        *self.centroid.get_or_insert_with(|| {
            let slice = corners.as_slice();
            let sum: DVec3 = slice.iter().map(|&i| pool.vertex_at(i)).sum();
            topology.map_to_unit_sphere(sum / slice.len() as f64)
        })
    }

    /// Inner/outer bounding rings, memoized.
    fn bounding_shell(&mut self, pool: &VertexPool, height_ratio: f64) -> &BoundingShell {
        let corners = self.corners;
        self.shell.get_or_insert_with(|| {
            let inner: Vec<DVec3> = corners
                .as_slice()
                .iter()
                .map(|&i| pool.vertex_at(i).normalize())
                .collect();
            let outer = inner.iter().map(|&v| v * (1.0 + height_ratio)).collect();
            BoundingShell { inner, outer }
        })
    }

    /// The memoized patch placement record for this face.
    fn patch_instance(&mut self, pool: &VertexPool) -> PatchInstance {
        let corners = self.corners;
        let level = self.level;
        *self.instance.get_or_insert_with(|| {
            let s = corners.as_slice();
            PatchInstance::from_corners(
                level,
                pool.vertex_at(s[0]),
                pool.vertex_at(s[1]),
                pool.vertex_at(s[2]),
            )
        })
    }

    /// Two-stage visibility test.
    ///
    /// 1. Horizon cull: reject when the face normal points away from the
    ///    camera by more than the per-level threshold allows. Cheaply
    ///    rejects the far side of the sphere before any plane test.
    /// 2. Frustum test: keep the face if either bounding ring may
    ///    intersect the view volume.
    pub(crate) fn is_visible(&mut self, ctx: &mut TraversalContext<'_>) -> bool {
        let normal = self.centroid(ctx.pool, ctx.topology).normalize();
        let dir = (ctx.camera_local - normal).normalize();
        if normal.dot(dir) < -ctx.cull_lut.angle(self.level) {
            return false;
        }

        let shell = self.bounding_shell(ctx.pool, ctx.height_ratio);
        ctx.frustum.contains_volume(&shell.inner) || ctx.frustum.contains_volume(&shell.outer)
    }

    /// Whether this face is close enough to the camera to need more detail.
    /// Always false at the `max_lod` ceiling, which bounds recursion depth.
    pub(crate) fn should_split(&mut self, ctx: &mut TraversalContext<'_>) -> bool {
        if self.level >= ctx.max_lod {
            return false;
        }
        let centroid = self.centroid(ctx.pool, ctx.topology);
        ctx.camera_local.distance(centroid) < ctx.split_lut.distance(self.level)
    }

    fn midpoint(pool: &mut VertexPool, i: u32, j: u32) -> u32 {
        let mid = pool.vertex_at(i).lerp(pool.vertex_at(j), 0.5);
        pool.add_vertex(mid)
    }

    /// Split this face into four children covering it exactly.
    ///
    /// Idempotent: splitting an already-split face is a no-op, so neither
    /// duplicate children nor duplicate vertex-pool growth can occur.
    /// Midpoints go through the vertex pool, which welds the copies
    /// computed by edge-sharing neighbors.
    pub(crate) fn split(&mut self, ctx: &mut TraversalContext<'_>) {
        if self.children.is_some() {
            return;
        }

        let level = self.level + 1;
        let children = match self.corners {
            Corners::Tri([a, b, c]) => {
                let ab = Self::midpoint(ctx.pool, a, b);
                let bc = Self::midpoint(ctx.pool, b, c);
                let ac = Self::midpoint(ctx.pool, a, c);

                [
                    Face::new(Corners::Tri([ab, ac, a]), level),
                    Face::new(Corners::Tri([ab, b, bc]), level),
                    Face::new(Corners::Tri([c, ac, bc]), level),
                    Face::new(Corners::Tri([bc, ac, ab]), level),
                ]
            }
            Corners::Quad([a, b, d, c]) => {
                // Quads add a shared center vertex besides the four edge
                // midpoints; the centroid is already on the cube face
                // plane, so no remapping is needed.
                let center = self.centroid(ctx.pool, ctx.topology);

                let ab = Self::midpoint(ctx.pool, a, b);
                let bc = Self::midpoint(ctx.pool, b, c);
                let cd = Self::midpoint(ctx.pool, c, d);
                let ad = Self::midpoint(ctx.pool, a, d);
                let ac = ctx.pool.add_vertex(center);

                [
                    Face::new(Corners::quad_from_loop(a, ab, ac, ad), level),
                    Face::new(Corners::quad_from_loop(ab, b, bc, ac), level),
                    Face::new(Corners::quad_from_loop(ac, bc, c, cd), level),
                    Face::new(Corners::quad_from_loop(ad, ac, cd, d), level),
                ]
            }
        };

        self.children = Some(Box::new(children));
    }

    /// Traversal entry point: prune invisible subtrees, split where more
    /// detail is needed, and emit this face's instance when it is a
    /// visible stable leaf.
    pub(crate) fn update_patch_instances(
        &mut self,
        ctx: &mut TraversalContext<'_>,
        out: &mut Vec<PatchInstance>,
    ) {
        if !self.is_visible(ctx) {
            return;
        }

        if self.should_split(ctx) {
            self.split(ctx);
            if let Some(children) = self.children.as_mut() {
                for child in children.iter_mut() {
                    child.update_patch_instances(ctx, out);
                }
            }
        } else {
            out.push(self.patch_instance(ctx.pool));
        }
    }
}
