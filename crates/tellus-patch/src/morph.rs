//! CPU reference for the shader-side geomorphing math.
//!
//! The vertex shader evaluates exactly these formulas per vertex; this
//! module keeps a testable copy so morph behavior can be verified
//! without a GPU.

use glam::DVec3;
use tellus_sphere::{PatchInstance, SplitDistanceLut};

use crate::geometry::PatchVertex;

/// Blend factor between a patch's own tessellation and its parent's.
///
/// A patch at level `n` comes into existence when the camera crosses the
/// level `n − 1` split distance. Right there the factor is 1: every
/// vertex the parent lacks sits fully morphed onto the parent grid, so
/// the split is invisible. As the camera closes `morph_range` of the gap
/// toward this level's own split distance the factor falls to 0 and the
/// patch's full detail unfolds. Level 0 has no parent and never morphs.
#[must_use]
pub fn morph_factor(dist: f64, level: u8, lut: &SplitDistanceLut, morph_range: f64) -> f64 {
    if level == 0 {
        return 0.0;
    }
    let low = lut.distance(level - 1);
    // Leaves at the ceiling level have no further split distance; the
    // shader's table is zero-filled past max_lod and the blend interval
    // extends to the surface. Match that here.
    let high = lut
        .distances()
        .get(usize::from(level))
        .copied()
        .unwrap_or(0.0);
    let a = (dist - low) / (high - low);
    1.0 - (a / morph_range).clamp(0.0, 1.0)
}

/// World-space (sphere-local) position of one patch vertex on one
/// instance, morph applied.
#[must_use]
pub fn patch_position(
    instance: &PatchInstance,
    vertex: &PatchVertex,
    cam_pos: DVec3,
    lut: &SplitDistanceLut,
    morph_range: f64,
) -> DVec3 {
    let a = DVec3::from(instance.a.map(f64::from));
    let r = DVec3::from(instance.r.map(f64::from));
    let s = DVec3::from(instance.s.map(f64::from));
    let [px, py] = vertex.pos.map(f64::from);
    let [mx, my] = vertex.morph.map(f64::from);

    let pos = a + r * px + s * py;
    let factor = morph_factor(
        cam_pos.distance(pos),
        instance.level as u8,
        lut,
        morph_range,
    );
    pos + (r * mx + s * my) * factor
}
