use planet_geom::{DVec3, Vec3};

use crate::constants::NUM_VERTICES;

/// One patch's vertex data, structure-of-arrays. Positions are relative to
/// `center` so they fit in `f32` at any planet radius; texcoords hold the unit
/// sphere normal. Immutable once built.
#[derive(Clone, Debug)]
pub struct PatchMesh {
    pub center: DVec3,
    pub positions: Vec<Vec3>,
    pub texcoords: Vec<Vec3>,
    pub displacements: Vec<f32>,
}

impl PatchMesh {
    pub(crate) fn zeroed(center: DVec3) -> Self {
        Self {
            center,
            positions: vec![Vec3::ZERO; NUM_VERTICES],
            texcoords: vec![Vec3::ZERO; NUM_VERTICES],
            displacements: vec![0.0; NUM_VERTICES],
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Absolute position of vertex `i` in planet space.
    #[inline]
    pub fn world_position(&self, i: usize) -> DVec3 {
        self.center + self.positions[i].as_dvec3()
    }
}
