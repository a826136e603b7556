//! Distance-based split/merge policy.

use planet_geom::DVec3;
use planet_mesh_cpu::SIDE_CELLS;

use crate::SurfaceError;

/// With `d = |position - camera| - side`, a leaf splits when
/// `side >= min_side_length && d < side * split_factor` and an internal node
/// merges when `d > side * split_factor * merge_hysteresis`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodPolicy {
    pub split_factor: f64,
    pub merge_hysteresis: f64,
    pub min_side_length: f64,
}

impl Default for LodPolicy {
    fn default() -> Self {
        Self {
            split_factor: 2.0,
            merge_hysteresis: 2.0,
            min_side_length: SIDE_CELLS as f64,
        }
    }
}

impl LodPolicy {
    pub fn validate(&self) -> Result<(), SurfaceError> {
        if !(self.split_factor.is_finite() && self.split_factor > 0.0) {
            return Err(SurfaceError::InvalidConfig(format!(
                "split_factor must be finite and > 0, got {}",
                self.split_factor
            )));
        }
        if !(self.merge_hysteresis.is_finite() && self.merge_hysteresis >= 1.0) {
            return Err(SurfaceError::InvalidConfig(format!(
                "merge_hysteresis must be finite and >= 1, got {}",
                self.merge_hysteresis
            )));
        }
        if !(self.min_side_length.is_finite() && self.min_side_length > 0.0) {
            return Err(SurfaceError::InvalidConfig(format!(
                "min_side_length must be finite and > 0, got {}",
                self.min_side_length
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn distance(side: f64, position: DVec3, camera: DVec3) -> f64 {
        position.distance(camera) - side
    }

    #[inline]
    pub fn should_subdivide(&self, side: f64, position: DVec3, camera: DVec3) -> bool {
        side >= self.min_side_length
            && Self::distance(side, position, camera) < side * self.split_factor
    }

    #[inline]
    pub fn should_merge(&self, side: f64, position: DVec3, camera: DVec3) -> bool {
        Self::distance(side, position, camera) > side * self.split_factor * self.merge_hysteresis
    }
}
