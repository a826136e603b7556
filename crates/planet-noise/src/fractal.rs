//! Octave summation shared by the fractal, billow and ridged wrappers.

use crate::NoiseError;

pub const DEFAULT_OCTAVES: u32 = 1;
pub const DEFAULT_PERSISTENCE: f64 = 0.75;
pub const DEFAULT_FREQUENCY: f64 = 2.0;

/// Validated octave parameters. Octave `i` samples at `frequency * 2^i` with
/// amplitude `persistence^i`; the sum is normalized by the total amplitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Octaves {
    octaves: u32,
    persistence: f64,
    frequency: f64,
}

impl Octaves {
    pub fn new(octaves: u32, persistence: f64, frequency: f64) -> Result<Self, NoiseError> {
        if octaves == 0 {
            return Err(NoiseError::ZeroOctaves);
        }
        if !persistence.is_finite() || persistence <= 0.0 {
            return Err(NoiseError::InvalidParameter {
                name: "persistence",
                value: persistence,
            });
        }
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(NoiseError::InvalidParameter {
                name: "frequency",
                value: frequency,
            });
        }
        Ok(Self::from_parts(octaves, persistence, frequency))
    }

    /// Unchecked; only for parameters known to be valid.
    pub(crate) const fn from_parts(octaves: u32, persistence: f64, frequency: f64) -> Self {
        Self {
            octaves,
            persistence,
            frequency,
        }
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn persistence(&self) -> f64 {
        self.persistence
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub(crate) fn sum(
        &self,
        x: f64,
        y: f64,
        z: f64,
        mut sample: impl FnMut(f64, f64, f64) -> f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut amplitude_sum = 0.0;
        let mut frequency = self.frequency;
        for _ in 0..self.octaves {
            total += sample(x * frequency, y * frequency, z * frequency) * amplitude;
            amplitude_sum += amplitude;
            amplitude *= self.persistence;
            frequency *= 2.0;
        }
        total / amplitude_sum
    }
}

#[inline]
pub(crate) fn billow(s: f64) -> f64 {
    s.abs() * 2.0 - 1.0
}

#[inline]
pub(crate) fn ridge(s: f64) -> f64 {
    (1.0 - s.abs()) * 2.0 - 1.0
}
