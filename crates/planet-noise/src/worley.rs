//! Worley (cellular) noise with a fixed per-cell feature point distribution.

use serde::Deserialize;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Cumulative thresholds for the per-cell feature point count (1..=9).
const COUNT_THRESHOLDS: [u32; 8] = [
    393_325_350,
    1_022_645_910,
    1_861_739_990,
    2_700_834_071,
    3_372_109_335,
    3_819_626_178,
    4_075_350_088,
    4_203_212_043,
];

const EMPTY_SLOT: f64 = 6666.0;
const TWO_POW_32: f64 = 4_294_967_296.0;

pub const DEFAULT_SEED: i32 = 3221;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl DistanceMetric {
    #[inline]
    fn distance(self, dx: f64, dy: f64, dz: f64) -> f64 {
        match self {
            DistanceMetric::Euclidean => (dx * dx + dy * dy + dz * dz).sqrt(),
            DistanceMetric::Manhattan => dx.abs() + dy.abs() + dz.abs(),
            DistanceMetric::Chebyshev => dx.abs().max(dy.abs()).max(dz.abs()),
        }
    }
}

/// Reduces the three nearest feature distances `F1 <= F2 <= F3` to one value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combiner {
    #[default]
    Nearest,
    SecondMinusNearest,
    ThirdMinusNearest,
}

impl Combiner {
    #[inline]
    fn combine(self, d: &[f64; 3]) -> f64 {
        match self {
            Combiner::Nearest => d[0],
            Combiner::SecondMinusNearest => d[1] - d[0],
            Combiner::ThirdMinusNearest => d[2] - d[0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Worley {
    pub seed: i32,
    pub metric: DistanceMetric,
    pub combiner: Combiner,
}

impl Default for Worley {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            metric: DistanceMetric::default(),
            combiner: Combiner::default(),
        }
    }
}

#[inline]
pub(crate) fn fnv_hash(i: u32, j: u32, k: u32) -> u32 {
    ((((FNV_OFFSET_BASIS ^ i).wrapping_mul(FNV_PRIME)) ^ j).wrapping_mul(FNV_PRIME) ^ k)
        .wrapping_mul(FNV_PRIME)
}

#[inline]
pub(crate) fn lcg(last: u32) -> u32 {
    last.wrapping_mul(1_103_515_245).wrapping_add(12_345)
}

#[inline]
pub(crate) fn feature_count(r: u32) -> usize {
    1 + COUNT_THRESHOLDS.iter().filter(|&&t| r >= t).count()
}

fn insert_sorted(slots: &mut [f64; 3], value: f64) {
    for i in (0..slots.len()).rev() {
        if value > slots[i] {
            break;
        }
        let displaced = slots[i];
        slots[i] = value;
        if i + 1 < slots.len() {
            slots[i + 1] = displaced;
        }
    }
}

impl Worley {
    pub fn new(seed: i32, metric: DistanceMetric, combiner: Combiner) -> Self {
        Self {
            seed,
            metric,
            combiner,
        }
    }

    /// Samples the field. Output is clamped to `[0, 1]`.
    pub fn evaluate(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut slots = [EMPTY_SLOT; 3];
        let (cx, cy, cz) = (x.floor() as i32, y.floor() as i32, z.floor() as i32);

        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    let (qx, qy, qz) = (cx.wrapping_add(i), cy.wrapping_add(j), cz.wrapping_add(k));
                    let mut r = lcg(fnv_hash(
                        qx.wrapping_add(self.seed) as u32,
                        qy as u32,
                        qz as u32,
                    ));
                    let count = feature_count(r);
                    for _ in 0..count {
                        r = lcg(r);
                        let fx = f64::from(r) / TWO_POW_32 + f64::from(qx);
                        r = lcg(r);
                        let fy = f64::from(r) / TWO_POW_32 + f64::from(qy);
                        r = lcg(r);
                        let fz = f64::from(r) / TWO_POW_32 + f64::from(qz);
                        insert_sorted(&mut slots, self.metric.distance(x - fx, y - fy, z - fz));
                    }
                }
            }
        }

        self.combiner.combine(&slots).clamp(0.0, 1.0)
    }
}
