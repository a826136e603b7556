use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use planet_geom::DVec3;
use planet_noise::NoiseNode;

use crate::LodPolicy;

/// Height offset at a point on the undisplaced sphere. Must be pure and cheap;
/// it is called once per grid vertex from the mesh worker.
pub type DisplacementFn = Arc<dyn Fn(DVec3) -> f64 + Send + Sync>;

/// Non-owning handle a patch is known by in the render collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(pub u64);

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patch#{}", self.0)
    }
}

/// Per-layer data every patch of one subdivision mesh refers to.
pub struct PatchSharedData {
    displacement: DisplacementFn,
    policy: LodPolicy,
    next_id: AtomicU64,
}

impl PatchSharedData {
    pub fn new(displacement: DisplacementFn, policy: LodPolicy) -> Self {
        Self {
            displacement,
            policy,
            next_id: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn displace(&self, p: DVec3) -> f64 {
        (self.displacement)(p)
    }

    pub fn policy(&self) -> &LodPolicy {
        &self.policy
    }

    pub(crate) fn allocate_id(&self) -> PatchId {
        PatchId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Height field `noise(p) * max_displacement`, sampled at the surface point.
pub fn noise_displacement(node: NoiseNode, max_displacement: f64) -> DisplacementFn {
    Arc::new(move |p| node.sample(p) * max_displacement)
}

pub fn flat_displacement() -> DisplacementFn {
    Arc::new(|_| 0.0)
}
