//! The six-root cube-sphere and its LOD entry points.

use std::sync::Arc;

use planet_geom::DVec3;
use planet_mesh_cpu::PatchCorners;
use planet_runtime::MeshQueue;

use crate::patch::WalkCtx;
use crate::ticket::SplitState;
use crate::{
    DisplacementFn, LayerIntegrator, LodPolicy, Patch, PatchSharedData, SplitTask, SurfaceError,
};

/// Geometry and LOD parameters of one subdivision mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    pub radius: f64,
    pub skirt_depth: f64,
    pub policy: LodPolicy,
}

impl SurfaceConfig {
    pub fn new(radius: f64, skirt_depth: f64) -> Self {
        Self {
            radius,
            skirt_depth,
            policy: LodPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), SurfaceError> {
        validate_radius(self.radius)?;
        validate_skirt_depth(self.skirt_depth)?;
        self.policy.validate()
    }
}

fn validate_radius(radius: f64) -> Result<(), SurfaceError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(SurfaceError::InvalidConfig(format!(
            "radius must be finite and > 0, got {radius}"
        )))
    }
}

fn validate_skirt_depth(skirt_depth: f64) -> Result<(), SurfaceError> {
    if skirt_depth.is_finite() && skirt_depth >= 0.0 {
        Ok(())
    } else {
        Err(SurfaceError::InvalidConfig(format!(
            "skirt_depth must be finite and >= 0, got {skirt_depth}"
        )))
    }
}

/// Cube faces in root order: top, bottom, front, back, right, left.
/// Adjacent faces share their edge corners exactly.
fn root_corners(r: f64) -> [PatchCorners; 6] {
    let v = DVec3::new;
    [
        PatchCorners::new(v(r, r, -r), v(-r, r, -r), v(r, r, r), v(-r, r, r)),
        PatchCorners::new(v(-r, -r, r), v(-r, -r, -r), v(r, -r, r), v(r, -r, -r)),
        PatchCorners::new(v(-r, -r, -r), v(-r, r, -r), v(r, -r, -r), v(r, r, -r)),
        PatchCorners::new(v(r, r, r), v(-r, r, r), v(r, -r, r), v(-r, -r, r)),
        PatchCorners::new(v(-r, r, r), v(-r, r, -r), v(-r, -r, r), v(-r, -r, -r)),
        PatchCorners::new(v(r, -r, -r), v(r, r, -r), v(r, -r, r), v(r, r, r)),
    ]
}

/// Meshes all six roots without announcing any of them.
fn build_roots(
    config: &SurfaceConfig,
    shared: &PatchSharedData,
) -> Result<Vec<Patch>, SurfaceError> {
    let side = 2.0 * config.radius;
    root_corners(config.radius)
        .into_iter()
        .map(|corners| Patch::new_root(corners, config.radius, config.skirt_depth, side, shared))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub pending_splits: usize,
    pub max_level: u32,
}

/// Root of one planet layer: six quadtrees whose meshes go to one integrator.
pub struct SubdivisionMesh {
    config: SurfaceConfig,
    shared: Arc<PatchSharedData>,
    integrator: Arc<dyn LayerIntegrator>,
    queue: MeshQueue<SplitTask>,
    roots: Vec<Patch>,
}

impl SubdivisionMesh {
    pub fn new(
        config: SurfaceConfig,
        displacement: DisplacementFn,
        integrator: Arc<dyn LayerIntegrator>,
        queue: MeshQueue<SplitTask>,
    ) -> Result<Self, SurfaceError> {
        config.validate()?;
        let shared = Arc::new(PatchSharedData::new(displacement, config.policy));
        let roots = build_roots(&config, &shared)?;
        let mut mesh = Self {
            shared,
            config,
            integrator,
            queue,
            roots: Vec::new(),
        };
        mesh.commit(roots);
        Ok(mesh)
    }

    /// Announces `roots` and makes them the live forest.
    fn commit(&mut self, roots: Vec<Patch>) {
        for root in &roots {
            root.announce(self.integrator.as_ref());
        }
        self.roots = roots;
        log::info!(
            "surface generated: radius {} skirt {}",
            self.config.radius,
            self.config.skirt_depth
        );
    }

    /// Rebuilds the six roots for `config`. On failure the current forest and
    /// configuration are left untouched.
    fn rebuild(&mut self, config: SurfaceConfig) -> Result<(), SurfaceError> {
        let roots = build_roots(&config, &self.shared)?;
        self.dispose();
        self.config = config;
        self.commit(roots);
        Ok(())
    }

    fn ctx(&self) -> WalkCtx<'_> {
        WalkCtx {
            shared: &self.shared,
            integrator: &self.integrator,
            queue: &self.queue,
        }
    }

    /// One LOD pass over all six roots. Returns `true` if any subtree merged.
    /// Every root is visited even when one reports an error; the first error
    /// is returned.
    pub fn check_and_subdivide(&mut self, camera: DVec3) -> Result<bool, SurfaceError> {
        let mut roots = std::mem::take(&mut self.roots);
        let ctx = self.ctx();
        let mut changed = false;
        let mut first_err = None;
        for root in roots.iter_mut() {
            match root.check_and_subdivide(camera, &ctx) {
                Ok(c) => changed |= c,
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        self.roots = roots;
        first_err.map_or(Ok(changed), Err)
    }

    /// Subdivides to the policy's target for `camera` synchronously.
    pub fn force_subdivide(&mut self, camera: DVec3) -> Result<(), SurfaceError> {
        let mut roots = std::mem::take(&mut self.roots);
        let ctx = self.ctx();
        let mut first_err = None;
        for root in roots.iter_mut() {
            if let Err(e) = root.force_subdivide(camera, &ctx) {
                first_err.get_or_insert(e);
            }
        }
        self.roots = roots;
        first_err.map_or(Ok(()), Err)
    }

    /// Disposes every patch and rebuilds the six roots. If a root mesh fails
    /// the existing forest is kept.
    pub fn regenerate(&mut self) -> Result<(), SurfaceError> {
        self.rebuild(self.config)
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), SurfaceError> {
        validate_radius(radius)?;
        self.rebuild(SurfaceConfig { radius, ..self.config })
    }

    pub fn set_skirt_depth(&mut self, skirt_depth: f64) -> Result<(), SurfaceError> {
        validate_skirt_depth(skirt_depth)?;
        self.rebuild(SurfaceConfig {
            skirt_depth,
            ..self.config
        })
    }

    /// Tears down all roots. Idempotent.
    pub fn dispose(&mut self) {
        let integrator = Arc::clone(&self.integrator);
        for root in self.roots.drain(..) {
            root.dispose(integrator.as_ref(), true);
        }
    }

    pub fn side(&self, i: usize) -> Option<&Patch> {
        self.roots.get(i)
    }

    pub fn roots(&self) -> &[Patch] {
        &self.roots
    }

    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    pub fn skirt_depth(&self) -> f64 {
        self.config.skirt_depth
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn queue(&self) -> &MeshQueue<SplitTask> {
        &self.queue
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for root in &self.roots {
            root.visit(&mut |p| {
                stats.nodes += 1;
                if p.is_leaf() {
                    stats.leaves += 1;
                }
                if p.split_state() == Some(SplitState::Pending) {
                    stats.pending_splits += 1;
                }
                stats.max_level = stats.max_level.max(p.level());
            });
        }
        stats
    }
}

impl Drop for SubdivisionMesh {
    fn drop(&mut self) {
        self.dispose();
    }
}
