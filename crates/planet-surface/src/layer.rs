use planet_geom::DVec3;
use planet_runtime::MeshQueue;

use crate::{
    DisplacementFn, DrainStats, HeadlessIntegrator, SplitTask, SubdivisionMesh, SurfaceConfig,
    SurfaceError,
};

/// One subdivision mesh and the collaborator it reports to.
pub struct PlanetLayer {
    mesh: SubdivisionMesh,
    integrator: HeadlessIntegrator,
}

impl PlanetLayer {
    pub fn new(
        config: SurfaceConfig,
        displacement: DisplacementFn,
        queue: MeshQueue<SplitTask>,
    ) -> Result<Self, SurfaceError> {
        let mut integrator = HeadlessIntegrator::new();
        let mesh = SubdivisionMesh::new(config, displacement, integrator.handle(), queue)?;
        integrator.update();
        Ok(Self { mesh, integrator })
    }

    /// Per-frame step: LOD pass, then apply whatever the worker finished.
    /// `camera` is relative to the planet center.
    pub fn update(&mut self, camera: DVec3) -> Result<DrainStats, SurfaceError> {
        let lod = self.mesh.check_and_subdivide(camera);
        let stats = self.integrator.update();
        lod.map(|_| stats)
    }

    /// Like [`update`](Self::update) with all splits completed synchronously.
    pub fn force_update(&mut self, camera: DVec3) -> Result<DrainStats, SurfaceError> {
        let lod = self.mesh.force_subdivide(camera);
        let stats = self.integrator.update();
        lod.map(|_| stats)
    }

    pub fn drain(&mut self) -> DrainStats {
        self.integrator.update()
    }

    pub fn mesh(&self) -> &SubdivisionMesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut SubdivisionMesh {
        &mut self.mesh
    }

    pub fn integrator(&self) -> &HeadlessIntegrator {
        &self.integrator
    }
}
