use planet_geom::DVec3;
use planet_runtime::MeshQueue;

use crate::{DisplacementFn, DrainStats, PlanetLayer, SplitTask, SurfaceConfig, SurfaceError};

/// A planet at a world position with any number of surface layers sharing one
/// mesh worker.
pub struct Planet {
    position: DVec3,
    queue: MeshQueue<SplitTask>,
    layers: Vec<PlanetLayer>,
}

impl Planet {
    pub fn new(position: DVec3, queue: MeshQueue<SplitTask>) -> Self {
        Self {
            position,
            queue,
            layers: Vec::new(),
        }
    }

    pub fn add_layer(
        &mut self,
        config: SurfaceConfig,
        displacement: DisplacementFn,
    ) -> Result<&mut PlanetLayer, SurfaceError> {
        let layer = PlanetLayer::new(config, displacement, self.queue.clone())?;
        self.layers.push(layer);
        let idx = self.layers.len() - 1;
        Ok(&mut self.layers[idx])
    }

    /// Runs every layer with `camera` given in world space. Stops at the
    /// first layer that fails.
    pub fn update(&mut self, camera: DVec3) -> Result<DrainStats, SurfaceError> {
        let local = camera - self.position;
        let mut total = DrainStats::default();
        for layer in &mut self.layers {
            total.accumulate(layer.update(local)?);
        }
        Ok(total)
    }

    /// Like [`update`](Self::update) with every split completed on the
    /// calling thread.
    pub fn force_update(&mut self, camera: DVec3) -> Result<DrainStats, SurfaceError> {
        let local = camera - self.position;
        let mut total = DrainStats::default();
        for layer in &mut self.layers {
            total.accumulate(layer.force_update(local)?);
        }
        Ok(total)
    }

    /// Applies pending integrator work on every layer without a LOD pass.
    pub fn drain(&mut self) -> DrainStats {
        let mut total = DrainStats::default();
        for layer in &mut self.layers {
            total.accumulate(layer.drain());
        }
        total
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn layers(&self) -> &[PlanetLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [PlanetLayer] {
        &mut self.layers
    }

    pub fn queue(&self) -> &MeshQueue<SplitTask> {
        &self.queue
    }
}
