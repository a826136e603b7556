#![allow(dead_code)]

use std::collections::HashSet;
use std::time::Duration;

use planet_geom::DVec3;
use planet_runtime::MeshQueue;
use planet_surface::{
    DisplacementFn, PatchId, PlanetLayer, SplitState, SplitTask, SurfaceConfig, SurfaceError,
    flat_displacement,
};

pub const RADIUS: f64 = 1000.0;
pub const SKIRT: f64 = 10.0;
pub const WAIT: Duration = Duration::from_secs(30);

pub fn layer_with(displacement: DisplacementFn) -> (PlanetLayer, MeshQueue<SplitTask>) {
    let queue = MeshQueue::start().unwrap();
    let layer =
        PlanetLayer::new(SurfaceConfig::new(RADIUS, SKIRT), displacement, queue.clone()).unwrap();
    (layer, queue)
}

pub fn flat_layer() -> (PlanetLayer, MeshQueue<SplitTask>) {
    layer_with(flat_displacement())
}

/// Center of face `i` on the sphere.
pub fn face_center(layer: &PlanetLayer, i: usize) -> DVec3 {
    layer.mesh().side(i).unwrap().position()
}

/// Pre-order shape of the whole forest.
pub fn fingerprint(layer: &PlanetLayer) -> Vec<(PatchId, u32, bool)> {
    let mut out = Vec::new();
    for root in layer.mesh().roots() {
        root.visit(&mut |p| out.push((p.id(), p.level(), p.is_leaf())));
    }
    out
}

pub fn max_level(layer: &PlanetLayer, face: usize) -> u32 {
    let mut max = 0;
    layer
        .mesh()
        .side(face)
        .unwrap()
        .visit(&mut |p| max = max.max(p.level()));
    max
}

/// Repeats LOD passes until the tree stops changing.
pub fn settle(
    layer: &mut PlanetLayer,
    queue: &MeshQueue<SplitTask>,
    camera: DVec3,
) -> Result<(), SurfaceError> {
    let mut prev = Vec::new();
    for _ in 0..64 {
        layer.update(camera)?;
        assert!(queue.wait_idle(WAIT));
        layer.drain();
        let now = fingerprint(layer);
        if now == prev && layer.mesh().stats().pending_splits == 0 {
            return Ok(());
        }
        prev = now;
    }
    panic!("tree did not settle");
}

/// With the worker idle and the integrator drained, the collaborator knows
/// exactly the announced patches and draws exactly the announced ones that
/// have not been replaced by their children.
pub fn assert_consistent(layer: &PlanetLayer) {
    let mut announced = HashSet::new();
    let mut visible = HashSet::new();
    for root in layer.mesh().roots() {
        root.visit(&mut |p| {
            let kids = p.children().map_or(0, |c| c.len());
            assert!(kids == 0 || kids == 4);
            if p.is_announced() {
                assert!(p.mesh().is_some(), "announced {} without mesh", p.id());
                announced.insert(p.id());
                if p.split_state() != Some(SplitState::Applied) {
                    visible.insert(p.id());
                }
            }
        });
    }
    let reg = layer.integrator().registry();
    let global: HashSet<PatchId> = reg.global().keys().copied().collect();
    let active: HashSet<PatchId> = reg.active().iter().copied().collect();
    assert_eq!(global, announced);
    assert_eq!(active, visible);
}
