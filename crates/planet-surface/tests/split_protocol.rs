mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use common::*;
use planet_geom::DVec3;
use planet_surface::{DisplacementFn, PatchId, SplitState, SurfaceError};

/// Displacement that blocks while `gate` is set.
fn gated(gate: &Arc<AtomicBool>) -> DisplacementFn {
    let gate = Arc::clone(gate);
    Arc::new(move |_| {
        while gate.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
        }
        0.0
    })
}

fn root_ids(layer: &planet_surface::PlanetLayer) -> HashSet<PatchId> {
    layer.mesh().roots().iter().map(|r| r.id()).collect()
}

#[test]
fn merging_before_a_pending_split_runs_announces_nothing() {
    let gate = Arc::new(AtomicBool::new(false));
    let (mut layer, queue) = layer_with(gated(&gate));
    let roots = root_ids(&layer);

    gate.store(true, Ordering::Release);
    let near = DVec3::new(0.0, RADIUS, 0.0);
    assert!(!layer.mesh_mut().check_and_subdivide(near).unwrap());
    assert_eq!(layer.mesh().stats().pending_splits, 6);

    let far = DVec3::new(0.0, 1.0e6, 0.0);
    assert!(layer.mesh_mut().check_and_subdivide(far).unwrap());
    assert!(layer.mesh().roots().iter().all(|r| r.is_leaf()));

    gate.store(false, Ordering::Release);
    assert!(queue.wait_idle(WAIT));
    let stats = layer.drain();
    assert!(stats.is_empty(), "{stats:?}");

    let reg = layer.integrator().registry();
    let global: HashSet<PatchId> = reg.global().keys().copied().collect();
    let active: HashSet<PatchId> = reg.active().iter().copied().collect();
    assert_eq!(global, roots);
    assert_eq!(active, roots);
}

#[test]
fn forcing_claims_a_queued_split() {
    let gate = Arc::new(AtomicBool::new(false));
    let (mut layer, queue) = layer_with(gated(&gate));
    let camera = face_center(&layer, 0);

    gate.store(true, Ordering::Release);
    layer.mesh_mut().check_and_subdivide(camera).unwrap();
    gate.store(false, Ordering::Release);
    // The worker may or may not have picked up the first task yet; either way
    // each split is applied exactly once.
    layer.force_update(camera).unwrap();
    assert!(queue.wait_idle(WAIT));
    layer.drain();

    assert_eq!(max_level(&layer, 0), 6);
    assert_eq!(layer.mesh().stats().pending_splits, 0);
    assert_consistent(&layer);
}

#[test]
fn non_finite_displacement_surfaces_as_mesh_generation_error() {
    let broken = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&broken);
    let (mut layer, queue) = layer_with(Arc::new(move |_| {
        if flag.load(Ordering::Acquire) { f64::NAN } else { 0.0 }
    }));
    let roots = root_ids(&layer);
    broken.store(true, Ordering::Release);

    let near = DVec3::new(0.0, RADIUS, 0.0);
    assert!(!layer.mesh_mut().check_and_subdivide(near).unwrap());
    assert!(queue.wait_idle(WAIT));
    for root in layer.mesh().roots() {
        assert!(matches!(root.split_state(), Some(SplitState::Failed(_))));
    }

    let err = layer.mesh_mut().check_and_subdivide(near).unwrap_err();
    assert!(
        matches!(err, SurfaceError::MeshGeneration { level: 0, .. }),
        "{err}"
    );
    assert!(layer.mesh().roots().iter().all(|r| r.is_leaf()));
    assert!(layer.drain().is_empty());
    let active: HashSet<PatchId> = layer.integrator().registry().active().iter().copied().collect();
    assert_eq!(active, roots);

    // Not retried.
    assert!(!layer.mesh_mut().check_and_subdivide(near).unwrap());
    assert_eq!(layer.mesh().stats().nodes, 6);
    assert_eq!(queue.pending(), 0);
}

#[test]
fn panicking_displacement_is_contained() {
    let broken = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&broken);
    let (mut layer, queue) = layer_with(Arc::new(move |_| {
        if flag.load(Ordering::Acquire) {
            panic!("height field exploded");
        }
        0.0
    }));
    broken.store(true, Ordering::Release);

    let camera = face_center(&layer, 0);
    layer.update(camera).unwrap();
    assert!(queue.wait_idle(WAIT));
    match layer.update(camera) {
        Err(SurfaceError::MeshGeneration { message, .. }) => {
            assert!(message.contains("height field exploded"), "{message}");
        }
        other => panic!("expected mesh generation error, got {other:?}"),
    }
    assert!(layer.mesh().roots().iter().all(|r| r.is_leaf()));

    // The worker survived and still runs new work.
    broken.store(false, Ordering::Release);
    layer.mesh_mut().regenerate().unwrap();
    settle(&mut layer, &queue, camera).unwrap();
    assert_eq!(max_level(&layer, 0), 6);
}

#[test]
fn forced_failure_is_reported_and_collapsed() {
    let broken = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&broken);
    let (mut layer, _queue) = layer_with(Arc::new(move |_| {
        if flag.load(Ordering::Acquire) { f64::INFINITY } else { 0.0 }
    }));
    broken.store(true, Ordering::Release);
    let camera = face_center(&layer, 2);
    let err = layer.force_update(camera).unwrap_err();
    assert!(matches!(err, SurfaceError::MeshGeneration { .. }));
    assert_eq!(layer.mesh().stats().nodes, 6);
}
