//! Render-collaborator boundary: producer trait, four-channel intake and a
//! headless consumer that tracks which patches exist and which are drawn.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::{HashMap, HashSet};
use planet_geom::DVec3;
use planet_mesh_cpu::PatchMesh;

use crate::PatchId;

/// A patch whose mesh is ready to be uploaded.
#[derive(Clone, Debug)]
pub struct PatchCreated {
    pub id: PatchId,
    pub level: u32,
    pub position: DVec3,
    pub mesh: Arc<PatchMesh>,
}

/// Producer side. Called from the main thread and the mesh worker.
pub trait LayerIntegrator: Send + Sync {
    /// Create GPU state for a patch and start drawing it.
    fn create_patch(&self, patch: PatchCreated);
    /// Start drawing an existing patch again.
    fn add_patch(&self, id: PatchId);
    /// Stop drawing a patch but keep its resources.
    fn remove_patch(&self, id: PatchId);
    /// Release a patch.
    fn delete_patch(&self, id: PatchId);
}

/// Consumer side, driven by [`IntegratorQueue::drain`] on the main thread.
pub trait PatchConsumer {
    fn on_patch_created(&mut self, patch: PatchCreated);
    fn on_patch_activated(&mut self, id: PatchId);
    fn on_patch_deactivated(&mut self, id: PatchId);
    fn on_patch_destroyed(&mut self, id: PatchId);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub created: usize,
    pub activated: usize,
    pub deactivated: usize,
    pub destroyed: usize,
}

impl DrainStats {
    pub fn is_empty(&self) -> bool {
        *self == DrainStats::default()
    }

    pub fn accumulate(&mut self, other: DrainStats) {
        self.created += other.created;
        self.activated += other.activated;
        self.deactivated += other.deactivated;
        self.destroyed += other.destroyed;
    }
}

enum Activation {
    Add(PatchId),
    Remove(PatchId),
}

/// Multi-producer intake with one channel per intent.
pub struct IntegratorQueue {
    create_tx: Sender<PatchCreated>,
    create_rx: Receiver<PatchCreated>,
    add_tx: Sender<(u64, PatchId)>,
    add_rx: Receiver<(u64, PatchId)>,
    remove_tx: Sender<(u64, PatchId)>,
    remove_rx: Receiver<(u64, PatchId)>,
    delete_tx: Sender<PatchId>,
    delete_rx: Receiver<PatchId>,
    // Orders add against remove so a split and a merge of the same patch
    // within one drain interval resolve in emission order.
    seq: AtomicU64,
}

impl Default for IntegratorQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegratorQueue {
    pub fn new() -> Self {
        let (create_tx, create_rx) = unbounded();
        let (add_tx, add_rx) = unbounded();
        let (remove_tx, remove_rx) = unbounded();
        let (delete_tx, delete_rx) = unbounded();
        Self {
            create_tx,
            create_rx,
            add_tx,
            add_rx,
            remove_tx,
            remove_rx,
            delete_tx,
            delete_rx,
            seq: AtomicU64::new(0),
        }
    }

    /// Applies everything queued so far: creates, then activations and
    /// deactivations in emission order, then deletes.
    pub fn drain(&self, consumer: &mut impl PatchConsumer) -> DrainStats {
        // The worker only emits creates and removes, always creates first, so
        // collecting creates last never separates a remove from its creates.
        let removes: Vec<_> = self.remove_rx.try_iter().collect();
        let adds: Vec<_> = self.add_rx.try_iter().collect();
        let deletes: Vec<_> = self.delete_rx.try_iter().collect();
        let creates: Vec<_> = self.create_rx.try_iter().collect();

        let mut stats = DrainStats::default();
        for patch in creates {
            consumer.on_patch_created(patch);
            stats.created += 1;
        }

        let mut activations: Vec<(u64, Activation)> = adds
            .into_iter()
            .map(|(seq, id)| (seq, Activation::Add(id)))
            .chain(
                removes
                    .into_iter()
                    .map(|(seq, id)| (seq, Activation::Remove(id))),
            )
            .collect();
        activations.sort_by_key(|(seq, _)| *seq);
        for (_, activation) in activations {
            match activation {
                Activation::Add(id) => {
                    consumer.on_patch_activated(id);
                    stats.activated += 1;
                }
                Activation::Remove(id) => {
                    consumer.on_patch_deactivated(id);
                    stats.deactivated += 1;
                }
            }
        }

        for id in deletes {
            consumer.on_patch_destroyed(id);
            stats.destroyed += 1;
        }
        stats
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::AcqRel)
    }
}

impl LayerIntegrator for IntegratorQueue {
    fn create_patch(&self, patch: PatchCreated) {
        let _ = self.create_tx.send(patch);
    }

    fn add_patch(&self, id: PatchId) {
        let _ = self.add_tx.send((self.next_seq(), id));
    }

    fn remove_patch(&self, id: PatchId) {
        let _ = self.remove_tx.send((self.next_seq(), id));
    }

    fn delete_patch(&self, id: PatchId) {
        let _ = self.delete_tx.send(id);
    }
}

#[derive(Clone, Debug)]
pub struct PatchRecord {
    pub level: u32,
    pub position: DVec3,
    pub mesh: Arc<PatchMesh>,
}

/// Every created patch (`global`) and the subset currently drawn (`active`).
#[derive(Default)]
pub struct PatchRegistry {
    global: HashMap<PatchId, PatchRecord>,
    active: HashSet<PatchId>,
}

impl PatchRegistry {
    pub fn global(&self) -> &HashMap<PatchId, PatchRecord> {
        &self.global
    }

    pub fn active(&self) -> &HashSet<PatchId> {
        &self.active
    }

    pub fn is_active(&self, id: PatchId) -> bool {
        self.active.contains(&id)
    }

    pub fn record(&self, id: PatchId) -> Option<&PatchRecord> {
        self.global.get(&id)
    }
}

impl PatchConsumer for PatchRegistry {
    fn on_patch_created(&mut self, patch: PatchCreated) {
        let PatchCreated {
            id,
            level,
            position,
            mesh,
        } = patch;
        if self
            .global
            .insert(
                id,
                PatchRecord {
                    level,
                    position,
                    mesh,
                },
            )
            .is_some()
        {
            log::warn!("{id} created twice");
        }
        self.active.insert(id);
    }

    fn on_patch_activated(&mut self, id: PatchId) {
        if self.global.contains_key(&id) {
            self.active.insert(id);
        } else {
            log::warn!("activate for unknown {id}");
        }
    }

    fn on_patch_deactivated(&mut self, id: PatchId) {
        if !self.global.contains_key(&id) {
            log::warn!("deactivate for unknown {id}");
        }
        self.active.remove(&id);
    }

    fn on_patch_destroyed(&mut self, id: PatchId) {
        if self.global.remove(&id).is_none() {
            log::warn!("destroy for unknown {id}");
        }
        self.active.remove(&id);
    }
}

/// Intake queue plus [`PatchRegistry`]: the render collaborator without a GPU.
pub struct HeadlessIntegrator {
    queue: Arc<IntegratorQueue>,
    registry: PatchRegistry,
}

impl Default for HeadlessIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessIntegrator {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(IntegratorQueue::new()),
            registry: PatchRegistry::default(),
        }
    }

    /// Producer handle to give to a subdivision mesh.
    pub fn handle(&self) -> Arc<dyn LayerIntegrator> {
        self.queue.clone()
    }

    /// Once per frame, on the main thread.
    pub fn update(&mut self) -> DrainStats {
        self.queue.drain(&mut self.registry)
    }

    pub fn registry(&self) -> &PatchRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_mesh_cpu::{PatchCorners, build_patch_mesh};

    fn created(id: u64) -> PatchCreated {
        let r = 10.0;
        let corners = PatchCorners::new(
            DVec3::new(r, r, -r),
            DVec3::new(-r, r, -r),
            DVec3::new(r, r, r),
            DVec3::new(-r, r, r),
        );
        let mesh = build_patch_mesh(&corners, r, 1.0, &|_| 0.0).unwrap();
        PatchCreated {
            id: PatchId(id),
            level: 0,
            position: corners.surface_center(r),
            mesh: Arc::new(mesh),
        }
    }

    #[test]
    fn create_then_deactivate_then_destroy() {
        let mut h = HeadlessIntegrator::new();
        let tx = h.handle();
        tx.create_patch(created(1));
        tx.create_patch(created(2));
        tx.remove_patch(PatchId(1));
        let stats = h.update();
        assert_eq!(
            stats,
            DrainStats {
                created: 2,
                activated: 0,
                deactivated: 1,
                destroyed: 0
            }
        );
        assert!(!h.registry().is_active(PatchId(1)));
        assert!(h.registry().is_active(PatchId(2)));

        tx.delete_patch(PatchId(2));
        h.update();
        assert!(h.registry().record(PatchId(2)).is_none());
        assert_eq!(h.registry().global().len(), 1);
    }

    #[test]
    fn activation_follows_emission_order() {
        let mut h = HeadlessIntegrator::new();
        let tx = h.handle();
        tx.create_patch(created(7));
        h.update();

        tx.remove_patch(PatchId(7));
        tx.add_patch(PatchId(7));
        h.update();
        assert!(h.registry().is_active(PatchId(7)));

        tx.add_patch(PatchId(7));
        tx.remove_patch(PatchId(7));
        h.update();
        assert!(!h.registry().is_active(PatchId(7)));
    }

    #[test]
    fn deletes_apply_after_creates() {
        let mut h = HeadlessIntegrator::new();
        let tx = h.handle();
        tx.delete_patch(PatchId(3));
        tx.create_patch(created(3));
        let stats = h.update();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.destroyed, 1);
        assert!(h.registry().global().is_empty());
        assert!(h.registry().active().is_empty());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut h = HeadlessIntegrator::new();
        let tx = h.handle();
        tx.add_patch(PatchId(99));
        tx.remove_patch(PatchId(98));
        tx.delete_patch(PatchId(97));
        let stats = h.update();
        assert_eq!(stats.activated, 1);
        assert!(h.registry().active().is_empty());
        assert!(h.update().is_empty());
    }
}
