//! Quadtree node of the cube-sphere surface.

use std::sync::{Arc, OnceLock};

use planet_geom::DVec3;
use planet_mesh_cpu::{PatchCorners, PatchMesh, build_patch_mesh};
use planet_runtime::MeshQueue;

use crate::task::{ChildJob, MeshSlot, SplitOutcome, SplitTask};
use crate::ticket::{SplitState, SplitTicket};
use crate::{LayerIntegrator, PatchCreated, PatchId, PatchSharedData, SurfaceError};

/// What a tree walk needs besides the node itself.
pub(crate) struct WalkCtx<'a> {
    pub shared: &'a Arc<PatchSharedData>,
    pub integrator: &'a Arc<dyn LayerIntegrator>,
    pub queue: &'a MeshQueue<SplitTask>,
}

struct Split {
    ticket: Arc<SplitTicket>,
    children: Box<[Patch; 4]>,
}

pub struct Patch {
    id: PatchId,
    corners: PatchCorners,
    radius: f64,
    skirt_depth: f64,
    level: u32,
    side_length: f64,
    position: DVec3,
    mesh: MeshSlot,
    /// Ticket of the split that created this node; `None` for roots.
    origin: Option<Arc<SplitTicket>>,
    split: Option<Split>,
    split_failed: bool,
}

impl Patch {
    fn new(
        id: PatchId,
        corners: PatchCorners,
        radius: f64,
        skirt_depth: f64,
        level: u32,
        side_length: f64,
        origin: Option<Arc<SplitTicket>>,
    ) -> Self {
        Self {
            id,
            corners,
            radius,
            skirt_depth,
            level,
            side_length,
            position: corners.surface_center(radius),
            mesh: Arc::new(OnceLock::new()),
            origin,
            split: None,
            split_failed: false,
        }
    }

    /// Builds a root patch with its mesh generated on the calling thread.
    /// Nothing is announced until [`announce`](Self::announce).
    pub(crate) fn new_root(
        corners: PatchCorners,
        radius: f64,
        skirt_depth: f64,
        side_length: f64,
        shared: &PatchSharedData,
    ) -> Result<Self, SurfaceError> {
        let patch = Self::new(
            shared.allocate_id(),
            corners,
            radius,
            skirt_depth,
            0,
            side_length,
            None,
        );
        let mesh = Arc::new(patch.generate_mesh(shared)?);
        let _ = patch.mesh.set(mesh);
        Ok(patch)
    }

    /// Sends this patch's mesh to the collaborator. No-op without a mesh.
    pub(crate) fn announce(&self, integrator: &dyn LayerIntegrator) {
        if let Some(mesh) = self.mesh.get() {
            integrator.create_patch(PatchCreated {
                id: self.id,
                level: self.level,
                position: self.position,
                mesh: Arc::clone(mesh),
            });
        }
    }

    pub fn generate_mesh(&self, shared: &PatchSharedData) -> Result<PatchMesh, SurfaceError> {
        let displace = |p: DVec3| shared.displace(p);
        Ok(build_patch_mesh(
            &self.corners,
            self.radius,
            self.skirt_depth,
            &displace,
        )?)
    }

    pub fn id(&self) -> PatchId {
        self.id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn side_length(&self) -> f64 {
        self.side_length
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn corners(&self) -> &PatchCorners {
        &self.corners
    }

    pub fn mesh(&self) -> Option<&Arc<PatchMesh>> {
        self.mesh.get()
    }

    pub fn children(&self) -> Option<&[Patch; 4]> {
        self.split.as_ref().map(|s| &*s.children)
    }

    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }

    pub fn split_state(&self) -> Option<SplitState> {
        self.split.as_ref().map(|s| s.ticket.state())
    }

    /// Whether the render collaborator has been told this patch exists.
    pub fn is_announced(&self) -> bool {
        self.origin.as_ref().is_none_or(|t| t.is_applied())
    }

    /// Pre-order traversal.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Patch)) {
        f(self);
        if let Some(split) = &self.split {
            for child in split.children.iter() {
                child.visit(f);
            }
        }
    }

    fn split(&mut self, ctx: &WalkCtx<'_>) -> SplitTask {
        let ticket = SplitTicket::new();
        let children = self.corners.quarter().map(|corners| {
            Patch::new(
                ctx.shared.allocate_id(),
                corners,
                self.radius,
                self.skirt_depth,
                self.level + 1,
                self.side_length * 0.5,
                Some(Arc::clone(&ticket)),
            )
        });
        let task = self.task(&ticket, &children, ctx);
        self.split = Some(Split {
            ticket,
            children: Box::new(children),
        });
        log::debug!("{} split at level {}", self.id, self.level);
        task
    }

    /// The task completing a split of this node into `children`.
    fn task(
        &self,
        ticket: &Arc<SplitTicket>,
        children: &[Patch; 4],
        ctx: &WalkCtx<'_>,
    ) -> SplitTask {
        let job = |c: &Patch| ChildJob {
            id: c.id,
            level: c.level,
            corners: c.corners,
            position: c.position,
            slot: Arc::clone(&c.mesh),
        };
        let [nw, ne, sw, se] = children;
        SplitTask {
            ticket: Arc::clone(ticket),
            parent: self.id,
            parent_origin: self.origin.clone(),
            children: [job(nw), job(ne), job(sw), job(se)],
            radius: self.radius,
            skirt_depth: self.skirt_depth,
            shared: Arc::clone(ctx.shared),
            integrator: Arc::clone(ctx.integrator),
        }
    }

    fn generation_error(&self, message: String) -> SurfaceError {
        SurfaceError::MeshGeneration {
            level: self.level,
            message,
        }
    }

    /// Drops children that were never announced and makes this a leaf again.
    /// A failed split is recorded so the node is not split again.
    fn collapse(&mut self, integrator: &dyn LayerIntegrator) -> Option<SurfaceError> {
        let split = self.split.take()?;
        let prior = split.ticket.cancel();
        for child in *split.children {
            child.dispose(integrator, false);
        }
        match prior {
            SplitState::Failed(message) => {
                self.split_failed = true;
                Some(self.generation_error(message))
            }
            _ => None,
        }
    }

    /// Collapses the children back into this node.
    fn merge(&mut self, integrator: &dyn LayerIntegrator) -> Result<(), SurfaceError> {
        let Some(split) = self.split.take() else {
            return Ok(());
        };
        match split.ticket.cancel() {
            SplitState::Applied => {
                integrator.add_patch(self.id);
                for child in *split.children {
                    child.dispose(integrator, true);
                }
                log::debug!("{} merged at level {}", self.id, self.level);
                Ok(())
            }
            prior => {
                for child in *split.children {
                    child.dispose(integrator, false);
                }
                log::debug!("{} cancelled its pending split", self.id);
                match prior {
                    SplitState::Failed(message) => {
                        self.split_failed = true;
                        Err(self.generation_error(message))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// Tears down this subtree. Only announced patches produce destroy events.
    pub(crate) fn dispose(mut self, integrator: &dyn LayerIntegrator, announced: bool) {
        if let Some(split) = self.split.take() {
            let children_announced = split.ticket.cancel() == SplitState::Applied;
            for child in *split.children {
                child.dispose(integrator, children_announced);
            }
        }
        if announced {
            integrator.delete_patch(self.id);
        }
    }

    /// Resolves a split that ended without being applied. `None` when the
    /// split is still live.
    fn settle_split(
        &mut self,
        integrator: &dyn LayerIntegrator,
    ) -> Option<Result<bool, SurfaceError>> {
        match self.split_state()? {
            SplitState::Failed(_) | SplitState::Cancelled => {
                Some(self.collapse(integrator).map_or(Ok(false), Err))
            }
            SplitState::Pending | SplitState::Applied => None,
        }
    }

    /// One LOD step. Returns `true` if a merge happened in this subtree; splits
    /// are asynchronous and become visible once the worker applies them.
    pub(crate) fn check_and_subdivide(
        &mut self,
        camera: DVec3,
        ctx: &WalkCtx<'_>,
    ) -> Result<bool, SurfaceError> {
        let policy = *ctx.shared.policy();
        if self.split.is_none() {
            if !self.split_failed
                && policy.should_subdivide(self.side_length, self.position, camera)
            {
                let task = self.split(ctx);
                ctx.queue.enqueue(task);
            }
            return Ok(false);
        }
        if let Some(settled) = self.settle_split(ctx.integrator.as_ref()) {
            return settled;
        }
        if policy.should_merge(self.side_length, self.position, camera) {
            return self.merge(ctx.integrator.as_ref()).map(|()| true);
        }

        let mut changed = false;
        let mut first_err = None;
        if let Some(split) = self.split.as_mut() {
            for child in split.children.iter_mut() {
                match child.check_and_subdivide(camera, ctx) {
                    Ok(c) => changed |= c,
                    Err(e) => {
                        first_err.get_or_insert(e);
                    }
                }
            }
        }
        first_err.map_or(Ok(changed), Err)
    }

    /// Like [`check_and_subdivide`](Self::check_and_subdivide) but every split
    /// completes on the calling thread before descending into the children.
    pub(crate) fn force_subdivide(
        &mut self,
        camera: DVec3,
        ctx: &WalkCtx<'_>,
    ) -> Result<(), SurfaceError> {
        let policy = *ctx.shared.policy();
        if self.split.is_none() {
            if self.split_failed
                || !policy.should_subdivide(self.side_length, self.position, camera)
            {
                return Ok(());
            }
            let _ = self.split(ctx).complete();
        } else {
            if let Some(settled) = self.settle_split(ctx.integrator.as_ref()) {
                return settled.map(|_| ());
            }
            if policy.should_merge(self.side_length, self.position, camera) {
                return self.merge(ctx.integrator.as_ref());
            }
            // Claim a split still waiting in the queue; the queued copy becomes a no-op.
            if let Some(split) = self.split.as_ref().filter(|s| s.ticket.is_pending()) {
                let task = self.task(&split.ticket, &split.children, ctx);
                if task.complete() == SplitOutcome::Skipped {
                    log::debug!("{} split resolved elsewhere while forcing", self.id);
                }
            }
        }
        if let Some(settled) = self.settle_split(ctx.integrator.as_ref()) {
            return settled.map(|_| ());
        }

        let mut first_err = None;
        if let Some(split) = self.split.as_mut() {
            for child in split.children.iter_mut() {
                if let Err(e) = child.force_subdivide(camera, ctx) {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
