use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock};

use planet_geom::DVec3;
use planet_mesh_cpu::{PatchCorners, PatchMesh, build_patch_mesh};
use planet_runtime::Task;

use crate::ticket::{SplitState, SplitTicket};
use crate::{LayerIntegrator, PatchCreated, PatchId, PatchSharedData};

pub(crate) type MeshSlot = Arc<OnceLock<Arc<PatchMesh>>>;

pub(crate) struct ChildJob {
    pub id: PatchId,
    pub level: u32,
    pub corners: PatchCorners,
    pub position: DVec3,
    pub slot: MeshSlot,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SplitOutcome {
    Applied,
    /// Cancelled, already completed elsewhere, or orphaned by an unannounced parent.
    Skipped,
    Failed(String),
}

/// Builds the four child meshes of one split and announces them.
///
/// Never changes tree shape: it only fills the children's write-once mesh
/// slots and emits integrator events, and only while its ticket is pending.
pub struct SplitTask {
    pub(crate) ticket: Arc<SplitTicket>,
    pub(crate) parent: PatchId,
    pub(crate) parent_origin: Option<Arc<SplitTicket>>,
    pub(crate) children: [ChildJob; 4],
    pub(crate) radius: f64,
    pub(crate) skirt_depth: f64,
    pub(crate) shared: Arc<PatchSharedData>,
    pub(crate) integrator: Arc<dyn LayerIntegrator>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("displacement panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("displacement panicked: {s}")
    } else {
        "displacement panicked".to_string()
    }
}

impl SplitTask {
    fn build_meshes(&self) -> Result<Vec<PatchMesh>, String> {
        let displace = |p: DVec3| self.shared.displace(p);
        self.children
            .iter()
            .map(|c| {
                build_patch_mesh(&c.corners, self.radius, self.skirt_depth, &displace)
                    .map_err(|e| e.to_string())
            })
            .collect()
    }

    fn fail(&self, message: String) -> SplitOutcome {
        if self.ticket.fail(message.clone()) {
            log::error!("split of {} failed: {message}", self.parent);
            SplitOutcome::Failed(message)
        } else {
            SplitOutcome::Skipped
        }
    }

    /// Runs the split to completion on the calling thread.
    pub(crate) fn complete(self) -> SplitOutcome {
        if !self.ticket.is_pending() {
            return SplitOutcome::Skipped;
        }
        let meshes = match catch_unwind(AssertUnwindSafe(|| self.build_meshes())) {
            Ok(Ok(meshes)) => meshes,
            Ok(Err(message)) => return self.fail(message),
            Err(payload) => return self.fail(panic_message(payload.as_ref())),
        };

        let mut state = self.ticket.lock();
        if *state != SplitState::Pending {
            log::debug!("split of {} abandoned before apply", self.parent);
            return SplitOutcome::Skipped;
        }
        let parent_announced = self
            .parent_origin
            .as_ref()
            .is_none_or(|origin| origin.is_applied());
        if !parent_announced {
            log::debug!("split of {} orphaned, parent never announced", self.parent);
            *state = SplitState::Cancelled;
            return SplitOutcome::Skipped;
        }

        for (child, mesh) in self.children.iter().zip(meshes) {
            let mesh = Arc::new(mesh);
            let _ = child.slot.set(Arc::clone(&mesh));
            self.integrator.create_patch(PatchCreated {
                id: child.id,
                level: child.level,
                position: child.position,
                mesh,
            });
        }
        self.integrator.remove_patch(self.parent);
        *state = SplitState::Applied;
        log::debug!("split of {} applied", self.parent);
        SplitOutcome::Applied
    }
}

impl Task for SplitTask {
    fn execute(self) {
        // Failures are recorded on the ticket and surfaced by the tree walk.
        let _ = self.complete();
    }
}
