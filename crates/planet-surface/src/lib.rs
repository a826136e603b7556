//! Adaptive cube-sphere terrain: quadtree patches, split/merge policy and the
//! asynchronous split protocol toward a render collaborator (engine-only).
//!
//! The main thread owns the trees and walks them once per frame. Splits create
//! children immediately and hand a [`SplitTask`] to the background
//! [`MeshQueue`](planet_runtime::MeshQueue); the task builds the four child
//! meshes and announces them together with the parent's deactivation. Each
//! split carries a [`SplitTicket`] so a merge that races a queued task either
//! cancels it before anything is announced or sees it applied.
#![forbid(unsafe_code)]

mod error;
mod integrator;
mod layer;
mod patch;
mod planet;
mod policy;
mod shared;
mod subdivision;
mod task;
mod ticket;

pub use error::SurfaceError;
pub use integrator::{
    DrainStats, HeadlessIntegrator, IntegratorQueue, LayerIntegrator, PatchConsumer,
    PatchCreated, PatchRecord, PatchRegistry,
};
pub use layer::PlanetLayer;
pub use patch::Patch;
pub use planet::Planet;
pub use policy::LodPolicy;
pub use shared::{DisplacementFn, PatchId, PatchSharedData, flat_displacement, noise_displacement};
pub use subdivision::{SubdivisionMesh, SurfaceConfig, TreeStats};
pub use task::SplitTask;
pub use ticket::{SplitState, SplitTicket};
