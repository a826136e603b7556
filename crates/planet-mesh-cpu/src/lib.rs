//! CPU patch meshing: fixed-layout cube-sphere patch meshes (engine-only).
#![forbid(unsafe_code)]

mod build;
pub mod constants;
mod corners;
mod error;
mod indices;
mod mesh;

pub use build::build_patch_mesh;
pub use constants::{NUM_INDICES, NUM_VERTICES, SIDE_CELLS, SIDE_LEN};
pub use corners::PatchCorners;
pub use error::MeshError;
pub use indices::patch_indices;
pub use mesh::PatchMesh;
