use planet_mesh_cpu::MeshError;
use planet_noise::NoiseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("invalid surface configuration: {0}")]
    InvalidConfig(String),
    /// A background split could not build its meshes. The height field is
    /// broken; the split is not retried.
    #[error("mesh generation failed for patch at level {level}: {message}")]
    MeshGeneration { level: u32, message: String },
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Noise(#[from] NoiseError),
    #[error("failed to start mesh worker: {0}")]
    Worker(#[from] std::io::Error),
}
