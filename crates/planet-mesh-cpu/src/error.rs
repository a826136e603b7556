use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("displacement function returned {value} at ({x}, {y}, {z})")]
    NonFiniteDisplacement { value: f64, x: f64, y: f64, z: f64 },
    #[error("patch corners are not finite")]
    NonFiniteCorners,
}
