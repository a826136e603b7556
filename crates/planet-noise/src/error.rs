use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("octave wrappers need at least one octave")]
    ZeroOctaves,
    #[error("invalid {name}: {value} (must be finite and positive)")]
    InvalidParameter { name: &'static str, value: f64 },
}
