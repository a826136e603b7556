//! Composable procedural noise for terrain height fields (engine-only).
//!
//! A height field is a tree of [`NoiseNode`]s evaluated as a pure function
//! `f(x, y, z) -> f64`. Trees are immutable once built and `Send + Sync`, so
//! one tree can be sampled from the mesh worker and the main thread at once.
#![forbid(unsafe_code)]

mod error;
pub mod fractal;
pub mod perlin;
pub mod presets;
pub mod spec;
pub mod worley;

use std::fmt;
use std::sync::Arc;

use planet_geom::DVec3;

pub use error::NoiseError;
pub use fractal::Octaves;
pub use spec::{NoiseSpec, OctaveSpec, PresetName};
pub use worley::{Combiner, DistanceMetric, Worley};

/// Caller-supplied leaf function.
pub type NoiseFn = Arc<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>;

#[derive(Clone)]
pub enum NoiseNode {
    Constant(f64),
    Function(NoiseFn),
    Perlin,
    Worley(Worley),
    Abs(Box<NoiseNode>),
    Sin(Box<NoiseNode>),
    Cos(Box<NoiseNode>),
    Tan(Box<NoiseNode>),
    Add(Box<NoiseNode>, Box<NoiseNode>),
    Subtract(Box<NoiseNode>, Box<NoiseNode>),
    Multiply(Box<NoiseNode>, Box<NoiseNode>),
    Divide(Box<NoiseNode>, Box<NoiseNode>),
    Pow(Box<NoiseNode>, Box<NoiseNode>),
    /// Samples `source` at the input scaled by the value of `scale` there.
    ScaleCoords {
        source: Box<NoiseNode>,
        scale: Box<NoiseNode>,
    },
    Fractal(Box<NoiseNode>, Octaves),
    Billow(Box<NoiseNode>, Octaves),
    Ridged(Box<NoiseNode>, Octaves),
}

impl NoiseNode {
    pub fn function(f: impl Fn(f64, f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        NoiseNode::Function(Arc::new(f))
    }

    pub fn abs(source: NoiseNode) -> Self {
        NoiseNode::Abs(Box::new(source))
    }

    pub fn sin(source: NoiseNode) -> Self {
        NoiseNode::Sin(Box::new(source))
    }

    pub fn cos(source: NoiseNode) -> Self {
        NoiseNode::Cos(Box::new(source))
    }

    pub fn tan(source: NoiseNode) -> Self {
        NoiseNode::Tan(Box::new(source))
    }

    pub fn add(a: NoiseNode, b: NoiseNode) -> Self {
        NoiseNode::Add(Box::new(a), Box::new(b))
    }

    pub fn subtract(a: NoiseNode, b: NoiseNode) -> Self {
        NoiseNode::Subtract(Box::new(a), Box::new(b))
    }

    pub fn multiply(a: NoiseNode, b: NoiseNode) -> Self {
        NoiseNode::Multiply(Box::new(a), Box::new(b))
    }

    pub fn divide(a: NoiseNode, b: NoiseNode) -> Self {
        NoiseNode::Divide(Box::new(a), Box::new(b))
    }

    pub fn pow(base: NoiseNode, exponent: NoiseNode) -> Self {
        NoiseNode::Pow(Box::new(base), Box::new(exponent))
    }

    pub fn scale_coords(source: NoiseNode, scale: NoiseNode) -> Self {
        NoiseNode::ScaleCoords {
            source: Box::new(source),
            scale: Box::new(scale),
        }
    }

    pub fn fractal(
        source: NoiseNode,
        octaves: u32,
        persistence: f64,
        frequency: f64,
    ) -> Result<Self, NoiseError> {
        let o = Octaves::new(octaves, persistence, frequency)?;
        Ok(NoiseNode::Fractal(Box::new(source), o))
    }

    pub fn billow(
        source: NoiseNode,
        octaves: u32,
        persistence: f64,
        frequency: f64,
    ) -> Result<Self, NoiseError> {
        let o = Octaves::new(octaves, persistence, frequency)?;
        Ok(NoiseNode::Billow(Box::new(source), o))
    }

    pub fn ridged(
        source: NoiseNode,
        octaves: u32,
        persistence: f64,
        frequency: f64,
    ) -> Result<Self, NoiseError> {
        let o = Octaves::new(octaves, persistence, frequency)?;
        Ok(NoiseNode::Ridged(Box::new(source), o))
    }

    pub fn evaluate(&self, x: f64, y: f64, z: f64) -> f64 {
        match self {
            NoiseNode::Constant(v) => *v,
            NoiseNode::Function(f) => f(x, y, z),
            NoiseNode::Perlin => perlin::noise3(x, y, z),
            NoiseNode::Worley(w) => w.evaluate(x, y, z),
            NoiseNode::Abs(s) => s.evaluate(x, y, z).abs(),
            NoiseNode::Sin(s) => s.evaluate(x, y, z).sin(),
            NoiseNode::Cos(s) => s.evaluate(x, y, z).cos(),
            NoiseNode::Tan(s) => s.evaluate(x, y, z).tan(),
            NoiseNode::Add(a, b) => a.evaluate(x, y, z) + b.evaluate(x, y, z),
            NoiseNode::Subtract(a, b) => a.evaluate(x, y, z) - b.evaluate(x, y, z),
            NoiseNode::Multiply(a, b) => a.evaluate(x, y, z) * b.evaluate(x, y, z),
            NoiseNode::Divide(a, b) => a.evaluate(x, y, z) / b.evaluate(x, y, z),
            NoiseNode::Pow(a, b) => a.evaluate(x, y, z).powf(b.evaluate(x, y, z)),
            NoiseNode::ScaleCoords { source, scale } => {
                let s = scale.evaluate(x, y, z);
                source.evaluate(x * s, y * s, z * s)
            }
            NoiseNode::Fractal(s, o) => o.sum(x, y, z, |x, y, z| s.evaluate(x, y, z)),
            NoiseNode::Billow(s, o) => {
                o.sum(x, y, z, |x, y, z| fractal::billow(s.evaluate(x, y, z)))
            }
            NoiseNode::Ridged(s, o) => {
                o.sum(x, y, z, |x, y, z| fractal::ridge(s.evaluate(x, y, z)))
            }
        }
    }

    #[inline]
    pub fn sample(&self, p: DVec3) -> f64 {
        self.evaluate(p.x, p.y, p.z)
    }
}

impl fmt::Debug for NoiseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseNode::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            NoiseNode::Function(_) => f.write_str("Function(..)"),
            NoiseNode::Perlin => f.write_str("Perlin"),
            NoiseNode::Worley(w) => f.debug_tuple("Worley").field(w).finish(),
            NoiseNode::Abs(s) => f.debug_tuple("Abs").field(s).finish(),
            NoiseNode::Sin(s) => f.debug_tuple("Sin").field(s).finish(),
            NoiseNode::Cos(s) => f.debug_tuple("Cos").field(s).finish(),
            NoiseNode::Tan(s) => f.debug_tuple("Tan").field(s).finish(),
            NoiseNode::Add(a, b) => f.debug_tuple("Add").field(a).field(b).finish(),
            NoiseNode::Subtract(a, b) => f.debug_tuple("Subtract").field(a).field(b).finish(),
            NoiseNode::Multiply(a, b) => f.debug_tuple("Multiply").field(a).field(b).finish(),
            NoiseNode::Divide(a, b) => f.debug_tuple("Divide").field(a).field(b).finish(),
            NoiseNode::Pow(a, b) => f.debug_tuple("Pow").field(a).field(b).finish(),
            NoiseNode::ScaleCoords { source, scale } => f
                .debug_struct("ScaleCoords")
                .field("source", source)
                .field("scale", scale)
                .finish(),
            NoiseNode::Fractal(s, o) => f.debug_tuple("Fractal").field(s).field(o).finish(),
            NoiseNode::Billow(s, o) => f.debug_tuple("Billow").field(s).field(o).finish(),
            NoiseNode::Ridged(s, o) => f.debug_tuple("Ridged").field(s).field(o).finish(),
        }
    }
}
