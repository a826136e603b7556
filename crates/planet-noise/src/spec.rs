//! Declarative noise trees, deserialized from config and built into [`NoiseNode`]s.
//!
//! ```toml
//! noise = { type = "add", a = { type = "perlin" }, b = { type = "constant", value = 0.5 } }
//! noise = { type = "preset", name = "plains" }
//! ```

use serde::Deserialize;

use crate::fractal::{DEFAULT_FREQUENCY, DEFAULT_OCTAVES, DEFAULT_PERSISTENCE, Octaves};
use crate::worley::{Combiner, DEFAULT_SEED, DistanceMetric, Worley};
use crate::{NoiseError, NoiseNode, presets};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetName {
    Mountain,
    Plains,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OctaveSpec {
    pub source: Box<NoiseSpec>,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f64,
    #[serde(default = "default_frequency")]
    pub frequency: f64,
}

fn default_octaves() -> u32 {
    DEFAULT_OCTAVES
}
fn default_persistence() -> f64 {
    DEFAULT_PERSISTENCE
}
fn default_frequency() -> f64 {
    DEFAULT_FREQUENCY
}
fn default_seed() -> i32 {
    DEFAULT_SEED
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoiseSpec {
    Constant {
        value: f64,
    },
    Perlin,
    Worley {
        #[serde(default = "default_seed")]
        seed: i32,
        #[serde(default)]
        metric: DistanceMetric,
        #[serde(default)]
        combiner: Combiner,
    },
    Abs {
        source: Box<NoiseSpec>,
    },
    Sin {
        source: Box<NoiseSpec>,
    },
    Cos {
        source: Box<NoiseSpec>,
    },
    Tan {
        source: Box<NoiseSpec>,
    },
    Add {
        a: Box<NoiseSpec>,
        b: Box<NoiseSpec>,
    },
    Subtract {
        a: Box<NoiseSpec>,
        b: Box<NoiseSpec>,
    },
    Multiply {
        a: Box<NoiseSpec>,
        b: Box<NoiseSpec>,
    },
    Divide {
        a: Box<NoiseSpec>,
        b: Box<NoiseSpec>,
    },
    Pow {
        a: Box<NoiseSpec>,
        b: Box<NoiseSpec>,
    },
    ScaleCoords {
        source: Box<NoiseSpec>,
        scale: Box<NoiseSpec>,
    },
    Fractal(OctaveSpec),
    Billow(OctaveSpec),
    Ridged(OctaveSpec),
    Preset {
        name: PresetName,
    },
}

impl Default for NoiseSpec {
    fn default() -> Self {
        NoiseSpec::Preset {
            name: PresetName::Mountain,
        }
    }
}

impl OctaveSpec {
    fn build(&self) -> Result<(NoiseNode, Octaves), NoiseError> {
        let o = Octaves::new(self.octaves, self.persistence, self.frequency)?;
        Ok((self.source.build()?, o))
    }
}

impl NoiseSpec {
    pub fn build(&self) -> Result<NoiseNode, NoiseError> {
        let binary = |a: &NoiseSpec, b: &NoiseSpec| -> Result<(NoiseNode, NoiseNode), NoiseError> {
            Ok((a.build()?, b.build()?))
        };
        Ok(match self {
            NoiseSpec::Constant { value } => NoiseNode::Constant(*value),
            NoiseSpec::Perlin => NoiseNode::Perlin,
            NoiseSpec::Worley {
                seed,
                metric,
                combiner,
            } => NoiseNode::Worley(Worley::new(*seed, *metric, *combiner)),
            NoiseSpec::Abs { source } => NoiseNode::abs(source.build()?),
            NoiseSpec::Sin { source } => NoiseNode::sin(source.build()?),
            NoiseSpec::Cos { source } => NoiseNode::cos(source.build()?),
            NoiseSpec::Tan { source } => NoiseNode::tan(source.build()?),
            NoiseSpec::Add { a, b } => {
                let (a, b) = binary(a, b)?;
                NoiseNode::add(a, b)
            }
            NoiseSpec::Subtract { a, b } => {
                let (a, b) = binary(a, b)?;
                NoiseNode::subtract(a, b)
            }
            NoiseSpec::Multiply { a, b } => {
                let (a, b) = binary(a, b)?;
                NoiseNode::multiply(a, b)
            }
            NoiseSpec::Divide { a, b } => {
                let (a, b) = binary(a, b)?;
                NoiseNode::divide(a, b)
            }
            NoiseSpec::Pow { a, b } => {
                let (a, b) = binary(a, b)?;
                NoiseNode::pow(a, b)
            }
            NoiseSpec::ScaleCoords { source, scale } => {
                let (source, scale) = binary(source, scale)?;
                NoiseNode::scale_coords(source, scale)
            }
            NoiseSpec::Fractal(spec) => {
                let (s, o) = spec.build()?;
                NoiseNode::Fractal(Box::new(s), o)
            }
            NoiseSpec::Billow(spec) => {
                let (s, o) = spec.build()?;
                NoiseNode::Billow(Box::new(s), o)
            }
            NoiseSpec::Ridged(spec) => {
                let (s, o) = spec.build()?;
                NoiseNode::Ridged(Box::new(s), o)
            }
            NoiseSpec::Preset { name } => match name {
                PresetName::Mountain => presets::mountain(),
                PresetName::Plains => presets::plains(),
            },
        })
    }
}
