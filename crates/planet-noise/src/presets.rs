//! Ready-made terrain height fields.

use crate::fractal::Octaves;
use crate::worley::{Combiner, DistanceMetric, Worley};
use crate::NoiseNode;

/// Ridged Perlin mountains broken up by Manhattan Worley cells.
pub fn mountain() -> NoiseNode {
    let ridges = NoiseNode::Ridged(
        Box::new(NoiseNode::Perlin),
        Octaves::from_parts(16, 0.52, 2.0),
    );
    let cells = NoiseNode::multiply(
        NoiseNode::Worley(Worley::new(1221, DistanceMetric::Manhattan, Combiner::Nearest)),
        NoiseNode::Constant(5.0),
    );
    NoiseNode::scale_coords(NoiseNode::add(ridges, cells), NoiseNode::Constant(0.1))
}

/// Gentle rolling fractal Perlin at half amplitude.
pub fn plains() -> NoiseNode {
    let rolling = NoiseNode::Fractal(
        Box::new(NoiseNode::Perlin),
        Octaves::from_parts(16, 0.5, 2.0),
    );
    NoiseNode::multiply(
        NoiseNode::scale_coords(rolling, NoiseNode::Constant(0.1)),
        NoiseNode::Constant(0.5),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_finite_and_bounded() {
        let (m, p) = (mountain(), plains());
        for i in 0..64 {
            let t = i as f64 * 3.7;
            let mv = m.evaluate(t, -t * 0.5, 11.0);
            let pv = p.evaluate(t, -t * 0.5, 11.0);
            assert!(mv.is_finite() && pv.is_finite());
            // ridged in [-1, 1] plus worley * 5 in [0, 5]
            assert!((-1.5..=6.5).contains(&mv), "{mv}");
            assert!(pv.abs() <= 1.0, "{pv}");
        }
    }
}
