use planet_geom::DVec3;
use proptest::prelude::*;
use proptest::num::f64::NORMAL;
use proptest::strategy::Strategy;

fn approx(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }
fn vapprox(a: DVec3, b: DVec3, eps: f64) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

fn approx_abs_rel(a: f64, b: f64, atol: f64, rtol: f64) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn vapprox_abs_rel(a: DVec3, b: DVec3, atol: f64, rtol: f64) -> bool {
    approx_abs_rel(a.x, b.x, atol, rtol)
        && approx_abs_rel(a.y, b.y, atol, rtol)
        && approx_abs_rel(a.z, b.z, atol, rtol)
}

// Planet-scale coordinates: up to a few times Earth's radius in meters.
fn planet_f64() -> impl Strategy<Value = f64> {
    NORMAL.prop_filter("planet scale", |v| v.is_finite() && v.abs() <= 2.0e7)
}

fn arb_dvec3() -> impl Strategy<Value = DVec3> {
    (planet_f64(), planet_f64(), planet_f64()).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

fn arb_nonzero_dvec3() -> impl Strategy<Value = DVec3> {
    arb_dvec3().prop_filter("non-degenerate", |v| v.length() > 1e-3)
}

proptest! {
    // |normalize(v)| = 1 for every non-degenerate input
    #[test]
    fn dvec3_normalized_is_unit(v in arb_nonzero_dvec3()) {
        prop_assert!(approx(v.normalized().length(), 1.0, 1e-9));
    }

    // Normalizing then scaling by the length gives the input back
    #[test]
    fn dvec3_normalize_scale_roundtrip(v in arb_nonzero_dvec3()) {
        let back = v.normalized() * v.length();
        prop_assert!(vapprox_abs_rel(back, v, 1e-6, 1e-9));
    }

    // lerp hits both endpoints
    #[test]
    fn dvec3_lerp_endpoints(a in arb_dvec3(), b in arb_dvec3()) {
        prop_assert!(vapprox_abs_rel(a.lerp(b, 0.0), a, 1e-6, 1e-12));
        prop_assert!(vapprox_abs_rel(a.lerp(b, 1.0), b, 1e-6, 1e-12));
    }

    // The midpoint is lerp at one half and is equidistant from both ends
    #[test]
    fn dvec3_midpoint_equidistant(a in arb_dvec3(), b in arb_dvec3()) {
        let m = a.midpoint(b);
        prop_assert!(vapprox_abs_rel(m, a.lerp(b, 0.5), 1e-6, 1e-12));
        prop_assert!(approx_abs_rel(m.distance(a), m.distance(b), 1e-6, 1e-9));
    }

    // distance is symmetric and obeys the triangle inequality
    #[test]
    fn dvec3_distance_metric(a in arb_dvec3(), b in arb_dvec3(), c in arb_dvec3()) {
        prop_assert!(approx(a.distance(b), b.distance(a), 1e-6));
        let lhs = a.distance(c);
        let rhs = a.distance(b) + b.distance(c);
        prop_assert!(lhs <= rhs + 1e-6 + 1e-9 * rhs.max(1.0));
    }

    // Narrowing keeps center-relative values within f32 precision
    #[test]
    fn dvec3_as_vec3_roundtrip(x in -1.0e4f64..1.0e4, y in -1.0e4f64..1.0e4, z in -1.0e4f64..1.0e4) {
        let v = DVec3::new(x, y, z);
        let back = v.as_vec3().as_dvec3();
        prop_assert!(vapprox(back, v, 1e-3));
    }
}
