use planet_geom::{DVec3, Vec3};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

fn dvec3_approx_eq(a: DVec3, b: DVec3, eps: f64) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn dvec3_constants() {
    assert!(dvec3_approx_eq(DVec3::ZERO, DVec3::new(0.0, 0.0, 0.0), 1e-12));
    assert!(dvec3_approx_eq(DVec3::X.cross(DVec3::Y), DVec3::Z, 1e-12));
    assert!(dvec3_approx_eq(DVec3::splat(2.0), DVec3::new(2.0, 2.0, 2.0), 1e-12));
}

#[test]
fn dvec3_add_sub() {
    let a = DVec3::new(1.0, 2.0, 3.0);
    let b = DVec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(dvec3_approx_eq(c, DVec3::new(-3.0, 7.0, -3.0), 1e-12));

    let d = c - a;
    assert!(dvec3_approx_eq(d, b, 1e-12));
    assert!(dvec3_approx_eq(-d, DVec3::new(4.0, -5.0, 6.0), 1e-12));
}

#[test]
fn dvec3_add_assign_sub_assign() {
    let mut v = DVec3::new(1.0, 1.0, 1.0);
    v += DVec3::new(2.0, 3.0, 4.0);
    assert!(dvec3_approx_eq(v, DVec3::new(3.0, 4.0, 5.0), 1e-12));

    v -= DVec3::new(1.0, 2.0, 3.0);
    assert!(dvec3_approx_eq(v, DVec3::new(2.0, 2.0, 2.0), 1e-12));
}

#[test]
fn dvec3_length_normalized_distance() {
    let v = DVec3::new(3.0, 4.0, 0.0);
    assert!(approx_eq(v.length(), 5.0, 1e-12));
    assert!(dvec3_approx_eq(v.normalized(), DVec3::new(0.6, 0.8, 0.0), 1e-12));
    assert!(approx_eq(v.distance(DVec3::ZERO), 5.0, 1e-12));

    // Zero vector normalization is a no-op (not NaN)
    let zn = DVec3::ZERO.normalized();
    assert!(dvec3_approx_eq(zn, DVec3::ZERO, 1e-12));
    assert!(zn.is_finite());
}

#[test]
fn dvec3_cube_corner_projects_onto_sphere() {
    // A cube corner at (r, r, r) lands on the sphere of radius r after normalization
    let r = 6_000_000.0;
    let p = DVec3::new(r, r, -r).normalized() * r;
    assert!(approx_eq(p.length(), r, 1e-6));
    assert!(approx_eq(p.x, r / 3f64.sqrt(), 1e-6));
}

#[test]
fn dvec3_lerp_and_midpoint() {
    let a = DVec3::new(-1.0, 0.0, 2.0);
    let b = DVec3::new(3.0, 4.0, -2.0);
    assert!(dvec3_approx_eq(a.lerp(b, 0.25), DVec3::new(0.0, 1.0, 1.0), 1e-12));
    assert!(dvec3_approx_eq(a.midpoint(b), DVec3::new(1.0, 2.0, 0.0), 1e-12));
}

#[test]
fn vec3_narrowing() {
    let v = DVec3::new(1.5, -2.25, 1024.0).as_vec3();
    assert_eq!(v, Vec3::new(1.5, -2.25, 1024.0));
    assert!((v.length() - 1024.0036).abs() < 1e-2);
    assert!(!DVec3::new(f64::NAN, 0.0, 0.0).is_finite());
}
