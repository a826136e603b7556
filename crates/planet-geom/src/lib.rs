//! Minimal vector types for the planet crates (no graphics dependency).
//!
//! `DVec3` is used for everything in planet space, where single precision is
//! not enough at planetary radii. `Vec3` is the compact storage type for
//! mesh data, which is always kept relative to a patch center.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct DVec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DVec3 {
    pub const ZERO: DVec3 = DVec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const X: DVec3 = DVec3 {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };
    pub const Y: DVec3 = DVec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };
    pub const Z: DVec3 = DVec3 {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn dot(self, rhs: DVec3) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: DVec3) -> DVec3 {
        DVec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn distance(self, rhs: DVec3) -> f64 {
        (self - rhs).length()
    }

    /// Unit vector in the same direction. The zero vector is returned unchanged.
    #[inline]
    pub fn normalized(self) -> DVec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    /// Linear interpolation, `t = 0` yields `self`, `t = 1` yields `rhs`.
    #[inline]
    pub fn lerp(self, rhs: DVec3, t: f64) -> DVec3 {
        self + (rhs - self) * t
    }

    #[inline]
    pub fn midpoint(self, rhs: DVec3) -> DVec3 {
        (self + rhs) * 0.5
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Narrows to single precision. Only meaningful for small, center-relative values.
    #[inline]
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl Add for DVec3 {
    type Output = DVec3;
    #[inline]
    fn add(self, rhs: DVec3) -> DVec3 {
        DVec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for DVec3 {
    #[inline]
    fn add_assign(&mut self, rhs: DVec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for DVec3 {
    type Output = DVec3;
    #[inline]
    fn sub(self, rhs: DVec3) -> DVec3 {
        DVec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for DVec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: DVec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f64> for DVec3 {
    type Output = DVec3;
    #[inline]
    fn mul(self, rhs: f64) -> DVec3 {
        DVec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for DVec3 {
    type Output = DVec3;
    #[inline]
    fn div(self, rhs: f64) -> DVec3 {
        DVec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for DVec3 {
    type Output = DVec3;
    #[inline]
    fn neg(self) -> DVec3 {
        DVec3::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f64; 3]> for DVec3 {
    #[inline]
    fn from(v: [f64; 3]) -> Self {
        DVec3::new(v[0], v[1], v[2])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn as_dvec3(self) -> DVec3 {
        DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}
