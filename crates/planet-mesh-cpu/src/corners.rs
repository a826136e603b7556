use planet_geom::DVec3;

/// The four cube-space corners of a patch. `nw -> ne` is the first grid axis,
/// `nw -> sw` the second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchCorners {
    pub nw: DVec3,
    pub ne: DVec3,
    pub sw: DVec3,
    pub se: DVec3,
}

impl PatchCorners {
    pub const fn new(nw: DVec3, ne: DVec3, sw: DVec3, se: DVec3) -> Self {
        Self { nw, ne, sw, se }
    }

    #[inline]
    pub fn centroid(&self) -> DVec3 {
        (self.nw + self.ne + self.sw + self.se) * 0.25
    }

    /// Centroid projected onto the sphere of `radius`.
    #[inline]
    pub fn surface_center(&self, radius: f64) -> DVec3 {
        self.centroid().normalized() * radius
    }

    /// Bilinear point at `(u, v)`, `u` along nw->ne and `v` from the top edge to the bottom edge.
    #[inline]
    pub fn bilerp(&self, u: f64, v: f64) -> DVec3 {
        let top = self.nw.lerp(self.ne, u);
        let bottom = self.sw.lerp(self.se, u);
        top.lerp(bottom, v)
    }

    /// Quarters the patch. Order is `[nw, ne, sw, se]`.
    pub fn quarter(&self) -> [PatchCorners; 4] {
        let c = self.centroid();
        let n = self.nw.midpoint(self.ne);
        let w = self.nw.midpoint(self.sw);
        let e = self.ne.midpoint(self.se);
        let s = self.sw.midpoint(self.se);
        [
            PatchCorners::new(self.nw, n, w, c),
            PatchCorners::new(n, self.ne, c, e),
            PatchCorners::new(w, c, self.sw, s),
            PatchCorners::new(c, e, s, self.se),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.nw.is_finite() && self.ne.is_finite() && self.sw.is_finite() && self.se.is_finite()
    }
}
