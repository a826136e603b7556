use planet_geom::DVec3;

use crate::constants::{
    SIDE_CELLS, SIDE_LEN, SKIRT_EAST, SKIRT_NORTH, SKIRT_SOUTH, SKIRT_WEST,
};
use crate::{MeshError, PatchCorners, PatchMesh};

/// Builds the mesh of the patch spanned by `corners` on a sphere of `radius`.
///
/// Grid vertex `(x, y)` is stored at `x * SIDE_LEN + y`; `x` runs nw->ne and
/// `y` from the top edge to the bottom edge. Each grid point is projected onto
/// the sphere and pushed outward by `displacement` sampled at that surface
/// point. The four skirt rings sit `skirt_depth` below the undisplaced surface.
pub fn build_patch_mesh(
    corners: &PatchCorners,
    radius: f64,
    skirt_depth: f64,
    displacement: &dyn Fn(DVec3) -> f64,
) -> Result<PatchMesh, MeshError> {
    if !corners.is_finite() {
        return Err(MeshError::NonFiniteCorners);
    }
    let step = 1.0 / SIDE_CELLS as f64;
    let center = corners.surface_center(radius);
    let mut mesh = PatchMesh::zeroed(center);

    for x in 0..SIDE_LEN {
        let u = step * x as f64;
        for y in 0..SIDE_LEN {
            let normal = corners.bilerp(u, step * y as f64).normalized();
            let surface = normal * radius;
            let d = displacement(surface);
            if !d.is_finite() {
                return Err(MeshError::NonFiniteDisplacement {
                    value: d,
                    x: surface.x,
                    y: surface.y,
                    z: surface.z,
                });
            }
            let i = x * SIDE_LEN + y;
            mesh.positions[i] = (surface + normal * d - center).as_vec3();
            mesh.texcoords[i] = normal.as_vec3();
            mesh.displacements[i] = d as f32;
        }
    }

    let rings = [
        (SKIRT_WEST, corners.nw, corners.sw),
        (SKIRT_SOUTH, corners.sw, corners.se),
        (SKIRT_EAST, corners.ne, corners.se),
        (SKIRT_NORTH, corners.nw, corners.ne),
    ];
    let sunk = radius - skirt_depth;
    for (base, from, to) in rings {
        for i in 0..SIDE_LEN {
            let normal = from.lerp(to, step * i as f64).normalized();
            mesh.positions[base + i] = (normal * sunk - center).as_vec3();
            mesh.texcoords[base + i] = normal.as_vec3();
        }
    }

    Ok(mesh)
}
