//! Patch mesh dimensions. Every patch mesh has exactly this layout.

/// Vertices along one edge of the patch grid.
pub const SIDE_LEN: usize = 33;
/// Cells along one edge of the patch grid; also the smallest side length a patch may split at.
pub const SIDE_CELLS: usize = SIDE_LEN - 1;
pub const NUM_GRID_VERTICES: usize = SIDE_LEN * SIDE_LEN;
/// Grid plus four skirt rings (west, south, east, north).
pub const NUM_VERTICES: usize = NUM_GRID_VERTICES + 4 * SIDE_LEN;
pub const NUM_INDICES: usize = SIDE_CELLS * SIDE_CELLS * 6 + 24 * SIDE_CELLS;

pub(crate) const SKIRT_WEST: usize = NUM_GRID_VERTICES;
pub(crate) const SKIRT_SOUTH: usize = NUM_GRID_VERTICES + SIDE_LEN;
pub(crate) const SKIRT_EAST: usize = NUM_GRID_VERTICES + 2 * SIDE_LEN;
pub(crate) const SKIRT_NORTH: usize = NUM_GRID_VERTICES + 3 * SIDE_LEN;

const _: () = assert!(NUM_VERTICES == 1221);
const _: () = assert!(NUM_INDICES == 6912);
