use std::sync::OnceLock;

use crate::constants::{
    NUM_INDICES, SIDE_CELLS, SIDE_LEN, SKIRT_EAST, SKIRT_NORTH, SKIRT_SOUTH, SKIRT_WEST,
};

static PATCH_INDICES: OnceLock<Vec<u32>> = OnceLock::new();

/// Triangle list shared by every patch mesh.
pub fn patch_indices() -> &'static [u32] {
    PATCH_INDICES.get_or_init(generate_indices)
}

fn generate_indices() -> Vec<u32> {
    let n = SIDE_LEN;
    let mut idx: Vec<usize> = Vec::with_capacity(NUM_INDICES);

    for y in 0..SIDE_CELLS {
        for x in 0..SIDE_CELLS {
            idx.extend_from_slice(&[(y + 1) * n + x, y * n + x + 1, y * n + x]);
            idx.extend_from_slice(&[(y + 1) * n + x, (y + 1) * n + x + 1, y * n + x + 1]);
        }
    }

    // Skirt strips join each grid border to its sunken ring.
    for i in 0..SIDE_CELLS {
        idx.extend_from_slice(&[i, SKIRT_WEST + i + 1, SKIRT_WEST + i]);
        idx.extend_from_slice(&[i, i + 1, SKIRT_WEST + i + 1]);

        idx.extend_from_slice(&[n * (i + 2) - 1, SKIRT_SOUTH + i, n * (i + 1) - 1]);
        idx.extend_from_slice(&[n * (i + 2) - 1, SKIRT_SOUTH + i + 1, SKIRT_SOUTH + i]);

        idx.extend_from_slice(&[SKIRT_EAST + i, (n - 1) * n + i + 1, (n - 1) * n + i]);
        idx.extend_from_slice(&[SKIRT_EAST + i, SKIRT_EAST + i + 1, (n - 1) * n + i + 1]);

        idx.extend_from_slice(&[SKIRT_NORTH + i + 1, n * i, SKIRT_NORTH + i]);
        idx.extend_from_slice(&[SKIRT_NORTH + i + 1, n * (i + 1), n * i]);
    }

    debug_assert_eq!(idx.len(), NUM_INDICES);
    idx.into_iter().map(|i| i as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_VERTICES;

    #[test]
    fn length_and_range() {
        let idx = patch_indices();
        assert_eq!(idx.len(), NUM_INDICES);
        assert!(idx.iter().all(|&i| (i as usize) < NUM_VERTICES));
    }

    #[test]
    fn every_vertex_is_referenced() {
        let mut used = vec![false; NUM_VERTICES];
        for &i in patch_indices() {
            used[i as usize] = true;
        }
        assert!(used.iter().all(|&u| u));
    }

    #[test]
    fn first_cell_and_first_skirt_quad() {
        let idx = patch_indices();
        let n = SIDE_LEN as u32;
        assert_eq!(&idx[..6], &[n, 1, 0, n, n + 1, 1]);
        let skirt = SIDE_CELLS * SIDE_CELLS * 6;
        let w = SKIRT_WEST as u32;
        assert_eq!(&idx[skirt..skirt + 6], &[0, w + 1, w, 0, 1, w + 1]);
    }

    #[test]
    fn shared_buffer_is_reused() {
        assert!(std::ptr::eq(patch_indices(), patch_indices()));
    }
}
