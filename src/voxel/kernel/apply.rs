//! Applying kernels to the grid

use std::collections::HashMap;

use rayon::prelude::*;

use crate::core::types::IVec3;
use crate::voxel::chunk::{ChunkData, ChunkIndex, voxel_index};
use crate::voxel::grid::Grid;

use super::kernel::{Kernel, KernelPiece};

impl Grid {
    /// Combine a kernel into every existing chunk it overlaps.
    ///
    /// Pieces landing on absent chunks are dropped. Touched chunks are
    /// promoted, edited in parallel, marked dirty and then compressed if they
    /// became uniform. Returns the touched chunk indices, sorted.
    pub fn apply_kernel(&mut self, kernel: &Kernel) -> Vec<ChunkIndex> {
        if kernel.is_empty() || kernel.mode().is_noop() {
            return Vec::new();
        }

        let pieces: Vec<KernelPiece> = kernel
            .pieces(self.resolution())
            .into_iter()
            .filter(|piece| self.contains_chunk(piece.chunk))
            .collect();
        if pieces.is_empty() {
            log::debug!("Kernel at {:?} touches no loaded chunk", kernel.index_offset());
            return Vec::new();
        }
        let piece_count = pieces.len();
        let pieces: HashMap<ChunkIndex, KernelPiece> =
            pieces.into_iter().map(|piece| (piece.chunk, piece)).collect();
        debug_assert_eq!(pieces.len(), piece_count, "kernel pieces overlap in one chunk");

        let mut touched: Vec<ChunkIndex> = pieces.keys().copied().collect();
        touched.sort_unstable();

        self.force_chunk_data(&touched);

        let r = self.resolution();
        self.chunks_mut(&touched).into_par_iter().for_each(|chunk| {
            let Some(piece) = pieces.get(&chunk.index()) else {
                return;
            };
            if let Some(data) = chunk.data_mut() {
                apply_piece(kernel, piece, data, r);
            }
            chunk.mark_mixed();
        });

        for &index in &touched {
            self.mark_dirty(index);
        }
        self.try_remove_chunk_data(&touched);

        log::debug!(
            "Applied {:?} kernel {:?} to {} chunks",
            kernel.mode(),
            kernel.size(),
            touched.len()
        );
        touched
    }
}

/// Combine one piece of `kernel` into a chunk's buffers
fn apply_piece(kernel: &Kernel, piece: &KernelPiece, data: &mut ChunkData, r: usize) {
    let mode = kernel.mode();
    let distances = kernel.distances();

    for z in 0..piece.size.z {
        for y in 0..piece.size.y {
            let k_row = kernel.index_of(piece.kernel_start + IVec3::new(0, y, z));
            let c = piece.chunk_start + IVec3::new(0, y, z);
            let c_row = voxel_index(r, c.x as usize, c.y as usize, c.z as usize);

            for x in 0..piece.size.x as usize {
                let ki = k_row + x;
                let ci = c_row + x;
                mode.combine(
                    distances[ki],
                    kernel.material_at(ki),
                    &mut data.distances[ci],
                    &mut data.materials[ci],
                );
            }
        }
    }
}
