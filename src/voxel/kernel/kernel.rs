//! Kernel patches and their split into per-chunk pieces

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::voxel::chunk::ChunkIndex;

use super::mode::KernelMode;

/// Dense patch of distances aligned to the grid's global voxel lattice.
///
/// An empty kernel owns no buffers and applying it does nothing.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Global voxel coordinate of the kernel's voxel (0, 0, 0)
    index_offset: IVec3,
    /// Voxels per axis
    size: IVec3,
    /// `size.x * size.y * size.z` distances, X fastest
    distances: Vec<f32>,
    /// One entry (uniform) or one per voxel
    materials: Vec<u8>,
    mode: KernelMode,
}

/// Overlap of a kernel with one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelPiece {
    pub chunk: ChunkIndex,
    /// First local voxel written in the chunk
    pub chunk_start: IVec3,
    /// First kernel voxel read
    pub kernel_start: IVec3,
    /// Voxels copied per axis
    pub size: IVec3,
}

/// One axis of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisSpan {
    chunk: i32,
    chunk_start: i32,
    kernel_start: i32,
    len: i32,
}

impl Kernel {
    /// A kernel that does nothing
    pub fn empty(mode: KernelMode) -> Self {
        Self {
            index_offset: IVec3::ZERO,
            size: IVec3::ZERO,
            distances: Vec::new(),
            materials: Vec::new(),
            mode,
        }
    }

    /// Kernel from raw parts with one uniform material
    pub(crate) fn from_parts(
        index_offset: IVec3,
        size: IVec3,
        distances: Vec<f32>,
        material: u8,
        mode: KernelMode,
    ) -> Self {
        debug_assert_eq!(distances.len(), volume(size));
        Self {
            index_offset,
            size,
            distances,
            materials: vec![material],
            mode,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn index_offset(&self) -> IVec3 {
        self.index_offset
    }

    pub fn size(&self) -> IVec3 {
        self.size
    }

    pub fn mode(&self) -> KernelMode {
        self.mode
    }

    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    pub fn materials(&self) -> &[u8] {
        &self.materials
    }

    pub fn voxel_count(&self) -> usize {
        self.distances.len()
    }

    /// Change the combine mode (builder pattern)
    pub fn with_mode(mut self, mode: KernelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the material buffer with one material per voxel.
    pub fn with_materials(mut self, materials: Vec<u8>) -> Result<Self> {
        if materials.len() != 1 && materials.len() != self.distances.len() {
            return Err(Error::Config(format!(
                "kernel material buffer has {} entries, expected 1 or {}",
                materials.len(),
                self.distances.len()
            )));
        }
        self.materials = materials;
        Ok(self)
    }

    /// Flat index of kernel voxel `local`
    #[inline]
    pub fn index_of(&self, local: IVec3) -> usize {
        (local.x + self.size.x * (local.y + self.size.y * local.z)) as usize
    }

    /// Material of kernel voxel `i`
    #[inline]
    pub fn material_at(&self, i: usize) -> u8 {
        if self.materials.len() == 1 {
            self.materials[0]
        } else {
            self.materials[i]
        }
    }

    /// Split the kernel into one piece per overlapped chunk.
    ///
    /// Chunks overlap their neighbours, so a voxel near a seam lands in up to
    /// two pieces per axis. The pieces are not filtered against existing
    /// chunks.
    pub fn pieces(&self, resolution: usize) -> Vec<KernelPiece> {
        if self.is_empty() {
            return Vec::new();
        }
        let r = resolution as i32;
        let spans = [
            split_axis(self.index_offset.x, self.size.x, r),
            split_axis(self.index_offset.y, self.size.y, r),
            split_axis(self.index_offset.z, self.size.z, r),
        ];

        let mut pieces = Vec::with_capacity(spans[0].len() * spans[1].len() * spans[2].len());
        for z in &spans[2] {
            for y in &spans[1] {
                for x in &spans[0] {
                    pieces.push(KernelPiece {
                        chunk: ChunkIndex::new(x.chunk, y.chunk, z.chunk),
                        chunk_start: IVec3::new(x.chunk_start, y.chunk_start, z.chunk_start),
                        kernel_start: IVec3::new(x.kernel_start, y.kernel_start, z.kernel_start),
                        size: IVec3::new(x.len, y.len, z.len),
                    });
                }
            }
        }
        pieces
    }
}

fn volume(size: IVec3) -> usize {
    size.max(IVec3::ZERO).as_uvec3().element_product() as usize
}

/// Walk the chunks covering global voxels `[start, start + len)` on one axis
fn split_axis(start: i32, len: i32, resolution: i32) -> Vec<AxisSpan> {
    let stride = resolution - 2;
    let end = start + len;
    // First chunk whose last voxel reaches `start`
    let mut chunk = (start - resolution).div_euclid(stride) + 1;
    let mut spans = Vec::new();

    while chunk * stride < end {
        let chunk_lo = chunk * stride;
        let lo = start.max(chunk_lo);
        let hi = end.min(chunk_lo + resolution);
        if hi > lo {
            spans.push(AxisSpan {
                chunk,
                chunk_start: lo - chunk_lo,
                kernel_start: lo - start,
                len: hi - lo,
            });
        }
        chunk += 1;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn kernel(offset: IVec3, size: IVec3) -> Kernel {
        Kernel::from_parts(offset, size, vec![-1.0; volume(size)], 1, KernelMode::Add)
    }

    #[test]
    fn test_split_axis_inside_one_chunk() {
        let spans = split_axis(2, 3, 8);
        assert_eq!(
            spans,
            vec![AxisSpan { chunk: 0, chunk_start: 2, kernel_start: 0, len: 3 }]
        );
    }

    #[test]
    fn test_split_axis_seam_overlap() {
        // R = 8: chunk 0 covers [0, 8), chunk 1 covers [6, 14)
        let spans = split_axis(5, 4, 8);
        assert_eq!(
            spans,
            vec![
                AxisSpan { chunk: 0, chunk_start: 5, kernel_start: 0, len: 3 },
                AxisSpan { chunk: 1, chunk_start: 0, kernel_start: 1, len: 3 },
            ]
        );
    }

    #[test]
    fn test_split_axis_negative() {
        // Chunk -1 covers [-6, 2)
        let spans = split_axis(-3, 2, 8);
        assert_eq!(
            spans,
            vec![AxisSpan { chunk: -1, chunk_start: 3, kernel_start: 0, len: 2 }]
        );
    }

    #[test]
    fn test_split_axis_covers_every_voxel() {
        let r = 8;
        for start in -20..20 {
            for len in 1..25 {
                let spans = split_axis(start, len, r);
                for g in start..start + len {
                    let hits = spans
                        .iter()
                        .filter(|s| g >= start + s.kernel_start && g < start + s.kernel_start + s.len)
                        .count();
                    assert!(hits >= 1 && hits <= 2, "voxel {} covered {} times", g, hits);
                }
                for s in &spans {
                    assert!(s.chunk_start >= 0 && s.chunk_start + s.len <= r);
                    assert_eq!(s.chunk * (r - 2) + s.chunk_start, start + s.kernel_start);
                }
            }
        }
    }

    #[test]
    fn test_pieces_are_injective_per_chunk() {
        let k = kernel(IVec3::new(-7, 3, 11), IVec3::new(20, 9, 4));
        let pieces = k.pieces(8);
        let chunks: HashSet<ChunkIndex> = pieces.iter().map(|p| p.chunk).collect();
        assert_eq!(chunks.len(), pieces.len());

        let total: i32 = pieces.iter().map(|p| p.size.element_product()).sum();
        assert!(total as usize >= k.voxel_count());
    }

    #[test]
    fn test_empty_kernel_has_no_pieces() {
        let k = Kernel::empty(KernelMode::Add);
        assert!(k.is_empty());
        assert!(k.pieces(8).is_empty());
    }

    #[test]
    fn test_with_materials_checks_length() {
        let k = kernel(IVec3::ZERO, IVec3::new(2, 2, 2));
        assert!(k.clone().with_materials(vec![1, 2]).is_err());
        let k = k.with_materials((0..8).collect()).unwrap();
        assert_eq!(k.material_at(5), 5);
    }
}
