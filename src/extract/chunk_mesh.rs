//! Pool-backed quad mesh produced for one chunk

use crate::core::types::Vec3;
use crate::voxel::pool::BufferPool;

/// Contiguous run of quads sharing one material, `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatBlock {
    pub start: usize,
    pub end: usize,
    pub material: u8,
}

impl MatBlock {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Extracted surface of a chunk in grid-local coordinates.
///
/// Quads are sorted by material and described by `mat_blocks`. The lists are
/// borrowed from a [`BufferPool`]; hand them back with [`ChunkMesh::release`].
#[derive(Debug)]
pub struct ChunkMesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub quads: Vec<[u32; 4]>,
    pub quad_materials: Vec<u8>,
    pub mat_blocks: Vec<MatBlock>,
}

impl ChunkMesh {
    /// Empty mesh with lists borrowed from the pool
    pub fn acquire(pool: &BufferPool) -> Self {
        Self {
            vertices: pool.vertices().acquire(),
            normals: pool.vertices().acquire(),
            quads: pool.quads().acquire(),
            quad_materials: pool.quad_materials().acquire(),
            mat_blocks: Vec::new(),
        }
    }

    /// Return every list to the pool
    pub fn release(self, pool: &BufferPool) {
        pool.vertices().release(self.vertices);
        pool.vertices().release(self.normals);
        pool.quads().release(self.quads);
        pool.quad_materials().release(self.quad_materials);
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Split a block's quads into triangles `(0, 1, 2)` and `(0, 2, 3)`.
    pub fn triangle_indices(&self, block: &MatBlock) -> Vec<u32> {
        let mut indices = Vec::with_capacity(block.len() * 6);
        for q in &self.quads[block.start..block.end] {
            indices.extend_from_slice(&[q[0], q[1], q[2], q[0], q[2], q[3]]);
        }
        indices
    }

    /// Raw bytes of the vertex positions for upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the vertex normals for upload
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }
}
