//! Surface extraction
//!
//! Meshes hot chunks with naive surface nets. Vertices are in grid-local
//! space; apply [`Grid::transform`] to place them in the world.

pub mod chunk_mesh;
pub mod partition;
pub mod surface_nets;
pub mod tables;

pub use chunk_mesh::{ChunkMesh, MatBlock};
pub use surface_nets::{ExtractInput, extract};

use rayon::prelude::*;

use crate::voxel::chunk::ChunkIndex;
use crate::voxel::grid::Grid;

impl Grid {
    /// Mesh one chunk. Cold chunks have no surface and yield an empty mesh.
    ///
    /// Returns `None` if the chunk does not exist. The mesh borrows lists
    /// from the grid's pool; release it there when done.
    pub fn extract_chunk(&self, index: ChunkIndex) -> Option<ChunkMesh> {
        let chunk = self.chunk(index)?;
        let pool = self.pool();
        let mut mesh = ChunkMesh::acquire(pool);

        if let Some(data) = chunk.data() {
            let input = ExtractInput {
                distances: &data.distances,
                materials: &data.materials,
                resolution: self.resolution(),
                offset: self.chunk_origin(index),
                voxel_size: self.voxel_size(),
            };
            extract(&input, &mut mesh, pool);
        }

        Some(mesh)
    }

    /// Re-mesh every dirty chunk in parallel and clear the dirty set.
    ///
    /// Results are in ascending chunk order.
    pub fn rebuild_dirty(&mut self) -> Vec<(ChunkIndex, ChunkMesh)> {
        let dirty = self.take_dirty();
        if dirty.is_empty() {
            return Vec::new();
        }

        let start = std::time::Instant::now();
        let grid = &*self;
        let meshes: Vec<(ChunkIndex, ChunkMesh)> = dirty
            .par_iter()
            .filter_map(|&index| grid.extract_chunk(index).map(|mesh| (index, mesh)))
            .collect();

        let quads: usize = meshes.iter().map(|(_, m)| m.quad_count()).sum();
        log::debug!(
            "Rebuilt {} chunk meshes ({} quads) in {:.1}ms",
            meshes.len(),
            quads,
            start.elapsed().as_secs_f64() * 1000.0
        );
        meshes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::types::{IVec3, Vec3};
    use crate::voxel::config::GridConfig;
    use crate::voxel::kernel::{Kernel, KernelMode};
    use crate::voxel::pool::BufferPool;

    fn grid(resolution: u32) -> Grid {
        let config = GridConfig::with_resolution(resolution);
        let pool = Arc::new(BufferPool::new(resolution as usize));
        Grid::new(config, pool).unwrap()
    }

    #[test]
    fn test_cold_and_missing_chunks() {
        let mut g = grid(8);
        let index = ChunkIndex::new(0, 0, 0);
        g.add_chunk(index);
        g.compress_all_chunks();
        assert!(!g.chunk(index).unwrap().is_hot());
        assert!(g.extract_chunk(ChunkIndex::new(5, 0, 0)).is_none());

        let mesh = g.extract_chunk(index).unwrap();
        assert!(mesh.is_empty());
        mesh.release(g.pool());
        assert_eq!(g.pool().outstanding(), 0);
    }

    #[test]
    fn test_sphere_carve_meshes_with_material() {
        let mut g = grid(16);
        let index = ChunkIndex::new(0, 0, 0);
        g.add_chunk(index);
        g.take_dirty();

        let kernel = Kernel::sphere(&g, Vec3::splat(7.5), 3.0, KernelMode::Add, 3);
        g.apply_kernel(&kernel);

        let held = g.pool().outstanding();
        let meshes = g.rebuild_dirty();
        assert_eq!(meshes.len(), 1);
        let (mesh_index, mesh) = &meshes[0];
        assert_eq!(*mesh_index, index);
        assert!(!mesh.is_empty());
        assert!(mesh.quad_materials.iter().all(|&m| m == 3));
        assert_eq!(mesh.mat_blocks.len(), 1);
        for v in &mesh.vertices {
            assert!((v.distance(Vec3::splat(7.5)) - 3.0).abs() < 0.5);
        }

        assert!(g.rebuild_dirty().is_empty());
        for (_, mesh) in meshes {
            mesh.release(g.pool());
        }
        assert_eq!(g.pool().outstanding(), held);
    }

    #[test]
    fn test_neighbouring_chunks_do_not_duplicate_quads() {
        let mut g = grid(8);
        let a = ChunkIndex::new(0, 0, 0);
        let b = ChunkIndex::new(1, 0, 0);
        g.add_chunk(a);
        g.add_chunk(b);
        for index in [a, b] {
            g.fill_chunk_with(index, 1, |p| p.z - 2.5);
        }
        g.mark_dirty(a);
        g.mark_dirty(b);

        let meshes = g.rebuild_dirty();
        let mut centers: Vec<IVec3> = Vec::new();
        for (_, mesh) in &meshes {
            for q in &mesh.quads {
                let c = q.iter().map(|&i| mesh.vertices[i as usize]).sum::<Vec3>() / 4.0;
                centers.push((c * 2.0).round().as_ivec3());
            }
        }
        let total = centers.len();
        centers.sort_by_key(|c| (c.x, c.y, c.z));
        centers.dedup();
        assert_eq!(centers.len(), total);

        for (_, mesh) in meshes {
            mesh.release(g.pool());
        }
    }
}
