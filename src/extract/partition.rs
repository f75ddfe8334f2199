//! Grouping of extracted quads by material

use crate::voxel::pool::BufferPool;

use super::chunk_mesh::{ChunkMesh, MatBlock};

/// Stable counting sort of the mesh's quads by material.
///
/// Rebuilds `mat_blocks` so the blocks cover the quad list exactly, in
/// ascending material order. Scratch lists come from the pool and the old
/// lists go back to it.
pub fn sort_by_material(mesh: &mut ChunkMesh, pool: &BufferPool) {
    mesh.mat_blocks.clear();
    let n = mesh.quads.len();
    if n == 0 {
        return;
    }

    let mut counts = [0usize; 256];
    for &m in &mesh.quad_materials {
        counts[m as usize] += 1;
    }

    let mut next = [0usize; 256];
    let mut offset = 0;
    for (material, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        next[material] = offset;
        mesh.mat_blocks.push(MatBlock {
            start: offset,
            end: offset + count,
            material: material as u8,
        });
        offset += count;
    }

    if mesh.mat_blocks.len() == 1 {
        return;
    }

    let mut quads = pool.quads().acquire();
    quads.resize(n, [0; 4]);
    let mut materials = pool.quad_materials().acquire();
    materials.resize(n, 0);

    for (quad, &m) in mesh.quads.iter().zip(&mesh.quad_materials) {
        let slot = &mut next[m as usize];
        quads[*slot] = *quad;
        materials[*slot] = m;
        *slot += 1;
    }

    std::mem::swap(&mut mesh.quads, &mut quads);
    std::mem::swap(&mut mesh.quad_materials, &mut materials);
    pool.quads().release(quads);
    pool.quad_materials().release(materials);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_stable_and_blocks_partition() {
        let pool = BufferPool::new(4);
        let mut mesh = ChunkMesh::acquire(&pool);
        let materials = [3u8, 1, 3, 0, 1, 3];
        for (i, &m) in materials.iter().enumerate() {
            mesh.quads.push([i as u32; 4]);
            mesh.quad_materials.push(m);
        }

        sort_by_material(&mut mesh, &pool);

        assert_eq!(mesh.quad_materials, vec![0, 1, 1, 3, 3, 3]);
        let order: Vec<u32> = mesh.quads.iter().map(|q| q[0]).collect();
        assert_eq!(order, vec![3, 1, 4, 0, 2, 5]);
        assert_eq!(
            mesh.mat_blocks,
            vec![
                MatBlock { start: 0, end: 1, material: 0 },
                MatBlock { start: 1, end: 3, material: 1 },
                MatBlock { start: 3, end: 6, material: 3 },
            ]
        );

        mesh.release(&pool);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_single_material_keeps_lists() {
        let pool = BufferPool::new(4);
        let mut mesh = ChunkMesh::acquire(&pool);
        mesh.quads.extend([[0; 4], [1; 4]]);
        mesh.quad_materials.extend([7, 7]);
        sort_by_material(&mut mesh, &pool);
        assert_eq!(mesh.mat_blocks, vec![MatBlock { start: 0, end: 2, material: 7 }]);
        mesh.release(&pool);
    }

    #[test]
    fn test_empty_mesh_has_no_blocks() {
        let pool = BufferPool::new(4);
        let mut mesh = ChunkMesh::acquire(&pool);
        sort_by_material(&mut mesh, &pool);
        assert!(mesh.mat_blocks.is_empty());
        mesh.release(&pool);
    }
}
