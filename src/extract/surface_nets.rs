//! Naive surface nets over one chunk's distance buffer
//!
//! One vertex per sign-changing cell, placed at the mean of its edge
//! crossings. Quads are emitted around every crossed voxel edge whose four
//! neighbouring cells lie inside the chunk. Edge ownership is chosen so that
//! two overlapping chunks never both emit the quad for a shared edge.

use crate::core::types::Vec3;
use crate::voxel::chunk::voxel_index;
use crate::voxel::pool::BufferPool;

use super::chunk_mesh::ChunkMesh;
use super::partition::sort_by_material;
use super::tables::{CORNER_OFFSETS, EDGE_COUNT, EDGE_MASK, EDGES, QUAD_MASK};

const NO_VERTEX: i32 = -1;

/// Borrowed view of one chunk's voxels plus its placement
#[derive(Debug, Clone, Copy)]
pub struct ExtractInput<'a> {
    pub distances: &'a [f32],
    pub materials: &'a [u8],
    pub resolution: usize,
    /// Grid-local position of voxel (0, 0, 0)
    pub offset: Vec3,
    pub voxel_size: f32,
}

/// Extract the surface of `input` into `mesh`, which must be empty.
///
/// A voxel is solid when its distance is `<= 0`. Quads wind counter-clockwise
/// seen from the empty side and take the material of their solid voxel.
/// Scratch buffers come from `pool`.
///
/// # Panics
/// If the buffers are not `resolution³` long.
pub fn extract(input: &ExtractInput<'_>, mesh: &mut ChunkMesh, pool: &BufferPool) {
    let r = input.resolution;
    assert_eq!(input.distances.len(), r * r * r, "distance buffer length");
    assert_eq!(input.materials.len(), r * r * r, "material buffer length");
    debug_assert!(mesh.is_empty() && mesh.vertices.is_empty());

    if r < 2 {
        return;
    }

    let mut cell_vertex = pool.cell_indices().acquire();
    cell_vertex.fill(NO_VERTEX);

    let strides = [1, r, r * r];
    let corner_step: [usize; 8] = std::array::from_fn(|i| (i & 1) + ((i >> 1) & 1) * r + ((i >> 2) & 1) * r * r);

    for z in 0..r - 1 {
        for y in 0..r - 1 {
            for x in 0..r - 1 {
                let base = voxel_index(r, x, y, z);

                let mut corners = [0.0f32; 8];
                let mut mask = 0u8;
                for (i, corner) in corners.iter_mut().enumerate() {
                    *corner = input.distances[base + corner_step[i]];
                    if *corner <= 0.0 {
                        mask |= 1 << i;
                    }
                }
                if mask == 0 || mask == 0xFF {
                    continue;
                }

                let vertex = mesh.vertices.len() as u32;
                let cell = Vec3::new(x as f32, y as f32, z as f32);
                let local = cell_vertex_offset(&corners, mask);
                mesh.vertices.push(input.offset + (cell + local) * input.voxel_size);
                mesh.normals.push(gradient(&corners).normalize_or_zero());
                cell_vertex[base] = vertex as i32;

                let quad_bits = QUAD_MASK[mask as usize];
                if quad_bits == 0 {
                    continue;
                }

                let coords = [x, y, z];
                for axis in 0..3 {
                    let bits = (quad_bits >> (2 * axis)) & 0b11;
                    if bits == 0 {
                        continue;
                    }
                    let u = (axis + 1) % 3;
                    let v = (axis + 2) % 3;
                    // Cells behind the edge must exist, and the last edge
                    // layer belongs to the next chunk
                    if coords[u] == 0 || coords[v] == 0 || coords[axis] + 3 > r {
                        continue;
                    }

                    let (su, sv) = (strides[u], strides[v]);
                    let neighbours = [cell_vertex[base - su], cell_vertex[base - su - sv], cell_vertex[base - sv]];
                    debug_assert!(!neighbours.contains(&NO_VERTEX), "crossed edge without neighbour vertex");
                    if neighbours.contains(&NO_VERTEX) {
                        continue;
                    }
                    let [n_u, n_uv, n_v] = neighbours.map(|n| n as u32);

                    if bits & 0b01 != 0 {
                        mesh.quads.push([vertex, n_u, n_uv, n_v]);
                        mesh.quad_materials.push(input.materials[base]);
                    } else {
                        mesh.quads.push([vertex, n_v, n_uv, n_u]);
                        mesh.quad_materials.push(input.materials[base + strides[axis]]);
                    }
                }
            }
        }
    }

    pool.cell_indices().release(cell_vertex);
    sort_by_material(mesh, pool);
}

/// Mean of the edge crossings inside the unit cell
fn cell_vertex_offset(corners: &[f32; 8], mask: u8) -> Vec3 {
    let edges = EDGE_MASK[mask as usize];
    let mut sum = Vec3::ZERO;
    for (e, &(a, b)) in EDGES.iter().enumerate() {
        if edges & (1 << e) == 0 {
            continue;
        }
        let (va, vb) = (corners[a], corners[b]);
        let t = va / (va - vb);
        let pa = Vec3::from(CORNER_OFFSETS[a]);
        let pb = Vec3::from(CORNER_OFFSETS[b]);
        sum += pa + (pb - pa) * t;
    }
    sum / EDGE_COUNT[mask as usize] as f32
}

/// Central-difference gradient across the cell corners
fn gradient(c: &[f32; 8]) -> Vec3 {
    Vec3::new(
        (c[1] - c[0]) + (c[3] - c[2]) + (c[5] - c[4]) + (c[7] - c[6]),
        (c[2] - c[0]) + (c[3] - c[1]) + (c[6] - c[4]) + (c[7] - c[5]),
        (c[4] - c[0]) + (c[5] - c[1]) + (c[6] - c[2]) + (c[7] - c[3]),
    )
}
