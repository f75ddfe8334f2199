//! Vertex welding and pseudo-normals for inside/outside tests

use std::collections::HashMap;

use crate::core::types::Vec3;

/// Undirected edge between two welded vertices, smaller index first
pub type EdgeKey = (u32, u32);

/// Canonical (min, max) key for an edge
#[inline(always)]
pub fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b { (a, b) } else { (b, a) }
}

/// Merge vertices with bit-identical positions and remap the triangles.
pub fn weld(positions: &[Vec3], indices: &[u32]) -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let mut vertices: Vec<Vec3> = Vec::with_capacity(positions.len());
    let mut vertex_map: HashMap<[u32; 3], u32> = HashMap::with_capacity(positions.len());
    let mut remap: Vec<u32> = Vec::with_capacity(positions.len());

    for &v in positions {
        let key = [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()];
        let idx = *vertex_map.entry(key).or_insert_with(|| {
            vertices.push(v);
            (vertices.len() - 1) as u32
        });
        remap.push(idx);
    }

    let triangles = indices
        .chunks_exact(3)
        .map(|t| [remap[t[0] as usize], remap[t[1] as usize], remap[t[2] as usize]])
        .collect();

    (vertices, triangles)
}

/// Face, vertex and edge normals of a welded triangle mesh
#[derive(Debug, Clone, Default)]
pub struct PseudoNormals {
    pub face: Vec<Vec3>,
    /// Angle-weighted sum of incident face normals, normalized
    pub vertex: Vec<Vec3>,
    /// Half the sum of the (usually two) incident face normals
    pub edge: HashMap<EdgeKey, Vec3>,
}

impl PseudoNormals {
    pub fn compute(vertices: &[Vec3], triangles: &[[u32; 3]]) -> Self {
        let mut face = Vec::with_capacity(triangles.len());
        let mut vertex = vec![Vec3::ZERO; vertices.len()];
        let mut edge: HashMap<EdgeKey, Vec3> = HashMap::with_capacity(triangles.len() * 3 / 2);

        for tri in triangles {
            let p = tri.map(|i| vertices[i as usize]);
            let n = (p[1] - p[0]).cross(p[2] - p[0]).normalize_or_zero();
            face.push(n);

            for corner in 0..3 {
                let here = p[corner];
                let e0 = (p[(corner + 1) % 3] - here).normalize_or_zero();
                let e1 = (p[(corner + 2) % 3] - here).normalize_or_zero();
                let angle = e0.dot(e1).clamp(-1.0, 1.0).acos();
                vertex[tri[corner] as usize] += n * angle;

                let key = edge_key(tri[corner], tri[(corner + 1) % 3]);
                *edge.entry(key).or_insert(Vec3::ZERO) += n * 0.5;
            }
        }

        for n in &mut vertex {
            *n = n.normalize_or_zero();
        }

        Self { face, vertex, edge }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SourceMesh;

    #[test]
    fn test_edge_key_is_undirected() {
        assert_eq!(edge_key(5, 2), (2, 5));
        assert_eq!(edge_key(2, 5), (2, 5));
    }

    #[test]
    fn test_weld_merges_duplicates() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::X, Vec3::Y, Vec3::ONE];
        let indices = vec![0, 1, 2, 3, 5, 4];
        let (vertices, triangles) = weld(&positions, &indices);
        assert_eq!(vertices.len(), 4);
        assert_eq!(triangles, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn test_cube_corner_normal_is_diagonal() {
        let mesh = SourceMesh::cuboid(Vec3::ONE);
        let (vertices, triangles) = weld(&mesh.positions, &mesh.indices);
        let normals = PseudoNormals::compute(&vertices, &triangles);

        let corner = vertices.iter().position(|&v| v == Vec3::ONE).unwrap();
        let expected = Vec3::ONE.normalize();
        assert!((normals.vertex[corner] - expected).length() < 1e-5);

        // Every edge of a closed mesh is shared by two faces
        for n in normals.edge.values() {
            assert!(n.length() > 0.5);
        }
        assert_eq!(normals.edge.len(), 18);
    }
}
