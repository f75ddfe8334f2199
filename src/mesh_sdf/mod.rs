//! Mesh-SDF baker
//!
//! Turns a triangle mesh into data that answers exact signed distance queries:
//! welded vertices, pseudo-normals for the inside test and a bounding-sphere
//! hierarchy for nearest-point search. Baked data is immutable and can be
//! shared across threads while kernels sample it.
//!
//! The inside test assumes a closed, consistently wound mesh. Zero-area
//! triangles are not filtered; queries near them still return finite results
//! but their zero normals cannot vote inside.

pub mod bvh;
pub mod normals;
pub mod query;

pub use bvh::BvhNode;
pub use normals::{EdgeKey, PseudoNormals};
pub use query::{Feature, NearestPoint, SignedDistance, closest_point_on_triangle};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::math::Aabb;
use crate::mesh::{SourceMesh, Topology};

/// Baked signed distance data of one mesh
#[derive(Debug, Clone)]
pub struct MeshSdfData {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    nodes: Vec<BvhNode>,
    normals: PseudoNormals,
    bounds: Aabb,
}

impl MeshSdfData {
    /// Validate and bake a source mesh.
    pub fn bake(mesh: &SourceMesh) -> Result<Self> {
        let start = std::time::Instant::now();

        if let Err(e) = validate(mesh) {
            log::warn!("Mesh bake rejected: {}", e);
            return Err(e);
        }

        let (vertices, triangles) = normals::weld(&mesh.positions, &mesh.indices);
        let normals = PseudoNormals::compute(&vertices, &triangles);
        let nodes = bvh::build(&vertices, &triangles);
        let bounds = Aabb::from_points(vertices.iter().copied());

        log::info!(
            "Baked mesh SDF: {} triangles, {} vertices ({} welded), {} BVH nodes in {:.1}ms",
            triangles.len(),
            vertices.len(),
            mesh.positions.len() - vertices.len(),
            nodes.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self {
            vertices,
            triangles,
            nodes,
            normals,
            bounds,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Flattened BVH, root first
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn normals(&self) -> &PseudoNormals {
        &self.normals
    }

    /// Mesh-local bounds of the welded vertices
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Corner positions of triangle `t`
    #[inline]
    pub fn triangle_positions(&self, t: usize) -> [Vec3; 3] {
        self.triangles[t].map(|i| self.vertices[i as usize])
    }
}

fn validate(mesh: &SourceMesh) -> Result<()> {
    if mesh.topology != Topology::Triangles {
        return Err(Error::Mesh(format!("expected triangles, got {:?}", mesh.topology)));
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(Error::Mesh(format!(
            "index count {} is not a multiple of 3",
            mesh.indices.len()
        )));
    }
    if mesh.is_empty() {
        return Err(Error::Mesh("mesh has no triangles".to_string()));
    }
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= mesh.positions.len()) {
        return Err(Error::Mesh(format!(
            "index {} out of range for {} vertices",
            bad,
            mesh.positions.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bake_cube() {
        let data = MeshSdfData::bake(&SourceMesh::cuboid(Vec3::ONE)).unwrap();
        assert_eq!(data.triangle_count(), 12);
        assert_eq!(data.vertices().len(), 8);
        assert_eq!(data.nodes().len(), 23);
        assert_eq!(data.bounds().min, Vec3::splat(-1.0));
        assert_eq!(data.bounds().max, Vec3::ONE);
    }

    #[test]
    fn test_bake_rejects_invalid_meshes() {
        let mut quads = SourceMesh::cuboid(Vec3::ONE);
        quads.topology = Topology::Quads;
        assert!(matches!(MeshSdfData::bake(&quads), Err(Error::Mesh(_))));

        let mut ragged = SourceMesh::cuboid(Vec3::ONE);
        ragged.indices.pop();
        assert!(matches!(MeshSdfData::bake(&ragged), Err(Error::Mesh(_))));

        let mut out_of_range = SourceMesh::cuboid(Vec3::ONE);
        out_of_range.indices[0] = 99;
        assert!(matches!(MeshSdfData::bake(&out_of_range), Err(Error::Mesh(_))));

        assert!(matches!(MeshSdfData::bake(&SourceMesh::default()), Err(Error::Mesh(_))));
    }

    #[test]
    fn test_obj_polygons_are_rejected() {
        let quad = crate::mesh::parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert!(MeshSdfData::bake(&quad).is_err());
    }
}
