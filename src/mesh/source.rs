//! Source meshes handed to the Mesh-SDF baker

use crate::core::types::Vec3;
use crate::math::Aabb;

/// Primitive layout of a source mesh's index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// Every three indices form a triangle
    #[default]
    Triangles,
    /// Every four indices form a quad
    Quads,
    /// Faces of varying corner count
    Polygons,
    Lines,
    Points,
}

/// Indexed mesh in its own local space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl SourceMesh {
    /// Triangle mesh from positions and index triples
    pub fn triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            topology: Topology::Triangles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Number of whole triangles (0 for other topologies)
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            _ => 0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Axis-aligned box with outward-facing, counter-clockwise triangles
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let positions = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 != 0 { h.x } else { -h.x },
                    if i & 2 != 0 { h.y } else { -h.y },
                    if i & 4 != 0 { h.z } else { -h.z },
                )
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 3, 0, 3, 1, // -Z
            4, 5, 7, 4, 7, 6, // +Z
            0, 1, 5, 0, 5, 4, // -Y
            2, 6, 7, 2, 7, 3, // +Y
            0, 4, 6, 0, 6, 2, // -X
            1, 3, 7, 1, 7, 5, // +X
        ];
        Self::triangles(positions, indices)
    }
}
