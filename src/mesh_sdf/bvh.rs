//! Bounding-sphere hierarchy over mesh triangles
//!
//! Flattened into a `Vec` and built without recursion, so deep meshes cannot
//! overflow the stack.

use crate::core::types::Vec3;
use crate::math::{Aabb, BoundingSphere};

/// Sentinel stored in `left` for leaf nodes
pub const LEAF: i32 = -1;

/// BVH node: a bounding sphere plus either two children or one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub center: Vec3,
    pub radius: f32,
    /// Left child index, or [`LEAF`]
    pub left: i32,
    /// Right child index, or the triangle index of a leaf
    pub right: i32,
}

impl BvhNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left == LEAF
    }

    /// Triangle referenced by a leaf
    #[inline]
    pub fn triangle(&self) -> Option<usize> {
        self.is_leaf().then_some(self.right as usize)
    }

    pub fn sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.radius)
    }

    /// Lower bound on the distance from `p` to anything inside this node
    #[inline]
    pub fn distance_lower_bound(&self, p: Vec3) -> f32 {
        (p.distance(self.center) - self.radius).max(0.0)
    }

    fn from_sphere(sphere: BoundingSphere, left: i32, right: i32) -> Self {
        Self {
            center: sphere.center,
            radius: sphere.radius,
            left,
            right,
        }
    }
}

/// Build the hierarchy; node 0 is the root. Returns no nodes for no triangles.
///
/// Each inner node splits its triangles at the median along the longest axis
/// of the AABB of their sphere centers.
pub fn build(vertices: &[Vec3], triangles: &[[u32; 3]]) -> Vec<BvhNode> {
    if triangles.is_empty() {
        return Vec::new();
    }

    let spheres: Vec<BoundingSphere> = triangles
        .iter()
        .map(|t| BoundingSphere::from_points(&t.map(|i| vertices[i as usize])))
        .collect();

    let mut order: Vec<usize> = (0..triangles.len()).collect();
    let placeholder = BvhNode::from_sphere(BoundingSphere::new(Vec3::ZERO, 0.0), LEAF, 0);
    let mut nodes = Vec::with_capacity(triangles.len() * 2 - 1);
    nodes.push(placeholder);

    // (node index, start, end) over `order`
    let mut stack: Vec<(usize, usize, usize)> = vec![(0, 0, triangles.len())];

    while let Some((node, start, end)) = stack.pop() {
        if end - start == 1 {
            let tri = order[start];
            nodes[node] = BvhNode::from_sphere(spheres[tri], LEAF, tri as i32);
            continue;
        }

        let range = &mut order[start..end];
        let members: Vec<BoundingSphere> = range.iter().map(|&t| spheres[t]).collect();
        let centers = Aabb::from_points(members.iter().map(|s| s.center));
        let axis = centers.longest_axis();
        range.sort_unstable_by(|&a, &b| spheres[a].center[axis].total_cmp(&spheres[b].center[axis]));

        let mid = start + (end - start) / 2;
        let left = nodes.len();
        nodes.push(placeholder);
        let right = nodes.len();
        nodes.push(placeholder);

        nodes[node] = BvhNode::from_sphere(BoundingSphere::enclosing(&members), left as i32, right as i32);
        stack.push((right, mid, end));
        stack.push((left, start, mid));
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SourceMesh;
    use crate::mesh_sdf::normals::weld;

    fn subtree_triangles(nodes: &[BvhNode], root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            match nodes[i].triangle() {
                Some(t) => out.push(t),
                None => stack.extend([nodes[i].left as usize, nodes[i].right as usize]),
            }
        }
        out
    }

    #[test]
    fn test_single_triangle_is_leaf_root() {
        let nodes = build(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]]);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].triangle(), Some(0));
    }

    #[test]
    fn test_every_triangle_in_one_leaf() {
        let mesh = SourceMesh::cuboid(Vec3::new(3.0, 1.0, 2.0));
        let (vertices, triangles) = weld(&mesh.positions, &mesh.indices);
        let nodes = build(&vertices, &triangles);
        assert_eq!(nodes.len(), triangles.len() * 2 - 1);

        let mut leaves: Vec<usize> = nodes.iter().filter_map(|n| n.triangle()).collect();
        leaves.sort_unstable();
        assert_eq!(leaves, (0..triangles.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_nodes_enclose_their_triangles() {
        let mesh = SourceMesh::cuboid(Vec3::ONE);
        let (vertices, triangles) = weld(&mesh.positions, &mesh.indices);
        let nodes = build(&vertices, &triangles);

        for (i, node) in nodes.iter().enumerate() {
            for t in subtree_triangles(&nodes, i) {
                for v in triangles[t] {
                    let p = vertices[v as usize];
                    assert!(p.distance(node.center) <= node.radius + 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_empty() {
        assert!(build(&[], &[]).is_empty());
    }
}
