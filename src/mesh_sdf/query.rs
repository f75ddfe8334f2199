//! Nearest-point and signed-distance queries against baked mesh data

use crate::core::types::Vec3;

use super::MeshSdfData;
use super::normals::edge_key;

/// Part of a triangle the nearest point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Interior of the triangle
    Face,
    /// Edge 0 = (a, b), 1 = (b, c), 2 = (c, a)
    Edge(u8),
    /// Corner 0 = a, 1 = b, 2 = c
    Vertex(u8),
}

/// Closest surface point found for a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    pub position: Vec3,
    pub distance_squared: f32,
    pub triangle: usize,
    pub feature: Feature,
}

/// Result of a signed distance query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedDistance {
    /// Nearest point on the surface
    pub position: Vec3,
    /// Negative inside the mesh
    pub distance: f32,
    pub inside: bool,
    pub triangle: usize,
    pub feature: Feature,
}

impl MeshSdfData {
    /// Closest point on the mesh to `p`.
    ///
    /// Depth-first over the BVH with an explicit stack; the nearer child is
    /// visited first and nodes whose sphere cannot beat the current best are
    /// skipped.
    pub fn nearest_point(&self, p: Vec3) -> NearestPoint {
        let mut best = NearestPoint {
            position: p,
            distance_squared: f32::INFINITY,
            triangle: 0,
            feature: Feature::Face,
        };
        if self.nodes.is_empty() {
            return best;
        }

        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            let bound = node.distance_lower_bound(p);
            if bound * bound > best.distance_squared {
                continue;
            }

            if let Some(tri) = node.triangle() {
                let [a, b, c] = self.triangle_positions(tri);
                let (position, feature) = closest_point_on_triangle(p, a, b, c);
                let distance_squared = p.distance_squared(position);
                if distance_squared < best.distance_squared {
                    best = NearestPoint {
                        position,
                        distance_squared,
                        triangle: tri,
                        feature,
                    };
                }
                continue;
            }

            let (left, right) = (node.left as usize, node.right as usize);
            let dl = self.nodes[left].distance_lower_bound(p);
            let dr = self.nodes[right].distance_lower_bound(p);
            if dl <= dr {
                stack.push(right);
                stack.push(left);
            } else {
                stack.push(left);
                stack.push(right);
            }
        }

        best
    }

    /// Whether `p` is inside the mesh, judged by the pseudo-normal of the
    /// feature its nearest point lies on.
    pub fn is_inside(&self, p: Vec3, nearest: &NearestPoint) -> bool {
        let normal = self.feature_normal(nearest.triangle, nearest.feature);
        (nearest.position - p).dot(normal) > 0.0
    }

    /// Signed distance from `p` to the mesh surface
    pub fn signed_distance(&self, p: Vec3) -> SignedDistance {
        let nearest = self.nearest_point(p);
        let inside = self.is_inside(p, &nearest);
        let distance = nearest.distance_squared.sqrt();
        SignedDistance {
            position: nearest.position,
            distance: if inside { -distance } else { distance },
            inside,
            triangle: nearest.triangle,
            feature: nearest.feature,
        }
    }

    /// Pseudo-normal of a triangle feature
    pub fn feature_normal(&self, triangle: usize, feature: Feature) -> Vec3 {
        let [a, b, c] = self.triangles[triangle];
        match feature {
            Feature::Face => self.normals.face[triangle],
            Feature::Edge(e) => {
                let (i, j) = match e {
                    0 => (a, b),
                    1 => (b, c),
                    _ => (c, a),
                };
                self.normals.edge.get(&edge_key(i, j)).copied().unwrap_or(Vec3::ZERO)
            }
            Feature::Vertex(v) => self.normals.vertex[[a, b, c][v as usize % 3] as usize],
        }
    }
}

/// Closest point on triangle `abc` to `p` and the feature it lies on.
///
/// Voronoi-region walk from Ericson, "Real-Time Collision Detection" §5.1.5.
/// Zero-area triangles are not special-cased: they resolve to an edge or
/// vertex region and still return a finite point.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, Feature) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, Feature::Vertex(0));
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, Feature::Vertex(1));
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, Feature::Edge(0));
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, Feature::Vertex(2));
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, Feature::Edge(2));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, Feature::Edge(1));
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, Feature::Face)
}
