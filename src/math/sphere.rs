//! Bounding spheres built with Ritter's algorithm

use crate::core::types::Vec3;

/// Sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Ritter's approximate bounding sphere of a point set.
    ///
    /// Returns a zero sphere at the origin for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::new(Vec3::ZERO, 0.0);
        };

        let farthest_from = |from: Vec3| {
            points
                .iter()
                .copied()
                .max_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
                .unwrap_or(from)
        };
        let a = farthest_from(first);
        let b = farthest_from(a);

        let mut sphere = Self::new((a + b) * 0.5, a.distance(b) * 0.5);
        for &p in points {
            sphere.grow_to_point(p);
        }
        sphere
    }

    /// Ritter's approximate bounding sphere of a set of spheres
    pub fn enclosing(spheres: &[BoundingSphere]) -> Self {
        let Some(first) = spheres.first() else {
            return Self::new(Vec3::ZERO, 0.0);
        };

        let farthest_from = |from: Vec3| {
            spheres
                .iter()
                .copied()
                .max_by(|a, b| {
                    let da = a.center.distance(from) + a.radius;
                    let db = b.center.distance(from) + b.radius;
                    da.total_cmp(&db)
                })
                .unwrap_or(*first)
        };
        let a = farthest_from(first.center);
        let b = farthest_from(a.center);

        let mut sphere = a;
        sphere.grow_to_sphere(&b);
        for s in spheres {
            sphere.grow_to_sphere(s);
        }
        sphere
    }

    /// Smallest enlargement of `self` that also contains `p`
    pub fn grow_to_point(&mut self, p: Vec3) {
        self.grow_to_sphere(&BoundingSphere::new(p, 0.0));
    }

    /// Smallest enlargement of `self` that also contains `other`
    pub fn grow_to_sphere(&mut self, other: &BoundingSphere) {
        let offset = other.center - self.center;
        let d = offset.length();
        if d + other.radius <= self.radius {
            return;
        }
        if d <= f32::EPSILON {
            self.radius = self.radius.max(other.radius);
            return;
        }
        let new_radius = (self.radius + d + other.radius) * 0.5;
        self.center += offset / d * (new_radius - self.radius);
        self.radius = new_radius;
    }

    /// Distance from `p` to the sphere surface, zero inside
    pub fn distance_lower_bound(&self, p: Vec3) -> f32 {
        (p.distance(self.center) - self.radius).max(0.0)
    }
}
