//! Signed distance functions for the kernel primitives.
//!
//! All functions return negative values inside the shape, positive outside,
//! in the same units as their inputs.

use glam::{Quat, Vec3};

/// Distance to a sphere
#[inline]
pub fn sdf_sphere(p: Vec3, center: Vec3, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Distance to a capsule (line segment with radius)
/// Capsule from point `a` to `b` with radius `r`
#[inline]
pub fn sdf_capsule(p: Vec3, a: Vec3, b: Vec3, radius: f32) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return ap.length() - radius;
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (p - closest).length() - radius
}

/// Exact distance to an axis-aligned box centered at the origin
#[inline]
pub fn sdf_box(p: Vec3, half_extents: Vec3) -> f32 {
    let q = p.abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

/// Exact distance to an oriented box
#[inline]
pub fn sdf_oriented_box(p: Vec3, center: Vec3, half_extents: Vec3, rotation: Quat) -> f32 {
    let local = rotation.inverse() * (p - center);
    sdf_box(local, half_extents)
}

/// Distance to a plane at arbitrary position and orientation
/// Normal should be normalized
#[inline]
pub fn sdf_plane_point_normal(p: Vec3, plane_point: Vec3, normal: Vec3) -> f32 {
    (p - plane_point).dot(normal)
}

// =============================================================================
// SDF Combinations
// =============================================================================

/// Union (min of two distances)
#[inline]
pub fn sdf_union(a: f32, b: f32) -> f32 {
    a.min(b)
}

/// Subtraction: a - b (inside a, outside b)
#[inline]
pub fn sdf_subtraction(a: f32, b: f32) -> f32 {
    (-b).max(a)
}

/// Intersection (max of two distances)
#[inline]
pub fn sdf_intersection(a: f32, b: f32) -> f32 {
    a.max(b)
}
