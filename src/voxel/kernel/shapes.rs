//! Kernel builders for primitive shapes and baked meshes
//!
//! Every builder works in grid-local space: world inputs are mapped through
//! the grid's inverse transform, the shape's bounds are inflated by one voxel
//! and snapped to the voxel lattice, and each row of the patch is evaluated
//! as its own rayon task.

use rayon::prelude::*;

use crate::core::types::{Affine3A, IVec3, Quat, Vec3};
use crate::math::Aabb;
use crate::mesh_sdf::MeshSdfData;
use crate::voxel::grid::Grid;
use crate::voxel::sdf;

use super::kernel::Kernel;
use super::mode::KernelMode;

/// Smallest radius (in voxels) that still produces a kernel
const MIN_RADIUS_VOXELS: f32 = 0.25;

/// Placement of a baked mesh in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPlacement {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Uniform scale
    pub scale: f32,
}

impl Default for MeshPlacement {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl MeshPlacement {
    pub fn new(translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self { translation, rotation, scale }
    }

    /// Mesh-local → world transform
    pub fn transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.translation)
    }
}

impl Kernel {
    /// Solid block over global voxels `[start, end)`, every voxel at `min_clamp`.
    pub fn fill(grid: &Grid, start: IVec3, end: IVec3, mode: KernelMode, material: u8) -> Self {
        if end.cmple(start).any() {
            log::debug!("Kernel::fill: empty range {:?}..{:?}", start, end);
            return Kernel::empty(mode);
        }
        let size = end - start;
        let count = (size.x as usize) * (size.y as usize) * (size.z as usize);
        Kernel::from_parts(start, size, vec![grid.min_clamp(); count], material, mode)
    }

    /// Sphere with world-space center and radius
    pub fn sphere(grid: &Grid, center: Vec3, radius: f32, mode: KernelMode, material: u8) -> Self {
        let center = grid.world_to_local(center);
        let radius = radius / grid.local_scale();
        if radius < MIN_RADIUS_VOXELS * grid.voxel_size() {
            log::debug!("Kernel::sphere: radius {} below a quarter voxel", radius);
            return Kernel::empty(mode);
        }

        let bounds = Aabb::from_center_half_extent(center, Vec3::splat(radius));
        build(grid, bounds, mode, material, |p| sdf::sdf_sphere(p, center, radius))
    }

    /// Box with world-space center, half extents and orientation
    pub fn box_kernel(
        grid: &Grid,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        mode: KernelMode,
        material: u8,
    ) -> Self {
        if half_extents.cmple(Vec3::ZERO).any() {
            log::debug!("Kernel::box_kernel: non-positive extents {:?}", half_extents);
            return Kernel::empty(mode);
        }

        let (_, grid_rotation, _) = grid.transform().to_scale_rotation_translation();
        let center = grid.world_to_local(center);
        let half_extents = half_extents / grid.local_scale();
        let rotation = (grid_rotation.inverse() * rotation).normalize();

        let placement = Affine3A::from_rotation_translation(rotation, center);
        let bounds = Aabb::from_center_half_extent(Vec3::ZERO, half_extents).transformed(&placement);
        build(grid, bounds, mode, material, |p| {
            sdf::sdf_oriented_box(p, center, half_extents, rotation)
        })
    }

    /// Capsule between two world-space points
    pub fn capsule(grid: &Grid, a: Vec3, b: Vec3, radius: f32, mode: KernelMode, material: u8) -> Self {
        let a = grid.world_to_local(a);
        let b = grid.world_to_local(b);
        let radius = radius / grid.local_scale();
        if radius < MIN_RADIUS_VOXELS * grid.voxel_size() {
            log::debug!("Kernel::capsule: radius {} below a quarter voxel", radius);
            return Kernel::empty(mode);
        }

        let bounds = Aabb::from_points([a, b]).inflated(radius);
        build(grid, bounds, mode, material, |p| sdf::sdf_capsule(p, a, b, radius))
    }

    /// Baked mesh placed in world space.
    ///
    /// The surface is pushed out by half a voxel so thin features survive
    /// sampling.
    pub fn mesh(
        grid: &Grid,
        data: &MeshSdfData,
        placement: MeshPlacement,
        mode: KernelMode,
        material: u8,
    ) -> Self {
        if !(placement.scale > 0.0) {
            log::debug!("Kernel::mesh: non-positive scale {}", placement.scale);
            return Kernel::empty(mode);
        }
        if data.triangle_count() == 0 {
            log::debug!("Kernel::mesh: no triangles");
            return Kernel::empty(mode);
        }

        let mesh_to_world = placement.transform();
        let world_to_mesh = mesh_to_world.inverse();
        let grid_to_world = grid.transform();
        let mesh_to_local = grid_to_world.inverse() * mesh_to_world;

        let bounds = data.bounds().transformed(&mesh_to_local);
        let to_local_units = placement.scale / grid.local_scale();
        let half_voxel = 0.5 * grid.voxel_size();

        build(grid, bounds, mode, material, |p| {
            let mesh_point = world_to_mesh.transform_point3(grid_to_world.transform_point3(p));
            data.signed_distance(mesh_point).distance * to_local_units - half_voxel
        })
    }
}

/// Evaluate `distance` (grid-local point → grid-local distance) over the
/// lattice voxels covering `bounds` plus one voxel of margin.
fn build<F>(grid: &Grid, bounds: Aabb, mode: KernelMode, material: u8, distance: F) -> Kernel
where
    F: Fn(Vec3) -> f32 + Sync,
{
    let voxel_size = grid.voxel_size();
    let (start, end) = bounds.inflated(voxel_size).voxel_range(voxel_size);
    let size = end - start;
    if size.cmple(IVec3::ZERO).any() {
        return Kernel::empty(mode);
    }

    let (min_clamp, max_clamp) = (grid.min_clamp(), grid.max_clamp());
    let row = size.x as usize;
    let rows_per_slice = size.y as usize;
    let mut distances = vec![0.0f32; row * rows_per_slice * size.z as usize];

    distances
        .par_chunks_mut(row)
        .enumerate()
        .for_each(|(r, out)| {
            let y = (r % rows_per_slice) as i32;
            let z = (r / rows_per_slice) as i32;
            for (x, d) in out.iter_mut().enumerate() {
                let global = start + IVec3::new(x as i32, y, z);
                let p = global.as_vec3() * voxel_size;
                *d = distance(p).clamp(min_clamp, max_clamp);
            }
        });

    log::trace!("Built kernel {:?} at {:?} ({:?})", size, start, mode);
    Kernel::from_parts(start, size, distances, material, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::config::GridConfig;
    use crate::voxel::pool::BufferPool;
    use std::sync::Arc;

    fn grid() -> Grid {
        Grid::new(GridConfig::with_resolution(16), Arc::new(BufferPool::new(16))).unwrap()
    }

    #[test]
    fn test_fill_kernel() {
        let grid = grid();
        let k = Kernel::fill(&grid, IVec3::new(1, 2, 3), IVec3::new(4, 4, 4), KernelMode::Add, 2);
        assert_eq!(k.size(), IVec3::new(3, 2, 1));
        assert_eq!(k.index_offset(), IVec3::new(1, 2, 3));
        assert!(k.distances().iter().all(|&d| d == grid.min_clamp()));
        assert_eq!(k.materials(), &[2]);
    }

    #[test]
    fn test_degenerate_inputs_give_empty_kernels() {
        let grid = grid();
        assert!(Kernel::fill(&grid, IVec3::ONE, IVec3::new(2, 1, 2), KernelMode::Add, 1).is_empty());
        assert!(Kernel::sphere(&grid, Vec3::ZERO, 0.2, KernelMode::Add, 1).is_empty());
        assert!(
            Kernel::box_kernel(&grid, Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), Quat::IDENTITY, KernelMode::Add, 1)
                .is_empty()
        );
        assert!(Kernel::capsule(&grid, Vec3::ZERO, Vec3::X, 0.1, KernelMode::Add, 1).is_empty());
    }

    #[test]
    fn test_sphere_kernel_values() {
        let grid = grid();
        let center = Vec3::new(5.0, 5.0, 5.0);
        let k = Kernel::sphere(&grid, center, 3.0, KernelMode::Add, 1);
        // Bounds [2, 8] inflated by one voxel: voxels 1..=9
        assert_eq!(k.index_offset(), IVec3::splat(1));
        assert_eq!(k.size(), IVec3::splat(9));

        let at_center = k.distances()[k.index_of(IVec3::splat(4))];
        assert_eq!(at_center, grid.min_clamp());
        let on_surface = k.distances()[k.index_of(IVec3::new(7, 4, 4))];
        assert!(on_surface.abs() < 1e-5);
        let corner = k.distances()[k.index_of(IVec3::ZERO)];
        assert_eq!(corner, grid.max_clamp());
    }

    #[test]
    fn test_box_kernel_rotated() {
        let grid = grid();
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let k = Kernel::box_kernel(&grid, Vec3::splat(6.0), Vec3::splat(2.0), rotation, KernelMode::Add, 1);
        assert!(!k.is_empty());
        let center = IVec3::splat(6) - k.index_offset();
        assert_eq!(k.distances()[k.index_of(center)], -2.0);
        // Rotated corners widen the X/Z extent beyond the axis-aligned half size
        assert!(k.size().x > k.size().y);
    }

    #[test]
    fn test_capsule_kernel_contains_segment() {
        let grid = grid();
        let k = Kernel::capsule(&grid, Vec3::new(2.0, 5.0, 5.0), Vec3::new(10.0, 5.0, 5.0), 1.0, KernelMode::Add, 1);
        let mid = IVec3::new(6, 5, 5) - k.index_offset();
        assert!((k.distances()[k.index_of(mid)] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_respects_grid_scale() {
        let config = GridConfig {
            scale: 2.0,
            ..GridConfig::with_resolution(16)
        };
        let grid = Grid::new(config, Arc::new(BufferPool::new(16))).unwrap();
        // World radius 4 is grid-local radius 2
        let k = Kernel::sphere(&grid, Vec3::splat(10.0), 4.0, KernelMode::Add, 1);
        assert_eq!(k.size(), IVec3::splat(7));
    }
}
