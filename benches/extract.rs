use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, black_box};

use sdf_terrain::extract::{ChunkMesh, ExtractInput, extract};
use sdf_terrain::mesh::SourceMesh;
use sdf_terrain::mesh_sdf::MeshSdfData;
use sdf_terrain::voxel::{BufferPool, ChunkIndex, Grid, GridConfig, Kernel, KernelMode, voxel_index};

use glam::Vec3;

fn sphere_field(r: usize, radius: f32) -> (Vec<f32>, Vec<u8>) {
    let center = Vec3::splat((r - 1) as f32 * 0.5);
    let mut distances = vec![0.0; r * r * r];
    for z in 0..r {
        for y in 0..r {
            for x in 0..r {
                let p = Vec3::new(x as f32, y as f32, z as f32);
                distances[voxel_index(r, x, y, z)] = (p.distance(center) - radius).clamp(-2.0, 2.0);
            }
        }
    }
    let materials = (0..r * r * r).map(|i| (i % 4) as u8).collect();
    (distances, materials)
}

fn bench_extract(c: &mut Criterion, r: usize) {
    let pool = BufferPool::new(r);
    let (distances, materials) = sphere_field(r, r as f32 * 0.4);
    let input = ExtractInput {
        distances: &distances,
        materials: &materials,
        resolution: r,
        offset: Vec3::ZERO,
        voxel_size: 1.0,
    };

    c.bench_function(&format!("surface_nets_sphere_{}", r), |b| {
        b.iter(|| {
            let mut mesh = ChunkMesh::acquire(&pool);
            extract(black_box(&input), &mut mesh, &pool);
            black_box(mesh.quad_count());
            mesh.release(&pool);
        });
    });
}

fn bench_extract_32(c: &mut Criterion) {
    bench_extract(c, 32);
}

fn bench_extract_64(c: &mut Criterion) {
    bench_extract(c, 64);
}

fn grid(r: u32) -> Grid {
    let mut grid = Grid::new(GridConfig::with_resolution(r), Arc::new(BufferPool::new(r as usize)))
        .expect("valid grid config");
    for z in -1..=1 {
        for y in -1..=1 {
            for x in -1..=1 {
                grid.add_chunk(ChunkIndex::new(x, y, z));
            }
        }
    }
    grid.compress_all_chunks();
    grid
}

fn bench_sphere_kernel_apply(c: &mut Criterion) {
    let mut grid = grid(32);

    c.bench_function("apply_sphere_kernel_r12", |b| {
        let mut mode = KernelMode::Add;
        b.iter(|| {
            let kernel = Kernel::sphere(&grid, black_box(Vec3::splat(15.0)), 12.0, mode, 1);
            black_box(grid.apply_kernel(&kernel));
            mode = if mode == KernelMode::Add { KernelMode::Remove } else { KernelMode::Add };
        });
    });
}

fn bench_mesh_kernel_build(c: &mut Criterion) {
    let grid = grid(32);
    let data = MeshSdfData::bake(&SourceMesh::cuboid(Vec3::new(6.0, 3.0, 4.0))).expect("cuboid bakes");

    c.bench_function("build_mesh_kernel_cuboid", |b| {
        b.iter(|| {
            let kernel = Kernel::mesh(
                &grid,
                black_box(&data),
                Default::default(),
                KernelMode::Add,
                2,
            );
            black_box(kernel.voxel_count());
        });
    });
}

fn bench_rebuild_dirty(c: &mut Criterion) {
    let mut grid = grid(32);
    let kernel = Kernel::sphere(&grid, Vec3::splat(15.0), 20.0, KernelMode::Add, 1);
    grid.apply_kernel(&kernel);
    let touched = grid.chunk_indices();

    c.bench_function("rebuild_dirty_27_chunks", |b| {
        b.iter(|| {
            for &index in &touched {
                grid.mark_dirty(index);
            }
            let meshes = grid.rebuild_dirty();
            for (_, mesh) in meshes {
                mesh.release(grid.pool());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_extract_32,
    bench_extract_64,
    bench_sphere_kernel_apply,
    bench_mesh_kernel_build,
    bench_rebuild_dirty,
);
criterion_main!(benches);
