//! Terrain demo: generates a block of terrain, edits it, meshes it and saves it.
//!
//! Usage: cargo run --release --bin terrain_demo -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>   Grid config JSON (default: built-in defaults)
//!   --radius <N>      Chunk radius around the origin (default: 2)
//!   --seed <SEED>     Noise seed (default: 12345)
//!   --scale <SCALE>   Terrain noise scale (default: 100.0)
//!   --height <H>      Terrain height range (default: 24.0)
//!   --carve <R>       Radius of the sphere carved at the origin (default: 8.0)
//!   --mesh <FILE>     OBJ mesh stamped at the origin (optional)
//!   --jobs <N>        Worker threads (default: all cores)
//!   --out <DIR>       Output directory (default: "out/terrain")
//!
//! Output structure:
//!   <out>/
//!     grid.json   # Grid config
//!     grid.bin    # Chunk data
//!     summary.json

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::{Quat, Vec3};
use serde_json::json;

use sdf_terrain::core::{Error, Result};
use sdf_terrain::io::save_grid;
use sdf_terrain::mesh::load_obj;
use sdf_terrain::mesh_sdf::MeshSdfData;
use sdf_terrain::terrain::{TerrainGenerator, TerrainParams};
use sdf_terrain::voxel::{BufferPool, ChunkIndex, FillState, Grid, GridConfig, Kernel, KernelMode, MeshPlacement};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = parse_str_arg(&args, "--config").map(PathBuf::from);
    let radius = parse_arg::<i32>(&args, "--radius").unwrap_or(2);
    let seed = parse_arg::<u32>(&args, "--seed").unwrap_or(12345);
    let scale = parse_arg::<f32>(&args, "--scale").unwrap_or(100.0);
    let height_scale = parse_arg::<f32>(&args, "--height").unwrap_or(24.0);
    let carve = parse_arg::<f32>(&args, "--carve").unwrap_or(8.0);
    let mesh_path = parse_str_arg(&args, "--mesh").map(PathBuf::from);
    let jobs = parse_arg::<usize>(&args, "--jobs");
    let out_dir = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "out/terrain".to_string()));

    if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .map_err(|e| Error::Config(format!("failed to configure thread pool: {}", e)))?;
    }

    let config = match &config_path {
        Some(path) => GridConfig::load_sync(path)?,
        None => GridConfig::default(),
    };

    println!("=== SDF Terrain Demo ===");
    println!("Resolution: {} ({} units per chunk)", config.resolution, config.chunk_size);
    println!("Radius:     {} chunks", radius);
    println!("Seed:       {}", seed);
    println!("Scale: {}, Height: {}", scale, height_scale);
    println!("Output:     {}", out_dir.display());
    println!();

    let pool = Arc::new(BufferPool::new(config.resolution as usize));
    let mut grid = Grid::new(config.clone(), pool.clone())?;

    // Phase 1: terrain
    let start = Instant::now();
    let generator = TerrainGenerator::new(TerrainParams {
        seed,
        scale,
        height_scale,
        ..Default::default()
    });
    let generated = generator.generate_around(&mut grid, ChunkIndex::new(0, 0, 0), radius);
    println!(
        "Terrain: {} chunks in {:.1}ms ({} hot)",
        generated.len(),
        start.elapsed().as_secs_f64() * 1000.0,
        grid.hot_chunk_count()
    );

    // Phase 2: edits
    let start = Instant::now();
    let surface = Vec3::new(0.0, generator.height_at(0.0, 0.0), 0.0);
    let mut touched = 0;
    if carve > 0.0 {
        let sphere = Kernel::sphere(&grid, surface, carve, KernelMode::Remove, 0);
        touched += grid.apply_kernel(&sphere).len();
    }
    let pillar = Kernel::capsule(
        &grid,
        surface + Vec3::new(carve * 1.5, -4.0, 0.0),
        surface + Vec3::new(carve * 1.5, carve, 0.0),
        2.0,
        KernelMode::Add,
        2,
    );
    touched += grid.apply_kernel(&pillar).len();
    let block = Kernel::box_kernel(
        &grid,
        surface + Vec3::new(-carve * 1.5, 0.0, 0.0),
        Vec3::new(3.0, 2.0, 3.0),
        Quat::from_rotation_y(0.5),
        KernelMode::SwapMat,
        3,
    );
    touched += grid.apply_kernel(&block).len();

    if let Some(path) = &mesh_path {
        let data = MeshSdfData::bake(&load_obj(path)?)?;
        let placement = MeshPlacement::new(surface + Vec3::Y * carve, Quat::IDENTITY, 1.0);
        let stamp = Kernel::mesh(&grid, &data, placement, KernelMode::Add, 4);
        touched += grid.apply_kernel(&stamp).len();
    }
    println!("Edits:   {} chunk touches in {:.1}ms", touched, start.elapsed().as_secs_f64() * 1000.0);

    // Phase 3: meshing
    let start = Instant::now();
    let meshes = grid.rebuild_dirty();
    let vertices: usize = meshes.iter().map(|(_, m)| m.vertex_count()).sum();
    let quads: usize = meshes.iter().map(|(_, m)| m.quad_count()).sum();
    let non_empty = meshes.iter().filter(|(_, m)| !m.is_empty()).count();
    println!(
        "Meshes:  {} chunks ({} with surface), {} vertices, {} quads in {:.1}ms",
        meshes.len(),
        non_empty,
        vertices,
        quads,
        start.elapsed().as_secs_f64() * 1000.0
    );
    for (_, mesh) in meshes {
        mesh.release(&pool);
    }

    // Phase 4: save
    std::fs::create_dir_all(&out_dir)?;
    config.save_sync(&out_dir.join("grid.json"))?;
    save_grid(&grid, &out_dir.join("grid.bin"))?;

    let mut states = [0usize; 4];
    for chunk in grid.chunks() {
        let slot = match chunk.fill_state() {
            FillState::Mixed => 0,
            FillState::Empty => 1,
            FillState::SolidSingleMaterial => 2,
            FillState::Solid => 3,
        };
        states[slot] += 1;
    }

    let summary = json!({
        "seed": seed,
        "radius": radius,
        "resolution": config.resolution,
        "chunks": grid.chunk_count(),
        "hot_chunks": grid.hot_chunk_count(),
        "fill_states": {
            "mixed": states[0],
            "empty": states[1],
            "solid_single_material": states[2],
            "solid": states[3],
        },
        "vertices": vertices,
        "quads": quads,
        "pooled_buffers_outstanding": pool.outstanding(),
    });
    let summary = serde_json::to_string_pretty(&summary).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(out_dir.join("summary.json"), summary)?;

    println!();
    println!("=== Done ===");
    println!("Output: {}", out_dir.display());
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
