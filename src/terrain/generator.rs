//! Noise-based heightfield terrain written into grid chunks

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rayon::prelude::*;

use crate::core::types::Vec3;
use crate::voxel::chunk::ChunkIndex;
use crate::voxel::grid::Grid;

/// Parameters controlling terrain generation
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical range above base_height
    pub base_height: f32,
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub material: u8,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 100.0,
            height_scale: 64.0,
            base_height: 0.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            material: 1,
        }
    }
}

/// Procedural heightfield using fractal Brownian motion (FBM)
pub struct TerrainGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Terrain height at world position (x, z)
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let nz = (z / self.params.scale) as f64;

        // Noise is in [-1, 1]; map to [0, height_scale]
        let normalized = ((self.noise.get([nx, nz]) + 1.0) / 2.0).clamp(0.0, 1.0);
        self.params.base_height + (normalized * self.params.height_scale as f64) as f32
    }

    /// Vertical signed distance to the surface; negative below ground
    pub fn density(&self, world: Vec3) -> f32 {
        world.y - self.height_at(world.x, world.z)
    }

    /// Overwrite one chunk with the heightfield. Returns false if the chunk
    /// does not exist.
    pub fn fill_chunk(&self, grid: &mut Grid, index: ChunkIndex) -> bool {
        grid.fill_chunk_with(index, self.params.material, |world| self.density(world))
    }

    /// Overwrite every chunk in `indices` that exists, returning how many
    /// were written.
    pub fn fill_chunks(&self, grid: &mut Grid, indices: &[ChunkIndex]) -> usize {
        let start = std::time::Instant::now();
        let filled = indices.iter().filter(|&&index| self.fill_chunk(grid, index)).count();
        log::info!(
            "Generated {} chunks in {:.1}ms ({} hot)",
            filled,
            start.elapsed().as_secs_f64() * 1000.0,
            grid.hot_chunk_count()
        );
        filled
    }

    /// Recenter the grid on `center` and generate every chunk that entered.
    ///
    /// Returns the regenerated chunk indices in ascending order.
    pub fn generate_around(&self, grid: &mut Grid, center: ChunkIndex, radius: i32) -> Vec<ChunkIndex> {
        let regenerate = grid.recenter(center, radius);
        self.fill_chunks(grid, &regenerate);
        regenerate
    }

    /// Min/max height over a grid of samples covering an XZ rectangle
    pub fn height_bounds(&self, min_x: f32, max_x: f32, min_z: f32, max_z: f32, samples: usize) -> (f32, f32) {
        let n = samples.max(2);
        let step_x = (max_x - min_x) / (n - 1) as f32;
        let step_z = (max_z - min_z) / (n - 1) as f32;

        (0..n * n)
            .into_par_iter()
            .map(|i| {
                let h = self.height_at(min_x + (i % n) as f32 * step_x, min_z + (i / n) as f32 * step_z);
                (h, h)
            })
            .reduce(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            )
    }
}
