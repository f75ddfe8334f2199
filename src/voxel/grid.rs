//! Grid - sparse map of overlapping SDF chunks
//!
//! Chunks are keyed by integer index and overlap their neighbours by two voxel
//! layers, so chunk `c` local voxel `l` is the global voxel `c·(R-2) + l`.
//! Distances are stored in grid-local units; `transform` maps grid-local space
//! into the world (uniform scale).

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;

use crate::core::error::Error;
use crate::core::types::{Affine3A, IVec3, Result, Vec3};
use crate::voxel::chunk::{Chunk, ChunkData, ChunkIndex, voxel_index};
use crate::voxel::config::GridConfig;
use crate::voxel::dirty::DirtyTracker;
use crate::voxel::pool::BufferPool;

/// Value of the field at one voxel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelSample {
    /// Signed distance in world units
    pub distance: f32,
    pub material: u8,
}

/// Read-only solid/empty queries over world space
pub trait Occupancy {
    /// Whether the voxel nearest to `world` is inside the surface
    fn is_solid(&self, world: Vec3) -> bool;
}

/// Sparse chunked signed distance field
#[derive(Debug)]
pub struct Grid {
    config: GridConfig,
    resolution: usize,
    voxel_size: f32,
    transform: Affine3A,
    inverse: Affine3A,
    local_scale: f32,
    pool: Arc<BufferPool>,
    chunks: HashMap<ChunkIndex, Chunk>,
    dirty: DirtyTracker,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// Fails if the config is invalid or the pool was built for another
    /// resolution.
    pub fn new(config: GridConfig, pool: Arc<BufferPool>) -> Result<Self> {
        config.validate()?;
        let resolution = config.resolution as usize;
        if pool.resolution() != resolution {
            return Err(Error::Config(format!(
                "pool resolution {} does not match grid resolution {}",
                pool.resolution(),
                resolution
            )));
        }

        let transform = config.transform();
        log::info!(
            "Created grid: resolution {}, voxel size {:.3}, clamps [{}, {}]",
            resolution,
            config.voxel_size(),
            config.min_clamp,
            config.max_clamp
        );

        Ok(Self {
            resolution,
            voxel_size: config.voxel_size(),
            inverse: transform.inverse(),
            local_scale: transform.matrix3.x_axis.length(),
            transform,
            config,
            pool,
            chunks: HashMap::new(),
            dirty: DirtyTracker::new(),
        })
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Voxels per chunk side (R)
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Global voxels advanced per chunk (R-2)
    pub fn stride(&self) -> i32 {
        self.resolution as i32 - 2
    }

    /// Voxel spacing in grid-local units
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    pub fn min_clamp(&self) -> f32 {
        self.config.min_clamp
    }

    pub fn max_clamp(&self) -> f32 {
        self.config.max_clamp
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Grid-local → world transform
    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    /// Replace the grid-local → world transform.
    ///
    /// Stored distances are grid-local, so the field moves with the grid.
    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
        self.inverse = transform.inverse();
        self.local_scale = transform.matrix3.x_axis.length();
    }

    /// World units per grid-local unit
    pub fn local_scale(&self) -> f32 {
        self.local_scale
    }

    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        self.inverse.transform_point3(world)
    }

    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.transform.transform_point3(local)
    }

    /// Grid-local position of a chunk's voxel (0, 0, 0)
    pub fn chunk_origin(&self, index: ChunkIndex) -> Vec3 {
        (index.as_ivec3() * self.stride()).as_vec3() * self.voxel_size
    }

    /// Grid-local position of a global voxel
    pub fn voxel_position(&self, global: IVec3) -> Vec3 {
        global.as_vec3() * self.voxel_size
    }

    // ---------------------------------------------------------------------
    // Chunk lifecycle
    // ---------------------------------------------------------------------

    pub fn chunk(&self, index: ChunkIndex) -> Option<&Chunk> {
        self.chunks.get(&index)
    }

    pub fn contains_chunk(&self, index: ChunkIndex) -> bool {
        self.chunks.contains_key(&index)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks currently owning buffers
    pub fn hot_chunk_count(&self) -> usize {
        self.chunks.values().filter(|c| c.is_hot()).count()
    }

    /// All chunk indices in sorted order
    pub fn chunk_indices(&self) -> Vec<ChunkIndex> {
        let mut indices: Vec<ChunkIndex> = self.chunks.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Add an empty chunk (all `max_clamp`, material 0) and mark it dirty.
    ///
    /// Adding an index that already exists returns the existing chunk.
    pub fn add_chunk(&mut self, index: ChunkIndex) -> &Chunk {
        match self.chunks.entry(index) {
            Entry::Occupied(entry) => {
                log::warn!("add_chunk: chunk {:?} already exists", index);
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                let mut data = ChunkData::acquire(&self.pool);
                data.fill(self.config.max_clamp, 0);
                self.dirty.mark(index);
                entry.insert(Chunk::new_hot(index, data))
            }
        }
    }

    /// Remove a chunk and return its buffers to the pool.
    pub fn remove_chunk(&mut self, index: ChunkIndex) -> bool {
        let Some(mut chunk) = self.chunks.remove(&index) else {
            log::warn!("remove_chunk: chunk {:?} does not exist", index);
            return false;
        };
        if let Some(data) = chunk.take_data() {
            data.release(&self.pool);
        }
        self.dirty.forget(index);
        true
    }

    /// Move a chunk (and its buffers) to a new index.
    pub fn change_chunk_index(&mut self, old: ChunkIndex, new: ChunkIndex) -> bool {
        if self.chunks.contains_key(&new) {
            log::warn!("change_chunk_index: target {:?} already exists", new);
            return false;
        }
        let Some(mut chunk) = self.chunks.remove(&old) else {
            log::warn!("change_chunk_index: chunk {:?} does not exist", old);
            return false;
        };
        chunk.set_index(new);
        self.chunks.insert(new, chunk);
        self.dirty.forget(old);
        self.dirty.mark(new);
        true
    }

    /// Release every chunk
    pub fn clear(&mut self) {
        for (_, mut chunk) in self.chunks.drain() {
            if let Some(data) = chunk.take_data() {
                data.release(&self.pool);
            }
        }
        self.dirty.clear();
    }

    // ---------------------------------------------------------------------
    // Hot / cold transitions
    // ---------------------------------------------------------------------

    /// Give every cold chunk in `indices` buffers filled from its fill state.
    pub fn force_chunk_data(&mut self, indices: &[ChunkIndex]) {
        let (min_clamp, max_clamp) = (self.config.min_clamp, self.config.max_clamp);
        let cold: Vec<&mut Chunk> = select_mut(&mut self.chunks, indices)
            .into_iter()
            .filter(|chunk| !chunk.is_hot())
            .collect();
        if cold.is_empty() {
            return;
        }

        let count = cold.len();
        let buffers: Vec<ChunkData> = (0..count).map(|_| ChunkData::acquire(&self.pool)).collect();
        cold.into_par_iter()
            .zip(buffers)
            .for_each(|(chunk, data)| chunk.promote(data, min_clamp, max_clamp));

        log::debug!("Promoted {} cold chunks", count);
    }

    /// Classify every hot chunk in `indices`; uniform ones release buffers.
    pub fn try_remove_chunk_data(&mut self, indices: &[ChunkIndex]) {
        let released: Vec<ChunkData> = select_mut(&mut self.chunks, indices)
            .into_par_iter()
            .filter_map(|chunk| chunk.compress())
            .collect();

        if !released.is_empty() {
            log::debug!("Compressed {} uniform chunks", released.len());
        }
        for data in released {
            data.release(&self.pool);
        }
    }

    pub fn force_all_chunk_data(&mut self) {
        let indices = self.chunk_indices();
        self.force_chunk_data(&indices);
    }

    pub fn compress_all_chunks(&mut self) {
        let indices = self.chunk_indices();
        self.try_remove_chunk_data(&indices);
    }

    /// Disjoint mutable borrows of the chunks in `indices` that exist
    pub(crate) fn chunks_mut(&mut self, indices: &[ChunkIndex]) -> Vec<&mut Chunk> {
        select_mut(&mut self.chunks, indices)
    }

    // ---------------------------------------------------------------------
    // Dirty tracking
    // ---------------------------------------------------------------------

    pub fn mark_dirty(&mut self, index: ChunkIndex) {
        self.dirty.mark(index);
    }

    /// Take the chunks changed since the last call, sorted
    pub fn take_dirty(&mut self) -> Vec<ChunkIndex> {
        self.dirty.take()
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    // ---------------------------------------------------------------------
    // Bulk fill and queries
    // ---------------------------------------------------------------------

    /// Overwrite a chunk from a world-space distance function.
    ///
    /// `distance` receives world positions and returns world-space distances;
    /// every voxel gets `material`. Returns false if the chunk does not exist.
    pub fn fill_chunk_with<F>(&mut self, index: ChunkIndex, material: u8, distance: F) -> bool
    where
        F: Fn(Vec3) -> f32 + Sync,
    {
        if !self.chunks.contains_key(&index) {
            log::warn!("fill_chunk_with: chunk {:?} does not exist", index);
            return false;
        }
        self.force_chunk_data(&[index]);

        let r = self.resolution;
        let origin = self.chunk_origin(index);
        let voxel_size = self.voxel_size;
        let transform = self.transform;
        let inv_scale = 1.0 / self.local_scale;
        let (min_clamp, max_clamp) = (self.config.min_clamp, self.config.max_clamp);

        if let Some(chunk) = self.chunks.get_mut(&index) {
            if let Some(data) = chunk.data_mut() {
                data.distances
                    .par_chunks_mut(r)
                    .enumerate()
                    .for_each(|(row, distances)| {
                        let y = row % r;
                        let z = row / r;
                        for (x, d) in distances.iter_mut().enumerate() {
                            let local = origin + Vec3::new(x as f32, y as f32, z as f32) * voxel_size;
                            let world = transform.transform_point3(local);
                            *d = (distance(world) * inv_scale).clamp(min_clamp, max_clamp);
                        }
                    });
                data.materials.fill(material);
            }
            chunk.mark_mixed();
        }

        self.dirty.mark(index);
        self.try_remove_chunk_data(&[index]);
        true
    }

    /// Sample the voxel nearest to a world position.
    ///
    /// Cold chunks answer from their fill state. Returns `None` outside the
    /// stored chunks.
    pub fn sample(&self, world: Vec3) -> Option<VoxelSample> {
        let local = self.world_to_local(world) / self.voxel_size;
        let global = local.round().as_ivec3();
        let (chunk, l) = self.chunk_containing(global)?;

        let distance = match chunk.data() {
            Some(data) => {
                let i = voxel_index(self.resolution, l.x as usize, l.y as usize, l.z as usize);
                return Some(VoxelSample {
                    distance: data.distances[i] * self.local_scale,
                    material: data.materials[i],
                });
            }
            None => chunk.uniform_distance(self.config.min_clamp, self.config.max_clamp),
        };
        Some(VoxelSample {
            distance: distance * self.local_scale,
            material: chunk.fill_material(),
        })
    }

    /// Find a chunk storing `global`, preferring the one where it is interior
    fn chunk_containing(&self, global: IVec3) -> Option<(&Chunk, IVec3)> {
        let s = self.stride();
        let r = self.resolution as i32;
        let primary = (global - IVec3::ONE).div_euclid(IVec3::splat(s));

        let candidates = |axis: usize| -> Vec<i32> {
            [primary[axis], primary[axis] - 1, primary[axis] + 1]
                .into_iter()
                .filter(|c| (0..r).contains(&(global[axis] - c * s)))
                .collect()
        };
        let (xs, ys, zs) = (candidates(0), candidates(1), candidates(2));

        for &cz in &zs {
            for &cy in &ys {
                for &cx in &xs {
                    let index = ChunkIndex::new(cx, cy, cz);
                    if let Some(chunk) = self.chunks.get(&index) {
                        return Some((chunk, global - index.as_ivec3() * s));
                    }
                }
            }
        }
        None
    }

    // ---------------------------------------------------------------------
    // Chunk-radius replacement
    // ---------------------------------------------------------------------

    /// Keep exactly the chunks within Chebyshev `radius` of `center`.
    ///
    /// Chunks that fell outside are re-keyed into missing slots (keeping
    /// their buffers), the surplus is removed and any shortfall added. Returns
    /// the sorted indices whose contents need regenerating.
    pub fn recenter(&mut self, center: ChunkIndex, radius: i32) -> Vec<ChunkIndex> {
        let radius = radius.max(0);
        let mut wanted = Vec::new();
        for z in -radius..=radius {
            for y in -radius..=radius {
                for x in -radius..=radius {
                    wanted.push(center.offset(IVec3::new(x, y, z)));
                }
            }
        }
        let wanted_set: HashSet<ChunkIndex> = wanted.iter().copied().collect();

        let stale: Vec<ChunkIndex> = self
            .chunk_indices()
            .into_iter()
            .filter(|index| !wanted_set.contains(index))
            .collect();
        let missing: Vec<ChunkIndex> = wanted
            .into_iter()
            .filter(|index| !self.chunks.contains_key(index))
            .collect();

        let max_clamp = self.config.max_clamp;
        let mut regenerate = Vec::with_capacity(missing.len());
        let mut stale = stale.into_iter();
        let mut reused = 0;

        for index in missing {
            match stale.next() {
                Some(old) => {
                    self.change_chunk_index(old, index);
                    if let Some(chunk) = self.chunks.get_mut(&index) {
                        chunk.reset_empty(max_clamp);
                    }
                    reused += 1;
                }
                None => {
                    self.add_chunk(index);
                }
            }
            regenerate.push(index);
        }

        let mut removed = 0;
        for old in stale {
            self.remove_chunk(old);
            removed += 1;
        }

        log::info!(
            "Recentered grid on {:?} (radius {}): {} to regenerate, {} reused, {} removed",
            center,
            radius,
            regenerate.len(),
            reused,
            removed
        );

        regenerate.sort_unstable();
        regenerate
    }

    /// Swap in a freshly loaded chunk set; all new chunks are hot and dirty.
    pub(crate) fn replace_chunks(&mut self, loaded: Vec<(ChunkIndex, ChunkData)>) {
        self.clear();
        for (index, data) in loaded {
            if let Some(mut displaced) = self.chunks.insert(index, Chunk::new_hot(index, data)) {
                log::warn!("Loaded chunk {:?} twice; keeping the last copy", index);
                if let Some(old) = displaced.take_data() {
                    old.release(&self.pool);
                }
            }
            self.dirty.mark(index);
        }
    }
}

impl Occupancy for Grid {
    fn is_solid(&self, world: Vec3) -> bool {
        self.sample(world).is_some_and(|s| s.distance <= 0.0)
    }
}

impl Drop for Grid {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Distinct mutable borrows of the chunks named in `indices`
fn select_mut<'a>(chunks: &'a mut HashMap<ChunkIndex, Chunk>, indices: &[ChunkIndex]) -> Vec<&'a mut Chunk> {
    let wanted: HashSet<ChunkIndex> = indices.iter().copied().collect();
    chunks
        .iter_mut()
        .filter(|(index, _)| wanted.contains(index))
        .map(|(_, chunk)| chunk)
        .collect()
}
