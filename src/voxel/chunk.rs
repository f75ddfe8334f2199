//! Chunk records: a fixed-resolution cube of distance and material samples

use crate::core::types::IVec3;
use crate::voxel::pool::BufferPool;

/// Integer coordinate identifying a chunk in the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkIndex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkIndex {
    /// Create a new chunk index
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Neighbouring index shifted by `delta`
    pub fn offset(&self, delta: IVec3) -> Self {
        Self::from(self.as_ivec3() + delta)
    }

    /// Largest per-axis distance to `other`
    pub fn chebyshev_distance(&self, other: ChunkIndex) -> i32 {
        (self.as_ivec3() - other.as_ivec3()).abs().max_element()
    }
}

impl From<IVec3> for ChunkIndex {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Classification of a chunk's contents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillState {
    /// Contains a surface crossing (or has not been classified yet)
    #[default]
    Mixed,
    /// Every sample is outside the surface
    Empty,
    /// Every sample is inside and shares one material
    SolidSingleMaterial,
    /// Every sample is inside but materials differ
    Solid,
}

impl FillState {
    /// Whether a chunk in this state can drop its buffers
    pub fn is_uniform(self) -> bool {
        matches!(self, FillState::Empty | FillState::SolidSingleMaterial)
    }
}

/// Dense per-voxel buffers of a hot chunk, both `R³` long, X fastest
#[derive(Debug)]
pub struct ChunkData {
    pub distances: Vec<f32>,
    pub materials: Vec<u8>,
}

impl ChunkData {
    /// Borrow both buffers from the pool (contents are stale)
    pub fn acquire(pool: &BufferPool) -> Self {
        Self {
            distances: pool.distances().acquire(),
            materials: pool.materials().acquire(),
        }
    }

    /// Return both buffers to the pool
    pub fn release(self, pool: &BufferPool) {
        pool.distances().release(self.distances);
        pool.materials().release(self.materials);
    }

    /// Set every voxel to the same distance and material
    pub fn fill(&mut self, distance: f32, material: u8) {
        self.distances.fill(distance);
        self.materials.fill(material);
    }

    /// Scan both buffers and classify them.
    ///
    /// Returns the fill state and, for `SolidSingleMaterial`, the shared material
    /// (otherwise the first voxel's material).
    pub fn classify(&self) -> (FillState, u8) {
        let Some(&first) = self.distances.first() else {
            return (FillState::Mixed, 0);
        };
        let first_material = self.materials.first().copied().unwrap_or(0);

        if first > 0.0 {
            if self.distances.iter().all(|&d| d > 0.0) {
                return (FillState::Empty, first_material);
            }
            return (FillState::Mixed, first_material);
        }

        if !self.distances.iter().all(|&d| d <= 0.0) {
            return (FillState::Mixed, first_material);
        }
        if self.materials.iter().all(|&m| m == first_material) {
            (FillState::SolidSingleMaterial, first_material)
        } else {
            (FillState::Solid, first_material)
        }
    }
}

/// Flat buffer index of local voxel `(x, y, z)` in a chunk of resolution `r`
#[inline]
pub fn voxel_index(r: usize, x: usize, y: usize, z: usize) -> usize {
    x + r * (y + r * z)
}

/// A chunk of the grid: hot (owns buffers) or cold (uniform, tag only)
#[derive(Debug)]
pub struct Chunk {
    index: ChunkIndex,
    data: Option<ChunkData>,
    fill_state: FillState,
    fill_material: u8,
}

impl Chunk {
    /// Create a hot chunk around borrowed buffers
    pub(crate) fn new_hot(index: ChunkIndex, data: ChunkData) -> Self {
        Self {
            index,
            data: Some(data),
            fill_state: FillState::Mixed,
            fill_material: 0,
        }
    }

    /// Create a cold chunk with the given uniform state
    pub(crate) fn new_cold(index: ChunkIndex, fill_state: FillState, fill_material: u8) -> Self {
        Self {
            index,
            data: None,
            fill_state,
            fill_material,
        }
    }

    pub fn index(&self) -> ChunkIndex {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: ChunkIndex) {
        self.index = index;
    }

    /// Whether the chunk currently owns per-voxel buffers
    pub fn is_hot(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&ChunkData> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut ChunkData> {
        self.data.as_mut()
    }

    pub fn fill_state(&self) -> FillState {
        self.fill_state
    }

    pub fn fill_material(&self) -> u8 {
        self.fill_material
    }

    /// Distance a cold chunk stands for, given the grid clamps
    pub fn uniform_distance(&self, min_clamp: f32, max_clamp: f32) -> f32 {
        match self.fill_state {
            FillState::Empty => max_clamp,
            _ => min_clamp,
        }
    }

    /// Hand buffers to a cold chunk and fill them from its fill state
    pub(crate) fn promote(&mut self, mut data: ChunkData, min_clamp: f32, max_clamp: f32) {
        debug_assert!(self.data.is_none(), "promoting a hot chunk");
        data.fill(self.uniform_distance(min_clamp, max_clamp), self.fill_material);
        self.data = Some(data);
    }

    /// Classify the buffers; on a uniform result take them out and go cold.
    ///
    /// Returns the buffers for the caller to release.
    pub(crate) fn compress(&mut self) -> Option<ChunkData> {
        let (state, material) = self.data.as_ref()?.classify();
        self.fill_state = state;
        self.fill_material = material;
        if state.is_uniform() {
            self.data.take()
        } else {
            None
        }
    }

    /// Take the buffers out unconditionally (chunk removal)
    pub(crate) fn take_data(&mut self) -> Option<ChunkData> {
        self.data.take()
    }

    /// Forget contents: cold Empty, or hot buffers reset to `max_clamp`
    pub(crate) fn reset_empty(&mut self, max_clamp: f32) {
        match self.data.as_mut() {
            Some(data) => {
                data.fill(max_clamp, 0);
                self.fill_state = FillState::Mixed;
            }
            None => self.fill_state = FillState::Empty,
        }
        self.fill_material = 0;
    }

    /// Mark buffers as freshly written (state unknown until compressed)
    pub(crate) fn mark_mixed(&mut self) {
        if self.data.is_some() {
            self.fill_state = FillState::Mixed;
        }
    }
}
