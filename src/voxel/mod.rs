//! Voxel data structures and operations

pub mod pool;
pub mod chunk;
pub mod config;
pub mod dirty;
pub mod grid;
pub mod sdf;
pub mod kernel;

pub use pool::{BufferPool, FreeList};
pub use chunk::{Chunk, ChunkData, ChunkIndex, FillState, voxel_index};
pub use config::GridConfig;
pub use dirty::DirtyTracker;
pub use grid::{Grid, Occupancy, VoxelSample};
pub use kernel::{Kernel, KernelMode, KernelPiece, MeshPlacement};
