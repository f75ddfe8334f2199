//! Kernel engine: dense SDF patches combined into the grid
//!
//! A kernel is built from a shape (fill block, sphere, box, capsule or baked
//! mesh), then applied with [`Grid::apply_kernel`](crate::voxel::Grid::apply_kernel)
//! using one of the [`KernelMode`] CSG rules.

pub mod mode;
#[allow(clippy::module_inception)]
pub mod kernel;
pub mod shapes;
mod apply;

pub use mode::KernelMode;
pub use kernel::{Kernel, KernelPiece};
pub use shapes::MeshPlacement;
