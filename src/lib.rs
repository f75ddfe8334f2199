//! sdf-terrain - chunked signed distance field terrain with CSG edits and
//! surface-nets meshing

pub mod core;
pub mod math;
pub mod voxel;
pub mod mesh;
pub mod mesh_sdf;
pub mod extract;
pub mod io;
pub mod terrain;
