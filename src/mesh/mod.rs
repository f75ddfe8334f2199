//! Source meshes for baking into signed distance data

pub mod source;
pub mod obj;

pub use source::{SourceMesh, Topology};
pub use obj::{load_obj, parse_obj};
