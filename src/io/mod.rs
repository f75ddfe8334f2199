//! On-disk formats: grid snapshots and point lists

pub mod grid_file;
pub mod point_file;

pub use grid_file::{load_grid, read_grid, save_grid, write_grid};
pub use point_file::{load_points, read_points, save_points, write_points};
