//! Minimal Wavefront OBJ reader (positions and faces only)

use std::path::Path;

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};

use super::source::{SourceMesh, Topology};

/// Parse OBJ text into a source mesh.
///
/// Only `v` and `f` records are read; texture coordinates and normals in face
/// corners (`v/vt/vn`) are ignored. Faces are kept as written: if any face
/// is not a triangle the mesh gets a non-triangle topology and the baker will
/// refuse it.
pub fn parse_obj(input: &str) -> Result<SourceMesh> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut corner_counts: Vec<usize> = Vec::new();

    for (line_no, line) in input.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coords = [0.0f32; 3];
                for c in &mut coords {
                    let raw = parts
                        .next()
                        .ok_or_else(|| Error::Mesh(format!("line {}: vertex needs 3 coordinates", line_no + 1)))?;
                    *c = raw
                        .parse()
                        .map_err(|_| Error::Mesh(format!("line {}: bad coordinate '{}'", line_no + 1, raw)))?;
                }
                positions.push(Vec3::from_array(coords));
            }
            Some("f") => {
                let mut corners = 0;
                for part in parts {
                    let raw = part.split('/').next().unwrap_or("");
                    let index: i64 = raw
                        .parse()
                        .map_err(|_| Error::Mesh(format!("line {}: bad face index '{}'", line_no + 1, part)))?;
                    // OBJ indices are 1-based; negative ones count back from the last vertex
                    let resolved = if index > 0 {
                        index - 1
                    } else {
                        positions.len() as i64 + index
                    };
                    if index == 0 || resolved < 0 || resolved >= positions.len() as i64 {
                        return Err(Error::Mesh(format!(
                            "line {}: face index {} out of range",
                            line_no + 1,
                            index
                        )));
                    }
                    indices.push(resolved as u32);
                    corners += 1;
                }
                corner_counts.push(corners);
            }
            _ => {}
        }
    }

    let topology = if corner_counts.iter().all(|&n| n == 3) {
        Topology::Triangles
    } else if corner_counts.iter().all(|&n| n == 4) {
        Topology::Quads
    } else {
        Topology::Polygons
    };

    log::debug!(
        "Parsed OBJ: {} vertices, {} faces ({:?})",
        positions.len(),
        corner_counts.len(),
        topology
    );

    Ok(SourceMesh {
        positions,
        indices,
        topology,
    })
}

/// Read and parse an OBJ file
pub fn load_obj(path: &Path) -> Result<SourceMesh> {
    let text = std::fs::read_to_string(path)?;
    parse_obj(&text)
}
