//! Grid save files
//!
//! Layout, all little-endian:
//! ```text
//! i32 resolution
//! i32 chunk_count
//! chunk_count × { i32 x, i32 y, i32 z, R³ × f32 distance, R³ × u8 material }
//! ```
//! Chunks are written in ascending index order.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::chunk::{ChunkData, ChunkIndex};
use crate::voxel::grid::Grid;
use crate::voxel::pool::BufferPool;

/// Save every chunk of `grid` to `path`.
///
/// Cold chunks are written as their uniform buffers without being promoted.
pub fn save_grid(grid: &Grid, path: &Path) -> Result<()> {
    let start = std::time::Instant::now();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let count = write_grid(grid, &mut writer)?;
    writer.flush()?;

    log::info!(
        "Saved {} chunks to {} in {:.1}ms",
        count,
        path.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Serialize `grid` into `writer`, returning the number of chunks written
pub fn write_grid<W: Write>(grid: &Grid, writer: &mut W) -> Result<usize> {
    let r = grid.resolution();
    let voxels = r * r * r;
    let indices = grid.chunk_indices();

    writer.write_all(&(r as i32).to_le_bytes())?;
    writer.write_all(&(indices.len() as i32).to_le_bytes())?;

    let mut distance_bytes = Vec::with_capacity(voxels * 4);
    for index in &indices {
        let Some(chunk) = grid.chunk(*index) else {
            continue;
        };
        for c in [index.x, index.y, index.z] {
            writer.write_all(&c.to_le_bytes())?;
        }

        distance_bytes.clear();
        match chunk.data() {
            Some(data) => {
                for d in &data.distances {
                    distance_bytes.extend_from_slice(&d.to_le_bytes());
                }
                writer.write_all(&distance_bytes)?;
                writer.write_all(&data.materials)?;
            }
            None => {
                let d = chunk.uniform_distance(grid.min_clamp(), grid.max_clamp());
                for _ in 0..voxels {
                    distance_bytes.extend_from_slice(&d.to_le_bytes());
                }
                writer.write_all(&distance_bytes)?;
                writer.write_all(&vec![chunk.fill_material(); voxels])?;
            }
        }
    }

    Ok(indices.len())
}

/// Replace the contents of `grid` with the chunks stored at `path`.
///
/// The whole file is parsed before the grid is touched, so on error the grid
/// is unchanged. Loaded chunks are hot and dirty. Returns the chunk count.
pub fn load_grid(grid: &mut Grid, path: &Path) -> Result<usize> {
    let start = std::time::Instant::now();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to read grid file {}: {}", path.display(), e);
            return Err(e.into());
        }
    };

    let chunks = match read_grid(&mut bytes.as_slice(), grid.pool()) {
        Ok(chunks) => chunks,
        Err(e) => {
            log::warn!("Failed to load grid file {}: {}", path.display(), e);
            return Err(e);
        }
    };

    let count = chunks.len();
    grid.replace_chunks(chunks);
    log::info!(
        "Loaded {} chunks from {} in {:.1}ms",
        count,
        path.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(count)
}

/// Parse a grid stream into pool buffers.
///
/// Buffers already taken are returned to the pool if parsing fails. A chunk
/// index that appears twice makes the stream corrupt.
pub fn read_grid<R: Read>(reader: &mut R, pool: &BufferPool) -> Result<Vec<(ChunkIndex, ChunkData)>> {
    let expected = pool.resolution();
    let found = read_i32(reader)?;
    if found != expected as i32 {
        return Err(Error::ResolutionMismatch {
            expected: expected as u32,
            found: found.max(0) as u32,
        });
    }

    let count = read_i32(reader)?;
    if count < 0 {
        return Err(Error::Corrupt(format!("negative chunk count {}", count)));
    }

    // The count is untrusted until the chunk records are actually read
    let mut chunks: Vec<(ChunkIndex, ChunkData)> = Vec::with_capacity((count as usize).min(1 << 10));
    let mut seen = HashSet::new();
    for _ in 0..count {
        let result = read_chunk(reader, pool).and_then(|(index, data)| {
            if seen.insert(index) {
                Ok((index, data))
            } else {
                data.release(pool);
                Err(Error::Corrupt(format!("duplicate chunk {:?}", index)))
            }
        });
        match result {
            Ok(chunk) => chunks.push(chunk),
            Err(e) => {
                for (_, data) in chunks {
                    data.release(pool);
                }
                return Err(e);
            }
        }
    }
    Ok(chunks)
}

fn read_chunk<R: Read>(reader: &mut R, pool: &BufferPool) -> Result<(ChunkIndex, ChunkData)> {
    let index = ChunkIndex::new(read_i32(reader)?, read_i32(reader)?, read_i32(reader)?);

    let mut data = ChunkData::acquire(pool);
    match read_buffers(reader, &mut data) {
        Ok(()) => Ok((index, data)),
        Err(e) => {
            data.release(pool);
            Err(e.into())
        }
    }
}

fn read_buffers<R: Read>(reader: &mut R, data: &mut ChunkData) -> io::Result<()> {
    let mut raw = vec![0u8; data.distances.len() * 4];
    reader.read_exact(&mut raw)?;
    for (d, bytes) in data.distances.iter_mut().zip(raw.chunks_exact(4)) {
        *d = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    reader.read_exact(&mut data.materials)
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::types::{IVec3, Vec3};
    use crate::voxel::chunk::FillState;
    use crate::voxel::config::GridConfig;
    use crate::voxel::kernel::{Kernel, KernelMode};
    use tempfile::tempdir;

    fn grid(resolution: u32) -> Grid {
        let pool = Arc::new(BufferPool::new(resolution as usize));
        Grid::new(GridConfig::with_resolution(resolution), pool).unwrap()
    }

    fn populated() -> Grid {
        let mut g = grid(8);
        for x in -1..=1 {
            g.add_chunk(ChunkIndex::new(x, 0, 0));
        }
        let sphere = Kernel::sphere(&g, Vec3::new(1.0, 3.0, 3.0), 2.5, KernelMode::Add, 5);
        g.apply_kernel(&sphere);
        let fill = Kernel::fill(&g, IVec3::new(-6, 0, 0), IVec3::new(2, 8, 8), KernelMode::Overwrite, 2);
        g.apply_kernel(&fill);
        g
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world").join("grid.bin");
        let source = populated();
        save_grid(&source, &path).unwrap();

        let mut target = grid(8);
        target.add_chunk(ChunkIndex::new(9, 9, 9));
        target.take_dirty();
        assert_eq!(load_grid(&mut target, &path).unwrap(), 3);

        assert_eq!(target.chunk_indices(), source.chunk_indices());
        assert!(!target.contains_chunk(ChunkIndex::new(9, 9, 9)));
        assert_eq!(target.dirty().dirty_count(), 3);
        assert_eq!(target.hot_chunk_count(), 3);

        for index in source.chunk_indices() {
            let src = source.chunk(index).unwrap();
            let dst = target.chunk(index).unwrap().data().unwrap();
            match src.data() {
                Some(data) => {
                    assert_eq!(data.distances, dst.distances);
                    assert_eq!(data.materials, dst.materials);
                }
                None => {
                    let d = src.uniform_distance(source.min_clamp(), source.max_clamp());
                    assert!(dst.distances.iter().all(|&v| v == d));
                    assert!(dst.materials.iter().all(|&m| m == src.fill_material()));
                }
            }
        }
    }

    #[test]
    fn test_cold_chunk_saved_without_promotion() {
        let mut g = grid(8);
        let index = ChunkIndex::new(0, 0, 0);
        g.add_chunk(index);
        let fill = Kernel::fill(&g, IVec3::ZERO, IVec3::splat(8), KernelMode::Add, 2);
        g.apply_kernel(&fill);
        assert_eq!(g.chunk(index).unwrap().fill_state(), FillState::SolidSingleMaterial);

        let mut bytes = Vec::new();
        write_grid(&g, &mut bytes).unwrap();
        assert!(!g.chunk(index).unwrap().is_hot());
        assert_eq!(bytes.len(), 8 + 12 + 512 * 5);

        let chunks = read_grid(&mut bytes.as_slice(), g.pool()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].1.distances.iter().all(|&d| d == g.min_clamp()));
        assert!(chunks[0].1.materials.iter().all(|&m| m == 2));
        for (_, data) in chunks {
            data.release(g.pool());
        }
    }

    #[test]
    fn test_resolution_mismatch_leaves_grid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.bin");
        save_grid(&populated(), &path).unwrap();

        let mut other = grid(16);
        other.add_chunk(ChunkIndex::new(0, 0, 0));
        let err = load_grid(&mut other, &path).unwrap_err();
        assert!(matches!(err, Error::ResolutionMismatch { expected: 16, found: 8 }));
        assert_eq!(other.chunk_count(), 1);
    }

    #[test]
    fn test_missing_and_truncated_files() {
        let dir = tempdir().unwrap();
        let mut g = grid(8);
        g.add_chunk(ChunkIndex::new(0, 0, 0));
        let held = g.pool().outstanding();

        let missing = load_grid(&mut g, &dir.path().join("nope.bin"));
        assert!(matches!(missing, Err(Error::Io(_))));

        let path = dir.path().join("short.bin");
        let mut bytes = Vec::new();
        write_grid(&populated(), &mut bytes).unwrap();
        bytes.truncate(bytes.len() - 100);
        std::fs::write(&path, &bytes).unwrap();

        let truncated = load_grid(&mut g, &path);
        assert!(matches!(truncated, Err(Error::Io(_))));
        assert_eq!(g.chunk_count(), 1);
        assert_eq!(g.pool().outstanding(), held);
    }

    #[test]
    fn test_negative_count_is_corrupt() {
        let pool = BufferPool::new(8);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(read_grid(&mut bytes.as_slice(), &pool), Err(Error::Corrupt(_))));
    }

    #[test]
    fn test_huge_count_is_error() {
        let pool = BufferPool::new(8);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(read_grid(&mut bytes.as_slice(), &pool), Err(Error::Io(_))));
        assert_eq!(pool.outstanding(), 0);
    }

    /// One chunk written twice under a doubled count
    fn duplicated_chunk_bytes(resolution: u32) -> Vec<u8> {
        let mut g = grid(resolution);
        g.add_chunk(ChunkIndex::new(0, 0, 0));
        let mut bytes = Vec::new();
        write_grid(&g, &mut bytes).unwrap();
        let record = bytes[8..].to_vec();
        bytes[4..8].copy_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&record);
        bytes
    }

    #[test]
    fn test_duplicate_chunk_is_corrupt() {
        let pool = BufferPool::new(4);
        let bytes = duplicated_chunk_bytes(4);
        assert_eq!(bytes.len(), 8 + 2 * (12 + 64 * 5));

        let err = read_grid(&mut bytes.as_slice(), &pool).unwrap_err();
        assert!(matches!(err, Error::Corrupt(_)));
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_duplicate_chunk_load_leaves_grid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.bin");
        std::fs::write(&path, duplicated_chunk_bytes(4)).unwrap();

        let mut g = grid(4);
        g.add_chunk(ChunkIndex::new(5, 0, 0));
        let sphere = Kernel::sphere(&g, Vec3::new(16.0, 1.5, 1.5), 1.0, KernelMode::Add, 1);
        g.apply_kernel(&sphere);
        let held = g.pool().outstanding();

        assert!(matches!(load_grid(&mut g, &path), Err(Error::Corrupt(_))));
        assert_eq!(g.chunk_count(), 1);
        assert!(g.contains_chunk(ChunkIndex::new(5, 0, 0)));
        assert_eq!(g.pool().outstanding(), held);
    }
}
