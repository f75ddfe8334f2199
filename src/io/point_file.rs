//! Point list files (e.g. recorded paths)
//!
//! Layout, all little-endian:
//! ```text
//! string "path"   7-bit varint byte length + UTF-8
//! i32 count
//! count × { f32 x, f32 y, f32 z }
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};

/// Header string every point file starts with
pub const POINT_FILE_HEADER: &str = "path";

/// Longest header we are willing to allocate for
const MAX_HEADER_LEN: usize = 1024;

pub fn save_points(points: &[Vec3], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_points(points, &mut writer)?;
    writer.flush()?;
    log::debug!("Saved {} points to {}", points.len(), path.display());
    Ok(())
}

pub fn load_points(path: &Path) -> Result<Vec<Vec3>> {
    let bytes = std::fs::read(path)?;
    let points = read_points(&mut bytes.as_slice()).inspect_err(|e| {
        log::warn!("Failed to load point file {}: {}", path.display(), e);
    })?;
    log::debug!("Loaded {} points from {}", points.len(), path.display());
    Ok(points)
}

pub fn write_points<W: Write>(points: &[Vec3], writer: &mut W) -> Result<()> {
    write_string(writer, POINT_FILE_HEADER)?;
    writer.write_all(&(points.len() as i32).to_le_bytes())?;
    for p in points {
        for c in p.to_array() {
            writer.write_all(&c.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Parse a point list; a header other than `"path"` is [`Error::Corrupt`].
pub fn read_points<R: Read>(reader: &mut R) -> Result<Vec<Vec3>> {
    let header = read_string(reader)?;
    if header != POINT_FILE_HEADER {
        return Err(Error::Corrupt(format!("unexpected point file header {:?}", header)));
    }

    let count = read_i32(reader)?;
    if count < 0 {
        return Err(Error::Corrupt(format!("negative point count {}", count)));
    }

    let mut points = Vec::with_capacity((count as usize).min(1 << 16));
    for _ in 0..count {
        points.push(Vec3::new(read_f32(reader)?, read_f32(reader)?, read_f32(reader)?));
    }
    Ok(points)
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    let mut len = s.len();
    loop {
        let byte = (len & 0x7F) as u8;
        len >>= 7;
        if len == 0 {
            writer.write_all(&[byte])?;
            break;
        }
        writer.write_all(&[byte | 0x80])?;
    }
    writer.write_all(s.as_bytes())
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        len |= ((byte[0] & 0x7F) as usize) << shift;
        if byte[0] & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 35 {
            return Err(Error::Corrupt("string length prefix too long".to_string()));
        }
    }
    if len > MAX_HEADER_LEN {
        return Err(Error::Corrupt(format!("string length {} too large", len)));
    }

    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| Error::Corrupt(e.to_string()))
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}
