//! Buffer Pool - free lists of reusable numeric buffers
//!
//! Chunk buffers (distances, materials) and meshing working lists are
//! borrowed from here instead of being allocated per edit:
//! - Fixed kinds always hand out `R³`-long buffers (contents are stale)
//! - List kinds hand out empty vectors with preallocated capacity
//! - Nothing returns automatically: every `acquire` needs a matching `release`

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::types::Vec3;

/// Free list of one buffer kind
#[derive(Debug)]
pub struct FreeList<T> {
    label: &'static str,
    /// Buffers waiting for reuse
    free: Mutex<Vec<Vec<T>>>,
    /// Fixed length (fixed kinds) or initial capacity (list kinds)
    capacity: usize,
    /// Whether handed-out buffers have `len == capacity`
    fixed: bool,
    /// Buffers currently borrowed
    outstanding: AtomicUsize,
    /// Buffers ever created by this list
    allocated: AtomicUsize,
}

impl<T: Copy + Default> FreeList<T> {
    /// Free list handing out buffers of exactly `len` elements
    pub fn fixed(label: &'static str, len: usize) -> Self {
        Self::with_kind(label, len, true)
    }

    /// Free list handing out empty buffers with `capacity` reserved
    pub fn growable(label: &'static str, capacity: usize) -> Self {
        Self::with_kind(label, capacity, false)
    }

    fn with_kind(label: &'static str, capacity: usize, fixed: bool) -> Self {
        Self {
            label,
            free: Mutex::new(Vec::new()),
            capacity,
            fixed,
            outstanding: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
        }
    }

    /// Borrow a buffer, reusing a released one when available
    pub fn acquire(&self) -> Vec<T> {
        let reused = self.free.lock().unwrap_or_else(|e| e.into_inner()).pop();
        self.outstanding.fetch_add(1, Ordering::Relaxed);

        match reused {
            Some(buffer) => buffer,
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                log::trace!("Pool '{}' allocating buffer #{}", self.label, self.allocated());
                if self.fixed {
                    vec![T::default(); self.capacity]
                } else {
                    Vec::with_capacity(self.capacity)
                }
            }
        }
    }

    /// Return a buffer for reuse
    pub fn release(&self, mut buffer: Vec<T>) {
        if self.fixed {
            if buffer.len() != self.capacity {
                log::warn!(
                    "Pool '{}' dropping buffer of length {} (expected {})",
                    self.label,
                    buffer.len(),
                    self.capacity
                );
                self.mark_returned();
                return;
            }
        } else {
            buffer.clear();
        }

        self.mark_returned();
        self.free.lock().unwrap_or_else(|e| e.into_inner()).push(buffer);
    }

    fn mark_returned(&self) {
        // Saturating: releasing a buffer that was never acquired here is tolerated
        let _ = self.outstanding.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
            Some(n.saturating_sub(1))
        });
    }

    /// Number of buffers borrowed and not yet released
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    /// Number of buffers waiting in the free list
    pub fn pooled(&self) -> usize {
        self.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of buffers ever allocated
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Fixed length or initial capacity of handed-out buffers
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Pool of every buffer kind used by chunks and the extractor.
///
/// Constructed once per resolution and shared (usually behind an `Arc`)
/// between grids.
#[derive(Debug)]
pub struct BufferPool {
    resolution: usize,
    distances: FreeList<f32>,
    materials: FreeList<u8>,
    cell_indices: FreeList<i32>,
    vertices: FreeList<Vec3>,
    quads: FreeList<[u32; 4]>,
    quad_materials: FreeList<u8>,
}

impl BufferPool {
    /// Create a pool for chunks with `resolution` voxels per side
    pub fn new(resolution: usize) -> Self {
        let volume = resolution * resolution * resolution;
        let list_capacity = resolution * resolution * 2;

        log::info!(
            "Created buffer pool: resolution {}, {} voxels per chunk",
            resolution,
            volume
        );

        Self {
            resolution,
            distances: FreeList::fixed("distances", volume),
            materials: FreeList::fixed("materials", volume),
            cell_indices: FreeList::fixed("cell_indices", volume),
            vertices: FreeList::growable("vertices", list_capacity),
            quads: FreeList::growable("quads", list_capacity),
            quad_materials: FreeList::growable("quad_materials", list_capacity),
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// `R³` signed distances
    pub fn distances(&self) -> &FreeList<f32> {
        &self.distances
    }

    /// `R³` material ids
    pub fn materials(&self) -> &FreeList<u8> {
        &self.materials
    }

    /// `R³` cell → vertex index map used while extracting
    pub fn cell_indices(&self) -> &FreeList<i32> {
        &self.cell_indices
    }

    /// Vertex positions and normals
    pub fn vertices(&self) -> &FreeList<Vec3> {
        &self.vertices
    }

    /// Quad index lists
    pub fn quads(&self) -> &FreeList<[u32; 4]> {
        &self.quads
    }

    /// Per-quad material lists
    pub fn quad_materials(&self) -> &FreeList<u8> {
        &self.quad_materials
    }

    /// Total buffers currently borrowed across all kinds
    pub fn outstanding(&self) -> usize {
        self.distances.outstanding()
            + self.materials.outstanding()
            + self.cell_indices.outstanding()
            + self.vertices.outstanding()
            + self.quads.outstanding()
            + self.quad_materials.outstanding()
    }
}
