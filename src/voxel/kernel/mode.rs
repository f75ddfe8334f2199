//! How kernel voxels combine with chunk voxels

/// CSG operation a kernel performs on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelMode {
    /// Union: keep the smaller distance
    #[default]
    Add,
    /// Subtraction: carve the kernel shape out
    Remove,
    /// Replace distance and material unconditionally
    Overwrite,
    /// Repaint material where the kernel overlaps solid voxels
    SwapMat,
    /// Keep only the overlap of kernel and grid
    Intersection,
    /// Touch nothing
    None,
}

impl KernelMode {
    /// Combine one kernel voxel `(k, k_mat)` into a chunk voxel.
    #[inline]
    pub fn combine(self, k: f32, k_mat: u8, distance: &mut f32, material: &mut u8) {
        match self {
            KernelMode::Add => {
                if k < *distance {
                    *distance = k;
                    if k <= 0.0 {
                        *material = k_mat;
                    }
                }
            }
            KernelMode::Remove => {
                if -k > *distance {
                    *distance = -k;
                }
            }
            KernelMode::Overwrite => {
                *distance = k;
                *material = k_mat;
            }
            KernelMode::SwapMat => {
                if k <= 0.0 && *distance <= 0.0 {
                    *material = k_mat;
                }
            }
            KernelMode::Intersection => {
                if k > *distance {
                    *distance = k;
                }
            }
            KernelMode::None => {}
        }
    }

    /// Whether applying this mode can change chunk data at all
    pub fn is_noop(self) -> bool {
        self == KernelMode::None
    }
}
