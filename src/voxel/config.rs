//! Grid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Affine3A, Quat, Result, Vec3};

/// Geometry and clamp settings of a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Voxels per chunk side (R)
    pub resolution: u32,
    /// Grid-local extent of one chunk (R-1 voxel spans)
    pub chunk_size: f32,
    /// Lowest stored distance
    pub min_clamp: f32,
    /// Highest stored distance
    pub max_clamp: f32,
    /// World position of the grid-local origin
    pub origin: [f32; 3],
    /// Grid rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
    /// Uniform grid-local → world scale
    pub scale: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: 32,
            chunk_size: 31.0,
            min_clamp: -2.0,
            max_clamp: 2.0,
            origin: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: 1.0,
        }
    }
}

impl GridConfig {
    /// Configuration with `resolution` voxels per side and unit voxel size
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            chunk_size: resolution.saturating_sub(1) as f32,
            ..Self::default()
        }
    }

    /// Check the settings can back a grid
    pub fn validate(&self) -> Result<()> {
        if self.resolution < 4 {
            return Err(Error::Config(format!(
                "resolution must be at least 4, got {}",
                self.resolution
            )));
        }
        if !(self.chunk_size > 0.0) || !self.chunk_size.is_finite() {
            return Err(Error::Config(format!("chunk_size must be positive, got {}", self.chunk_size)));
        }
        if !(self.min_clamp < 0.0 && self.max_clamp > 0.0) {
            return Err(Error::Config(format!(
                "clamps must straddle zero, got [{}, {}]",
                self.min_clamp, self.max_clamp
            )));
        }
        if !(self.scale > 0.0) || !self.scale.is_finite() {
            return Err(Error::Config(format!("scale must be positive, got {}", self.scale)));
        }
        let rotation = Quat::from_array(self.rotation);
        if !rotation.is_finite() || rotation.length_squared() < 1e-6 {
            return Err(Error::Config("rotation quaternion is degenerate".to_string()));
        }
        Ok(())
    }

    /// Distance between neighbouring voxels in grid-local units
    pub fn voxel_size(&self) -> f32 {
        self.chunk_size / (self.resolution as f32 - 1.0)
    }

    /// Grid-local → world transform
    pub fn transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_array(self.rotation).normalize(),
            Vec3::from_array(self.origin),
        )
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file (sync) and validate
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        let config = GridConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.voxel_size() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_with_resolution() {
        let config = GridConfig::with_resolution(16);
        assert_eq!(config.resolution, 16);
        assert!((config.voxel_size() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GridConfig::default();
        config.resolution = 2;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = GridConfig::default();
        config.min_clamp = 1.0;
        assert!(config.validate().is_err());

        let mut config = GridConfig::default();
        config.scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = GridConfig::default();
        config.rotation = [0.0; 4];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transform() {
        let config = GridConfig {
            origin: [10.0, 0.0, 0.0],
            scale: 2.0,
            ..GridConfig::default()
        };
        let world = config.transform().transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!((world - Vec3::new(12.0, 4.0, 6.0)).length() < 1e-5);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("grid.json");
        let config = GridConfig {
            resolution: 16,
            chunk_size: 7.5,
            ..GridConfig::default()
        };
        config.save_sync(&path).unwrap();
        let loaded = GridConfig::load_sync(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.json");
        std::fs::write(&path, r#"{ "resolution": 8, "chunk_size": 7.0 }"#).unwrap();
        let loaded = GridConfig::load_sync(&path).unwrap();
        assert_eq!(loaded.resolution, 8);
        assert_eq!(loaded.max_clamp, 2.0);
    }
}
