//! Error types for the terrain engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Resolution mismatch: grid uses {expected}, file has {found}")]
    ResolutionMismatch { expected: u32, found: u32 },

    #[error("Corrupt data: {0}")]
    Corrupt(String),
}
