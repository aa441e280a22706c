//! Error types for graphscope-rs.

use thiserror::Error;

/// The main error type for graphscope-rs operations.
#[derive(Error, Debug)]
pub enum GraphscopeError {
    /// The id space has fewer free ids than an allocation requested.
    #[error("picking id space exhausted: requested {requested} ids, {available} available")]
    CapacityExhausted { requested: u64, available: u64 },

    /// An allocation was requested for zero elements.
    #[error("picking id allocation requires a positive count")]
    InvalidCount,

    /// A range handed back to the allocator overlaps free space or lies
    /// outside the id space (double free or foreign allocation).
    #[error("invalid deallocation of id range [{start}, {end})")]
    InvalidDeallocation { start: u32, end: u32 },

    /// A layer with the given name already exists.
    #[error("layer '{0}' already exists")]
    LayerExists(String),

    /// A layer with the given name was not found.
    #[error("layer '{0}' not found")]
    LayerNotFound(String),

    /// Rendering error.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for graphscope-rs operations.
pub type Result<T> = std::result::Result<T, GraphscopeError>;
