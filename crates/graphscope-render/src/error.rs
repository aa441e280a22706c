//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during pick rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Mapping a readback buffer failed.
    #[error("failed to map readback buffer")]
    BufferMapFailed,

    /// Geometry and pick colors describe different element counts.
    #[error("instance count mismatch: {shapes} shapes, {colors} pick colors")]
    InstanceCountMismatch { shapes: usize, colors: usize },
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
