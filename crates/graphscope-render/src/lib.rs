//! wgpu picking backend for graphscope-rs.
//!
//! This crate provides the GPU side of element picking:
//! - [`PickBuffer`], the offscreen color + depth target read back per pixel
//! - [`PickPipeline`], pass-through pipelines that output only pick colors
//! - [`PickRenderData`], per-renderable instance buffers
//! - [`RenderEngine`], device ownership and pick pass submission

pub mod engine;
pub mod error;
pub mod pick_buffer;
pub mod pick_pipeline;
pub mod pick_render;

pub use engine::RenderEngine;
pub use error::{RenderError, RenderResult};
pub use pick_buffer::{PickBuffer, PICK_COLOR_FORMAT, PICK_DEPTH_FORMAT};
pub use pick_pipeline::{PickPipeline, PickPrimitive, PickUniforms};
pub use pick_render::{build_instances, PickInstance, PickRenderData, PickShape};
