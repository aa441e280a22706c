//! Device ownership and pick pass submission.

use glam::Mat4;

use crate::error::{RenderError, RenderResult};
use crate::pick_buffer::PickBuffer;
use crate::pick_pipeline::PickPipeline;
use crate::pick_render::PickRenderData;

/// The wgpu device, queue, and pick pipeline shared by a view.
pub struct RenderEngine {
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    pick_pipeline: PickPipeline,
}

impl RenderEngine {
    /// Wraps a device owned by the host application.
    #[must_use]
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let pick_pipeline = PickPipeline::new(&device);
        Self {
            device,
            queue,
            pick_pipeline,
        }
    }

    /// Creates a new headless render engine.
    pub async fn new_headless() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("graphscope device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        log::info!("headless render engine on {}", adapter.get_info().name);
        Ok(Self::from_device(device, queue))
    }

    /// Returns the pick pipeline.
    #[must_use]
    pub fn pick_pipeline(&self) -> &PickPipeline {
        &self.pick_pipeline
    }

    /// Creates a pick buffer on this engine's device.
    #[must_use]
    pub fn create_pick_buffer(&self, width: u32, height: u32) -> PickBuffer {
        PickBuffer::new(&self.device, &self.queue, width, height)
    }

    /// Draws `renderables` into `buffer` with their pick colors.
    ///
    /// The buffer must have been prepared (cleared) for this frame. Does
    /// nothing while the buffer is unallocated.
    pub fn render_pick_pass<'a>(
        &self,
        buffer: &PickBuffer,
        view_proj: Mat4,
        renderables: impl IntoIterator<Item = &'a PickRenderData>,
    ) {
        self.pick_pipeline.set_view_projection(&self.queue, view_proj);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Pass Encoder"),
            });
        {
            let Some(mut pass) = buffer.begin_pick_pass(&mut encoder) else {
                return;
            };
            for data in renderables {
                data.draw(&mut pass, &self.pick_pipeline);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
