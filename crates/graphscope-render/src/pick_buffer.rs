//! GPU pick buffer.
//!
//! An `Rgba8Unorm` color target plus depth, sized to the viewport. Pick
//! colors are drawn into it and single pixels are copied back to the CPU
//! through a small staging buffer.

use graphscope_core::OffscreenBuffer;

use crate::error::{RenderError, RenderResult};

/// Color format of the pick target. Unorm keeps byte values exact.
pub const PICK_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth format of the pick target.
pub const PICK_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

struct PickTargets {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

/// The wgpu implementation of [`OffscreenBuffer`].
pub struct PickBuffer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    targets: Option<PickTargets>,
    size: (u32, u32),
    /// Staging buffer for single pixel readback.
    staging: wgpu::Buffer,
}

impl PickBuffer {
    /// Creates a pick buffer of the given size.
    ///
    /// A zero width or height leaves the buffer unallocated; reads then
    /// report no hit until it is resized.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) -> Self {
        // Buffer size must be aligned to COPY_BYTES_PER_ROW_ALIGNMENT (256)
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Staging Buffer"),
            size: u64::from(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut buffer = Self {
            device: device.clone(),
            queue: queue.clone(),
            targets: None,
            size: (0, 0),
            staging,
        };
        buffer.resize(width, height);
        buffer
    }

    fn create_targets(device: &wgpu::Device, width: u32, height: u32) -> PickTargets {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Pick Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PICK_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Pick Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PICK_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        PickTargets {
            color,
            color_view,
            depth_view,
        }
    }

    /// Begins a render pass into the pick targets without clearing them.
    ///
    /// Call [`OffscreenBuffer::prepare`] first in each frame. Returns `None`
    /// while the buffer is unallocated.
    pub fn begin_pick_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> Option<wgpu::RenderPass<'a>> {
        let targets = self.targets.as_ref()?;
        Some(Self::begin_pass(
            encoder,
            targets,
            wgpu::LoadOp::Load,
            wgpu::LoadOp::Load,
        ))
    }

    fn begin_pass<'a>(
        encoder: &'a mut wgpu::CommandEncoder,
        targets: &'a PickTargets,
        color_load: wgpu::LoadOp<wgpu::Color>,
        depth_load: wgpu::LoadOp<f32>,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Pick Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// Copies the texel at texture coordinates `(x, y)` (origin top-left)
    /// back to the CPU, blocking until the GPU is done.
    fn read_texel(&self, texture: &wgpu::Texture, x: u32, y: u32) -> RenderResult<[u8; 4]> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Readback Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging.slice(..4);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|_| RenderError::BufferMapFailed)?;
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        let pixel = {
            let data = slice.get_mapped_range();
            [data[0], data[1], data[2], data[3]]
        };
        self.staging.unmap();
        Ok(pixel)
    }
}

impl OffscreenBuffer for PickBuffer {
    fn prepare(&mut self) {
        let Some(targets) = self.targets.as_ref() else {
            return;
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Clear Encoder"),
            });
        // Background = (0, 0, 0, 0), the no-hit sentinel.
        drop(Self::begin_pass(
            &mut encoder,
            targets,
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            wgpu::LoadOp::Clear(1.0),
        ));
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn read_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let (width, height) = self.size;
        let Some(targets) = self.targets.as_ref() else {
            return [0; 4];
        };
        if x >= width || y >= height {
            return [0; 4];
        }

        // Framebuffer rows count from the bottom, texture rows from the top.
        match self.read_texel(&targets.color, x, height - 1 - y) {
            Ok(pixel) => pixel,
            Err(e) => {
                log::warn!("pick readback at ({x}, {y}) failed: {e}");
                [0; 4]
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.size == (width, height) && self.targets.is_some() {
            return;
        }
        self.size = (width, height);
        self.targets =
            (width > 0 && height > 0).then(|| Self::create_targets(&self.device, width, height));
        log::debug!("pick targets reallocated at {width}x{height}");
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }
}
