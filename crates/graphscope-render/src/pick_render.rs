//! Per-renderable pick instance buffers.

use glam::Vec2;
use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};
use crate::pick_pipeline::{PickPipeline, PickPrimitive};

/// Vertices emitted per instance (two triangles).
const VERTICES_PER_INSTANCE: u32 = 6;

/// 2D geometry of one pickable element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickShape {
    a: Vec2,
    b: Vec2,
    width: f32,
}

impl PickShape {
    /// A quad centered at `center` reaching `half_extent` in each direction.
    #[must_use]
    pub fn quad(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            a: center,
            b: half_extent,
            width: 0.0,
        }
    }

    /// A segment from `from` to `to` with the given full width.
    #[must_use]
    pub fn segment(from: Vec2, to: Vec2, width: f32) -> Self {
        Self {
            a: from,
            b: to,
            width,
        }
    }
}

/// Instance data fed to the pick shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PickInstance {
    pub a: [f32; 2],
    pub b: [f32; 2],
    pub width: f32,
    /// RGBA pick color, normalized by the vertex fetch.
    pub color: [u8; 4],
}

impl PickInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32,
        3 => Unorm8x4,
    ];

    /// Vertex buffer layout, one step per instance.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PickInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Builds instances by pairing each shape with its 4-byte pick color.
pub fn build_instances(shapes: &[PickShape], colors: &[u8]) -> RenderResult<Vec<PickInstance>> {
    if colors.len() != shapes.len() * 4 {
        return Err(RenderError::InstanceCountMismatch {
            shapes: shapes.len(),
            colors: colors.len() / 4,
        });
    }
    Ok(shapes
        .iter()
        .zip(colors.chunks_exact(4))
        .map(|(shape, color)| PickInstance {
            a: shape.a.to_array(),
            b: shape.b.to_array(),
            width: shape.width,
            color: [color[0], color[1], color[2], color[3]],
        })
        .collect())
}

/// GPU resources for drawing one renderable into the pick buffer.
pub struct PickRenderData {
    instance_buffer: wgpu::Buffer,
    primitive: PickPrimitive,
    num_instances: u32,
}

impl PickRenderData {
    /// Uploads the pick instances of one renderable.
    pub fn new(
        device: &wgpu::Device,
        primitive: PickPrimitive,
        shapes: &[PickShape],
        colors: &[u8],
    ) -> RenderResult<Self> {
        let instances = build_instances(shapes, colors)?;
        let num_instances = u32::try_from(instances.len()).map_err(|_| {
            RenderError::InstanceCountMismatch {
                shapes: shapes.len(),
                colors: colors.len() / 4,
            }
        })?;
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Pick Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Ok(Self {
            instance_buffer,
            primitive,
            num_instances,
        })
    }

    /// Returns how instances are expanded.
    #[must_use]
    pub fn primitive(&self) -> PickPrimitive {
        self.primitive
    }

    /// Returns the number of instances.
    #[must_use]
    pub fn num_instances(&self) -> u32 {
        self.num_instances
    }

    /// Records the draw into a pick pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipeline: &PickPipeline) {
        pass.set_pipeline(pipeline.pipeline(self.primitive));
        pass.set_bind_group(0, pipeline.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..VERTICES_PER_INSTANCE, 0..self.num_instances);
    }
}
