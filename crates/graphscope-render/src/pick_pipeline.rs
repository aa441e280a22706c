//! Pass-through pipelines for the pick pass.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::pick_buffer::{PICK_COLOR_FORMAT, PICK_DEPTH_FORMAT};
use crate::pick_render::PickInstance;

/// How an instance is expanded into geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickPrimitive {
    /// Axis-aligned quad around a center (nodes, labels).
    Quad,
    /// Thick line segment between two points (edges).
    Segment,
}

/// GPU uniforms for the pick pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PickUniforms {
    /// World to clip space transform.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for PickUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Pipelines and shared bindings for drawing pick colors.
pub struct PickPipeline {
    quad: wgpu::RenderPipeline,
    segment: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PickPipeline {
    /// Compiles the pick shader and builds both pipelines.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Pick Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/pick.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pick Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Pick Uniform Buffer"),
            contents: bytemuck::bytes_of(&PickUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pick Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pick Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let quad = Self::create_pipeline(device, &pipeline_layout, &shader, "vs_quad", "Quad");
        let segment =
            Self::create_pipeline(device, &pipeline_layout, &shader, "vs_segment", "Segment");

        Self {
            quad,
            segment,
            uniform_buffer,
            bind_group,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_entry: &str,
        name: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{name} Pick Pipeline")),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(vertex_entry),
                buffers: &[PickInstance::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: PICK_COLOR_FORMAT,
                    blend: None, // No blending for pick buffer
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..wgpu::PrimitiveState::default()
            },
            // Everything sits at z = 0; LessEqual lets later draws win.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: PICK_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Returns the pipeline for a primitive kind.
    #[must_use]
    pub fn pipeline(&self, primitive: PickPrimitive) -> &wgpu::RenderPipeline {
        match primitive {
            PickPrimitive::Quad => &self.quad,
            PickPrimitive::Segment => &self.segment,
        }
    }

    /// Returns the bind group holding the pick uniforms.
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Uploads the view-projection used by subsequent pick passes.
    pub fn set_view_projection(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        let uniforms = PickUniforms {
            view_proj: view_proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}
