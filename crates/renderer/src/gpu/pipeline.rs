use crate::compile::{compile_fragment_shader, compile_vertex_shader, WrappedFragment};
use crate::error::RenderError;

/// Bind group layouts and the vertex stage shared by every program.
pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub state_layout: wgpu::BindGroupLayout,
    pub vertex_module: wgpu::ShaderModule,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Result<Self, RenderError> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // 32-bit float textures are not filterable without an extra feature;
        // nearest sampling is all the simulation needs.
        let state_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("state layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let vertex_module = compile_vertex_shader(device)?;

        Ok(Self {
            uniform_layout,
            state_layout,
            vertex_module,
        })
    }
}

/// Where a pipeline's color attachment lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PipelineTarget {
    pub format: wgpu::TextureFormat,
    pub sample_count: u32,
}

pub(crate) struct ShaderPipeline {
    pub pipeline: wgpu::RenderPipeline,
    /// Expects the state texture at bind group 1.
    pub samples_state: bool,
}

impl ShaderPipeline {
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        label: &str,
        fragment: &WrappedFragment,
        target: PipelineTarget,
    ) -> Result<Self, RenderError> {
        let fragment_module = compile_fragment_shader(device, label, fragment)?;

        let mut bind_group_layouts = vec![&layouts.uniform_layout];
        if fragment.samples_state {
            bind_group_layouts.push(&layouts.state_layout);
        }
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &layouts.vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: target.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            let log = error.to_string();
            tracing::error!(pipeline = label, "pipeline creation failed:\n{log}");
            return Err(RenderError::ShaderCompile {
                label: label.to_string(),
                log,
            });
        }

        tracing::debug!(
            pipeline = label,
            format = ?target.format,
            sample_count = target.sample_count,
            samples_state = fragment.samples_state,
            "built render pipeline"
        );

        Ok(Self {
            pipeline,
            samples_state: fragment.samples_state,
        })
    }
}
