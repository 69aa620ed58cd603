use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::backend::{
    Destination, DrawCall, FrameStatus, Program, RenderBackend, TargetAllocator, TargetSpec,
    QUAD_VERTEX_COUNT,
};
use crate::compile::{wrap_fragment, FragCoordOrigin, WrappedFragment, DISPLAY_FRAGMENT_GLSL};
use crate::error::{GpuErrorKind, RenderError};
use crate::types::{Extent, RenderMode, RendererConfig};

use super::context::{GpuContext, STATE_FORMAT};
use super::pipeline::{PipelineLayouts, PipelineTarget, ShaderPipeline};
use super::uniforms::ShaderParams;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// An `Rgba32Float` render target together with the bind group that samples it.
pub(crate) struct GpuTarget {
    label: String,
    extent: Extent,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    /// Error captured while the texture was being created.
    allocation_error: Option<String>,
}

struct InFlightFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// wgpu implementation of [`RenderBackend`].
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    user: ShaderPipeline,
    display: ShaderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    state_sampler: wgpu::Sampler,
    multisample_target: Option<MultisampleTarget>,
    frame: Option<InFlightFrame>,
    // Declared last: the surface must be dropped before the window it draws into.
    _window: Arc<Window>,
}

impl GpuState {
    /// `user_fragment` must already be wrapped for `config.mode`.
    pub(crate) fn new(
        window: Arc<Window>,
        config: &RendererConfig,
        user_fragment: &WrappedFragment,
    ) -> Result<Self, RenderError> {
        let context = GpuContext::new(
            window.as_ref(),
            window.inner_size(),
            config.antialiasing,
            config.vsync,
        )?;
        let device = &context.device;
        let layouts = PipelineLayouts::new(device)?;

        let surface_target = PipelineTarget {
            format: context.surface_format,
            sample_count: context.sample_count,
        };
        let user_target = match config.mode {
            RenderMode::SinglePass => surface_target,
            RenderMode::Simulation => PipelineTarget {
                format: STATE_FORMAT,
                sample_count: 1,
            },
        };
        let user = ShaderPipeline::new(
            device,
            &layouts,
            &config.fragment.label,
            user_fragment,
            user_target,
        )?;
        let display = ShaderPipeline::new(
            device,
            &layouts,
            "display program",
            &wrap_fragment(DISPLAY_FRAGMENT_GLSL, FragCoordOrigin::BottomLeft),
            surface_target,
        )?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shader params"),
            size: std::mem::size_of::<ShaderParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shader params bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let state_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("state sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let multisample_target = (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        Ok(Self {
            context,
            layouts,
            user,
            display,
            uniform_buffer,
            uniform_bind_group,
            state_sampler,
            multisample_target,
            frame: None,
            _window: window,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 || new_size == self.context.size {
            return;
        }
        self.context.resize(new_size);
        if self.context.sample_count > 1 {
            self.multisample_target = Some(MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                new_size,
                self.context.sample_count,
            ));
        }
        tracing::debug!(
            width = new_size.width,
            height = new_size.height,
            "resized surface"
        );
    }

    pub(crate) fn sample_count(&self) -> u32 {
        self.context.sample_count
    }

    /// Surfaces the first asynchronous device error since the last check.
    fn check_device(&self) -> Result<(), RenderError> {
        match self.context.errors.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl TargetAllocator for GpuState {
    type Target = GpuTarget;

    fn allocate_target(&mut self, spec: &TargetSpec<'_>) -> Result<GpuTarget, RenderError> {
        if let Some(pixels) = spec.initial {
            if pixels.len() != spec.extent.pixel_count() {
                return Err(RenderError::TargetValidation {
                    label: spec.label.to_string(),
                    reason: format!(
                        "initial data has {} pixels, expected {}",
                        pixels.len(),
                        spec.extent.pixel_count()
                    ),
                });
            }
        }

        let device = &self.context.device;
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let descriptor = wgpu::TextureDescriptor {
            label: Some(spec.label),
            size: wgpu::Extent3d {
                width: spec.extent.width.max(1),
                height: spec.extent.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        };
        let texture = match spec.initial {
            Some(pixels) => device.create_texture_with_data(
                &self.context.queue,
                &descriptor,
                wgpu::util::TextureDataOrder::LayerMajor,
                bytemuck::cast_slice(pixels),
            ),
            None => device.create_texture(&descriptor),
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(spec.label),
            layout: &self.layouts.state_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.state_sampler),
                },
            ],
        });

        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        let allocation_error = validation.or(out_of_memory).map(|err| err.to_string());

        tracing::debug!(
            label = spec.label,
            width = spec.extent.width,
            height = spec.extent.height,
            seeded = spec.initial.is_some(),
            "allocated offscreen target"
        );

        Ok(GpuTarget {
            label: spec.label.to_string(),
            extent: spec.extent,
            texture,
            view,
            bind_group,
            allocation_error,
        })
    }

    fn validate_target(&mut self, target: &GpuTarget) -> Result<(), RenderError> {
        let fail = |reason: String| RenderError::TargetValidation {
            label: target.label.clone(),
            reason,
        };
        if !self.context.state_renderable {
            return Err(fail(format!(
                "{STATE_FORMAT:?} is not renderable on this adapter"
            )));
        }
        if let Some(reason) = &target.allocation_error {
            return Err(fail(reason.clone()));
        }
        let Extent { width, height } = target.extent;
        let max = self.context.max_texture_dimension;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(fail(format!(
                "size {width}x{height} outside the supported range 1..={max}"
            )));
        }
        Ok(())
    }

    fn release_target(&mut self, target: GpuTarget) {
        let GpuTarget {
            label,
            texture,
            view,
            bind_group,
            ..
        } = target;
        drop(bind_group);
        drop(view);
        texture.destroy();
        tracing::trace!(label = %label, "released offscreen target");
    }
}

impl RenderBackend for GpuState {
    fn framebuffer_size(&self) -> Extent {
        Extent::new(self.context.size.width, self.context.size.height)
    }

    fn begin_frame(&mut self) -> Result<FrameStatus, RenderError> {
        self.check_device()?;

        let surface_texture = match self.context.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                self.context.reconfigure();
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("timed out waiting for the next surface frame");
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(RenderError::gpu(
                    GpuErrorKind::OutOfMemory,
                    "out of memory while acquiring a surface frame",
                ));
            }
            Err(other) => return Err(RenderError::FrameAcquire(other.to_string())),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        self.frame = Some(InFlightFrame {
            surface_texture,
            view,
            encoder,
        });
        Ok(FrameStatus::Ready)
    }

    fn draw(&mut self, call: &DrawCall<'_, GpuTarget>) -> Result<(), RenderError> {
        let frame = self.frame.as_mut().ok_or(RenderError::FrameNotStarted)?;
        let pipeline = match call.program {
            Program::User => &self.user,
            Program::Display => &self.display,
        };

        let state_bind_group = match (pipeline.samples_state, call.sampled) {
            (true, Some(target)) => Some(&target.bind_group),
            (true, None) => {
                return Err(RenderError::TargetValidation {
                    label: "state texture".to_string(),
                    reason: "program samples state but no target was supplied".to_string(),
                })
            }
            (false, _) => None,
        };

        // Each pass gets its own copy so earlier passes in the encoder keep their values.
        let params = ShaderParams::for_pass(&call.params);
        let staging = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shader params staging"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::COPY_SRC,
            });
        frame.encoder.copy_buffer_to_buffer(
            &staging,
            0,
            &self.uniform_buffer,
            0,
            std::mem::size_of::<ShaderParams>() as u64,
        );

        let (attachment_view, resolve_target) = match call.destination {
            Destination::Surface => match self.multisample_target.as_ref() {
                Some(msaa) => (&msaa.view, Some(&frame.view)),
                None => (&frame.view, None),
            },
            Destination::Target(target) => (&target.view, None),
        };

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fullscreen pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: attachment_view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&pipeline.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        if let Some(state) = state_bind_group {
            render_pass.set_bind_group(1, state, &[]);
        }
        render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let frame = self.frame.take().ok_or(RenderError::FrameNotStarted)?;
        self.context.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.surface_texture.present();
        self.check_device()
    }
}
