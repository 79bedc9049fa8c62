use crate::foundation::core::PixelSize;
use crate::foundation::error::{MatteError, MatteResult};
use crate::key::params::KeyParams;
use crate::media::frame::VideoFrame;
use crate::render::{Compositor, FrameRGBA};
use crate::shader;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct SourceTexture {
    size: PixelSize,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Keying compositor on a headless wgpu render target.
///
/// Owns its device, pipeline, vertex buffer and source texture; nothing is shared between
/// compositors. The source texture is rewritten every frame and reallocated only when the frame
/// size changes.
pub struct GpuCompositor {
    size: PixelSize,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertices: wgpu::Buffer,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    readback_bytes_per_row: u32,
    source: Option<SourceTexture>,
}

impl GpuCompositor {
    /// Acquire an adapter and device and build the keying pipeline.
    ///
    /// Fails with `"no gpu adapter available"` when the machine has no usable adapter.
    #[tracing::instrument(skip_all, fields(width = size.width, height = size.height))]
    pub fn new(size: PixelSize, params: &KeyParams) -> MatteResult<Self> {
        params.validate()?;
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                MatteError::gpu("no gpu adapter available")
            }
            other => MatteError::gpu(format!("wgpu request_adapter failed: {other:?}")),
        })?;
        tracing::debug!(adapter = ?adapter.get_info().name, "gpu adapter acquired");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("chroma_matte_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                .using_resolution(adapter.limits()),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| MatteError::gpu(format!("wgpu request_device failed: {e:?}")))?;

        let max_dim = device.limits().max_texture_dimension_2d;
        if size.width > max_dim || size.height > max_dim {
            return Err(MatteError::gpu(format!(
                "surface {}x{} exceeds the adapter limit of {max_dim}",
                size.width, size.height
            )));
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("chroma_matte_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("chroma_matte_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("chroma_matte_shader"),
            source: wgpu::ShaderSource::Wgsl(shader::wgsl_source(params).into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("chroma_matte_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_attributes = [
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: shader::QUAD_POS_OFFSET_BYTES,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: shader::QUAD_UV_OFFSET_BYTES,
                shader_location: 1,
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("chroma_matte_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(shader::WGSL_VERTEX_ENTRY),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: shader::QUAD_STRIDE_BYTES,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(shader::WGSL_FRAGMENT_ENTRY),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_bytes = shader::quad_vertex_bytes();
        let vertices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chroma_matte_quad"),
            size: vertex_bytes.len() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertices, 0, &vertex_bytes);

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("chroma_matte_target"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let bytes_per_row_unpadded = size
            .width
            .checked_mul(4)
            .ok_or_else(|| MatteError::gpu("render target width overflow"))?;
        let readback_bytes_per_row =
            align_to(bytes_per_row_unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let buffer_size = u64::from(readback_bytes_per_row)
            .checked_mul(u64::from(size.height))
            .ok_or_else(|| MatteError::gpu("readback buffer size overflow"))?;
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chroma_matte_readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            size,
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            vertices,
            target,
            target_view,
            readback,
            readback_bytes_per_row,
            source: None,
        })
    }

    fn ensure_source(&mut self, size: PixelSize) {
        if self.source.as_ref().is_none_or(|s| s.size != size) {
            tracing::debug!(width = size.width, height = size.height, "allocating source texture");
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("chroma_matte_source"),
                size: extent(size),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("chroma_matte_bg"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.source = Some(SourceTexture {
                size,
                texture,
                bind_group,
            });
        }
    }

    fn clear_pass<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("chroma_matte_rp"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target_view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

impl Compositor for GpuCompositor {
    fn surface_size(&self) -> PixelSize {
        self.size
    }

    fn clear(&mut self) -> MatteResult<()> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chroma_matte_clear_encoder"),
            });
        drop(self.clear_pass(&mut encoder));
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn draw(&mut self, frame: &VideoFrame) -> MatteResult<()> {
        let frame_size = frame.size();
        let max_dim = self.device.limits().max_texture_dimension_2d;
        if frame_size.width > max_dim || frame_size.height > max_dim {
            return Err(MatteError::gpu(format!(
                "frame {}x{} exceeds the adapter limit of {max_dim}",
                frame_size.width, frame_size.height
            )));
        }

        self.ensure_source(frame_size);
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| MatteError::gpu("source texture not initialized"))?;
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &source.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.data.as_slice(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame_size.width * 4),
                rows_per_image: Some(frame_size.height),
            },
            extent(frame_size),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chroma_matte_draw_encoder"),
            });
        {
            let mut rp = self.clear_pass(&mut encoder);
            rp.set_viewport(
                0.0,
                0.0,
                self.size.width as f32,
                self.size.height as f32,
                0.0,
                1.0,
            );
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &source.bind_group, &[]);
            rp.set_vertex_buffer(0, self.vertices.slice(..));
            rp.draw(0..shader::QUAD_VERTEX_COUNT, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn readback(&mut self) -> MatteResult<FrameRGBA> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chroma_matte_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.readback_bytes_per_row),
                    rows_per_image: Some(self.size.height),
                },
            },
            extent(self.size),
        );
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| MatteError::gpu(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| MatteError::gpu("readback channel closed"))?
            .map_err(|e| MatteError::gpu(format!("readback map failed: {e:?}")))?;

        let mapped = buffer_slice.get_mapped_range();
        let row_bytes = self.size.width as usize * 4;
        let padded_row_bytes = self.readback_bytes_per_row as usize;
        let mut out = Vec::with_capacity(row_bytes * self.size.height as usize);
        for row in 0..self.size.height as usize {
            let start = row * padded_row_bytes;
            out.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        self.readback.unmap();

        Ok(FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data: out,
            premultiplied: true,
        })
    }
}

fn extent(size: PixelSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
