//! wgpu presentation shell for the kinematics engine.
//!
//! The engine computes positions on the CPU; this module owns the window
//! surface, a point-sprite pipeline, and one vertex buffer per drawn layer
//! (the galaxy cloud plus any trajectory overlays). Position buffers are
//! refilled from the engine every frame with `queue.write_buffer`.
//!
//! Sprites are blended additively over a black clear, so overlapping
//! particles brighten toward white the way the reference renderer does.

use std::sync::Arc;
use std::sync::mpsc;

use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::{CaptureError, RenderError};
use crate::shader::{SpriteStyle, Uniforms, SPRITE_SHADER};

/// Additive blending: `src.rgb * src.a + dst.rgb`.
const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Galaxy sprite appearance, matching the reference point cloud.
pub const GALAXY_COLOR: [f32; 4] = [0.8, 0.8, 1.0, 0.1];
const GALAXY_SPRITE_SIZE: f32 = 0.008;
const TRAIL_SPRITE_SIZE: f32 = 0.012;

/// 2D orthographic camera with scroll zoom and drag pan.
pub struct Camera {
    pub center: Vec2,
    /// Half the vertical world extent visible in the window.
    pub half_extent: f32,
}

impl Camera {
    fn new() -> Self {
        Self {
            center: Vec2::ZERO,
            // Wide enough for the tail of the half-normal radius draw.
            half_extent: 2.5,
        }
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.half_extent = (self.half_extent * (1.0 - scroll * 0.1)).clamp(0.1, 20.0);
    }

    pub fn pan_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let world_per_pixel = 2.0 * self.half_extent / viewport_height.max(1.0);
        self.center.x -= dx * world_per_pixel;
        self.center.y += dy * world_per_pixel;
    }

    fn view_proj(&self, aspect: f32) -> Mat4 {
        let h = self.half_extent;
        let w = h * aspect;
        Mat4::orthographic_rh(
            self.center.x - w,
            self.center.x + w,
            self.center.y - h,
            self.center.y + h,
            -1.0,
            1.0,
        )
    }
}

/// One drawable point-sprite layer: a position buffer plus its style.
struct SpriteLayer {
    position_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Instances currently valid in the buffer.
    len: u32,
    /// Maximum instances the buffer can hold.
    capacity: u32,
}

/// A frame read back from the surface, tightly packed RGBA8.
pub struct FramePixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Per-frame failure: either the swapchain or the capture readback.
#[derive(Debug)]
pub enum FrameError {
    Surface(wgpu::SurfaceError),
    Capture(CaptureError),
}

impl From<wgpu::SurfaceError> for FrameError {
    fn from(e: wgpu::SurfaceError) -> Self {
        FrameError::Surface(e)
    }
}

impl From<CaptureError> for FrameError {
    fn from(e: CaptureError) -> Self {
        FrameError::Capture(e)
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    sprite_bind_group_layout: wgpu::BindGroupLayout,
    galaxy: SpriteLayer,
    trails: Vec<SpriteLayer>,
    pub camera: Camera,
    /// Readback buffer for frame export; recreated on resize.
    readback: Option<wgpu::Buffer>,
    export_frames: bool,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        particle_capacity: u32,
        export_frames: bool,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if export_frames {
            usage |= wgpu::TextureUsages::COPY_SRC;
        }

        let config = wgpu::SurfaceConfiguration {
            usage,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera = Camera::new();
        let aspect = config.width as f32 / config.height as f32;
        let uniforms = Uniforms {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sprite_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(SPRITE_SHADER.into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&sprite_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(ADDITIVE_BLEND),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let galaxy = Self::create_layer(
            &device,
            &sprite_bind_group_layout,
            &uniform_buffer,
            particle_capacity,
            GALAXY_COLOR,
            GALAXY_SPRITE_SIZE,
            "Galaxy",
        );

        let readback = export_frames.then(|| Self::create_readback_buffer(&device, &config));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            uniform_buffer,
            sprite_bind_group_layout,
            galaxy,
            trails: Vec::new(),
            camera,
            readback,
            export_frames,
        })
    }

    fn create_layer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        capacity: u32,
        color: [f32; 4],
        size: f32,
        label: &str,
    ) -> SpriteLayer {
        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Position Buffer", label)),
            size: capacity as u64 * std::mem::size_of::<Vec3>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let style = SpriteStyle {
            color,
            size,
            _padding: [0.0; 3],
        };
        let style_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Style Buffer", label)),
            contents: bytemuck::cast_slice(&[style]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", label)),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: style_buffer.as_entire_binding(),
                },
            ],
        });

        SpriteLayer {
            position_buffer,
            bind_group,
            len: 0,
            capacity,
        }
    }

    fn create_readback_buffer(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::Buffer {
        let padded = padded_bytes_per_row(config.width);
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Readback Buffer"),
            size: padded as u64 * config.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Register a trajectory overlay with the given color and capacity.
    /// Returns the layer id used with [`upload_trail`](Self::upload_trail).
    pub fn add_trail_layer(&mut self, color: [f32; 4], capacity: u32) -> usize {
        let layer = Self::create_layer(
            &self.device,
            &self.sprite_bind_group_layout,
            &self.uniform_buffer,
            capacity,
            color,
            TRAIL_SPRITE_SIZE,
            "Trail",
        );
        self.trails.push(layer);
        self.trails.len() - 1
    }

    /// Refill the galaxy position buffer from the engine's position view.
    pub fn upload_positions(&mut self, positions: &[Vec3]) {
        let n = positions.len().min(self.galaxy.capacity as usize);
        self.queue.write_buffer(
            &self.galaxy.position_buffer,
            0,
            bytemuck::cast_slice(&positions[..n]),
        );
        self.galaxy.len = n as u32;
    }

    /// Refill a trajectory layer's position buffer.
    pub fn upload_trail(&mut self, layer: usize, points: &[Vec3]) {
        let trail = &mut self.trails[layer];
        let n = points.len().min(trail.capacity as usize);
        if n > 0 {
            self.queue
                .write_buffer(&trail.position_buffer, 0, bytemuck::cast_slice(&points[..n]));
        }
        trail.len = n as u32;
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            if self.export_frames {
                self.readback = Some(Self::create_readback_buffer(&self.device, &self.config));
            }
        }
    }

    fn update_uniforms(&mut self) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let uniforms = Uniforms {
            view_proj: self.camera.view_proj(aspect).to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Draw one frame. With `capture` set, the presented pixels are also
    /// read back and returned for encoding.
    pub fn render(&mut self, capture: bool) -> Result<Option<FramePixels>, FrameError> {
        self.update_uniforms();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);

            render_pass.set_bind_group(0, &self.galaxy.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.galaxy.position_buffer.slice(..));
            render_pass.draw(0..6, 0..self.galaxy.len);

            for trail in &self.trails {
                if trail.len == 0 {
                    continue;
                }
                render_pass.set_bind_group(0, &trail.bind_group, &[]);
                render_pass.set_vertex_buffer(0, trail.position_buffer.slice(..));
                render_pass.draw(0..6, 0..trail.len);
            }
        }

        let do_capture = capture && self.readback.is_some();
        if do_capture {
            let readback = self.readback.as_ref().ok_or_else(|| {
                CaptureError::BufferMapping("readback buffer missing".to_string())
            })?;
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture: &output.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: readback,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(padded_bytes_per_row(self.config.width)),
                        rows_per_image: Some(self.config.height),
                    },
                },
                wgpu::Extent3d {
                    width: self.config.width,
                    height: self.config.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        let pixels = if do_capture {
            Some(self.read_frame()?)
        } else {
            None
        };

        output.present();
        Ok(pixels)
    }

    /// Map the readback buffer and repack it as tight RGBA rows.
    fn read_frame(&self) -> Result<FramePixels, CaptureError> {
        let readback = self
            .readback
            .as_ref()
            .ok_or_else(|| CaptureError::BufferMapping("readback buffer missing".to_string()))?;

        let slice = readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| CaptureError::BufferMapping("map callback dropped".to_string()))?
            .map_err(|e| CaptureError::BufferMapping(e.to_string()))?;

        let width = self.config.width;
        let height = self.config.height;
        let padded = padded_bytes_per_row(width) as usize;
        let row_bytes = width as usize * 4;

        let mut rgba = vec![0u8; row_bytes * height as usize];
        {
            let data = slice.get_mapped_range();
            for (row, chunk) in rgba.chunks_exact_mut(row_bytes).enumerate() {
                let start = row * padded;
                chunk.copy_from_slice(&data[start..start + row_bytes]);
            }
        }
        readback.unmap();

        // Surface pixels may be BGRA; normalize so callers always see RGBA.
        match self.config.format {
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {}
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
                for px in rgba.chunks_exact_mut(4) {
                    px.swap(0, 2);
                }
            }
            other => return Err(CaptureError::UnsupportedFormat(other)),
        }

        Ok(FramePixels {
            width,
            height,
            rgba,
        })
    }
}

fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}
