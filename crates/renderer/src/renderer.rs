//! wgpu renderer: surface management, uniforms, and the frame render pass.

use std::sync::Arc;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::camera::{Camera, CameraUniform};
use crate::mesh::Mesh;
use crate::pipeline::{
    camera_bind_group_layout, create_scene_pipeline, create_sky_pipeline, light_bind_group_layout,
    texture_bind_group_layout,
};
use crate::texture::Texture;
use crate::vertex::InstanceData;

/// Shared instance buffer capacity. The city streamer caps out around
/// 3.6k buildings at render distance 25; decorations and pickups add a few
/// hundred more.
const MAX_INSTANCES: usize = 16384;

/// Per-frame lighting and atmosphere parameters.
#[derive(Debug, Clone, Copy)]
pub struct LightingParams {
    pub sun_direction: Vec3,
    pub sun_intensity: f32,
    pub ambient_intensity: f32,
    /// Clear color, sRGB components in 0..1.
    pub sky_color: [f32; 3],
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LightUniform {
    sun_direction: [f32; 4],
    intensities: [f32; 4],
    fog_color: [f32; 4],
    fog_params: [f32; 4],
}

impl LightUniform {
    fn from_params(params: &LightingParams) -> Self {
        Self {
            sun_direction: [
                params.sun_direction.x,
                params.sun_direction.y,
                params.sun_direction.z,
                0.0,
            ],
            intensities: [params.sun_intensity, params.ambient_intensity, 0.0, 0.0],
            fog_color: [
                params.fog_color[0],
                params.fog_color[1],
                params.fog_color[2],
                1.0,
            ],
            fog_params: [params.fog_near, params.fog_far, 0.0, 0.0],
        }
    }
}

/// One instanced draw: a mesh, an optional texture, and its instances.
pub struct DrawBatch<'a> {
    pub mesh: &'a Mesh,
    pub texture: Option<&'a wgpu::BindGroup>,
    pub instances: &'a [InstanceData],
}

/// Everything to draw this frame. Opaque batches render first, then the
/// transparent ones (alpha-blended, depth read-only).
#[derive(Default)]
pub struct FrameDraws<'a> {
    pub sky: Option<DrawBatch<'a>>,
    pub opaque: Vec<DrawBatch<'a>>,
    pub transparent: Vec<DrawBatch<'a>>,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    window: Arc<Window>,

    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    default_texture_bind_group: wgpu::BindGroup,

    depth_texture: Texture,
    instance_buffer: wgpu::Buffer,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no suitable GPU adapter found"))?;

        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
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

        // Mailbox presents the most recent frame at vblank, reducing input
        // lag vs Fifo. Fall back to AutoVsync where unavailable.
        let present_mode = if vsync {
            surface_caps
                .present_modes
                .iter()
                .find(|m| matches!(m, wgpu::PresentMode::Mailbox))
                .copied()
                .unwrap_or(wgpu::PresentMode::AutoVsync)
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        let camera_layout = camera_bind_group_layout(&device);
        let light_layout = light_bind_group_layout(&device);
        let texture_layout = texture_bind_group_layout(&device);

        let camera_uniform = CameraUniform {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0, 0.0, 0.0, 1.0],
        };
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let light_uniform = LightUniform::from_params(&LightingParams {
            sun_direction: Vec3::new(0.5, 1.0, 0.3),
            sun_intensity: 1.0,
            ambient_intensity: 0.7,
            sky_color: [0.53, 0.81, 0.92],
            fog_color: [0.8, 0.8, 0.8],
            fog_near: 40.0,
            fog_far: 500.0,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[light_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Light Bind Group"),
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        let default_texture = Texture::white_pixel(&device, &queue);
        let default_texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Default Texture Bind Group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&default_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&default_texture.sampler),
                },
            ],
        });

        let opaque_pipeline = create_scene_pipeline(
            &device,
            config.format,
            &camera_layout,
            &light_layout,
            &texture_layout,
            false,
        );
        let transparent_pipeline = create_scene_pipeline(
            &device,
            config.format,
            &camera_layout,
            &light_layout,
            &texture_layout,
            true,
        );
        let sky_pipeline = create_sky_pipeline(&device, config.format, &camera_layout, &texture_layout);

        let depth_texture = Texture::create_depth_texture(&device, &config, "depth_texture");

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceData>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            opaque_pipeline,
            transparent_pipeline,
            sky_pipeline,
            camera_buffer,
            camera_bind_group,
            light_buffer,
            light_bind_group,
            texture_layout,
            default_texture_bind_group,
            depth_texture,
            instance_buffer,
            clear_color: wgpu::Color {
                r: 0.53,
                g: 0.81,
                b: 0.92,
                a: 1.0,
            },
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn update_camera(&mut self, camera: &Camera) {
        let uniform = camera.uniform();
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn update_lighting(&mut self, params: &LightingParams) {
        let uniform = LightUniform::from_params(params);
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[uniform]));
        // The surface is sRGB; clear color is specified in linear space.
        self.clear_color = wgpu::Color {
            r: srgb_to_linear(params.sky_color[0]),
            g: srgb_to_linear(params.sky_color[1]),
            b: srgb_to_linear(params.sky_color[2]),
            a: 1.0,
        };
    }

    /// Bind group for a loaded texture, usable in [`DrawBatch::texture`].
    pub fn create_texture_bind_group(&self, texture: &Texture, label: &str) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    pub fn render(&mut self, frame: &FrameDraws) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                anyhow::bail!("surface out of memory");
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Pack every batch's instances into the shared buffer, recording the
        // byte range each draw reads from.
        let stride = std::mem::size_of::<InstanceData>() as wgpu::BufferAddress;
        let mut cursor: usize = 0;
        let mut ranges: Vec<Option<(wgpu::BufferAddress, u32)>> = Vec::new();
        let all_batches = frame
            .sky
            .iter()
            .chain(frame.opaque.iter())
            .chain(frame.transparent.iter());
        for batch in all_batches {
            if batch.instances.is_empty() {
                ranges.push(None);
                continue;
            }
            if cursor + batch.instances.len() > MAX_INSTANCES {
                log::warn!(
                    "instance buffer full ({} instances), dropping batch of {}",
                    cursor,
                    batch.instances.len()
                );
                ranges.push(None);
                continue;
            }
            let offset = cursor as wgpu::BufferAddress * stride;
            self.queue.write_buffer(
                &self.instance_buffer,
                offset,
                bytemuck::cast_slice(batch.instances),
            );
            ranges.push(Some((offset, batch.instances.len() as u32)));
            cursor += batch.instances.len();
        }
        let mut range_iter = ranges.into_iter();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(sky) = &frame.sky {
                if let Some((offset, count)) = range_iter.next().flatten() {
                    pass.set_pipeline(&self.sky_pipeline);
                    pass.set_bind_group(0, &self.camera_bind_group, &[]);
                    pass.set_bind_group(
                        1,
                        sky.texture.unwrap_or(&self.default_texture_bind_group),
                        &[],
                    );
                    self.draw_batch(&mut pass, sky, offset, count, stride);
                }
            }

            pass.set_pipeline(&self.opaque_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_bind_group(1, &self.light_bind_group, &[]);
            for batch in &frame.opaque {
                if let Some((offset, count)) = range_iter.next().flatten() {
                    pass.set_bind_group(
                        2,
                        batch.texture.unwrap_or(&self.default_texture_bind_group),
                        &[],
                    );
                    self.draw_batch(&mut pass, batch, offset, count, stride);
                }
            }

            pass.set_pipeline(&self.transparent_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_bind_group(1, &self.light_bind_group, &[]);
            for batch in &frame.transparent {
                if let Some((offset, count)) = range_iter.next().flatten() {
                    pass.set_bind_group(
                        2,
                        batch.texture.unwrap_or(&self.default_texture_bind_group),
                        &[],
                    );
                    self.draw_batch(&mut pass, batch, offset, count, stride);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn draw_batch<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        batch: &DrawBatch<'a>,
        offset: wgpu::BufferAddress,
        count: u32,
        stride: wgpu::BufferAddress,
    ) {
        let end = offset + count as wgpu::BufferAddress * stride;
        pass.set_vertex_buffer(0, batch.mesh.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(offset..end));
        pass.set_index_buffer(batch.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..batch.mesh.num_indices, 0, 0..count);
    }
}

fn srgb_to_linear(c: f32) -> f64 {
    let c = c as f64;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
