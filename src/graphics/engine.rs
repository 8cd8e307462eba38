use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;
use winit::window::Window;

use super::{canvas_quad, create_canvas_pipeline, letterbox_scale, CanvasTexture, VertexBuffer};
use crate::render::PixelCanvas;

/// Presents the pixel canvas in the window and hosts the overlay pass.
pub struct GraphicsEngine {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,

    pipeline: wgpu::RenderPipeline,
    canvas_texture: CanvasTexture,
    vertex_buffer: VertexBuffer,
    canvas_size: (u32, u32),
}

impl GraphicsEngine {
    pub async fn new(window: Arc<Window>, canvas_width: u32, canvas_height: u32) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("Failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find an appropriate adapter"))?;

        info!("Using graphics adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await
            .context("Failed to create graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let bind_group_layout = CanvasTexture::bind_group_layout(&device);
        let canvas_texture = CanvasTexture::new(&device, &bind_group_layout, canvas_width, canvas_height);
        let pipeline = create_canvas_pipeline(&device, surface_format, &bind_group_layout);

        let (sx, sy) = letterbox_scale(size.width, size.height, canvas_width, canvas_height);
        let vertex_buffer = VertexBuffer::new(&device, &canvas_quad(sx, sy));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            canvas_texture,
            vertex_buffer,
            canvas_size: (canvas_width, canvas_height),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (sx, sy) = letterbox_scale(
                new_size.width,
                new_size.height,
                self.canvas_size.0,
                self.canvas_size.1,
            );
            self.vertex_buffer.update(&self.queue, &canvas_quad(sx, sy));
        }
    }

    /// Uploads `canvas`, draws it, then lets `overlay` record further passes
    /// into the same encoder. Command buffers returned by `overlay` are
    /// submitted ahead of the frame's own encoder.
    pub fn render<F>(&mut self, canvas: &PixelCanvas, overlay: F) -> Result<()>
    where
        F: FnOnce(
            &mut wgpu::CommandEncoder,
            &wgpu::TextureView,
            &wgpu::Device,
            &wgpu::Queue,
        ) -> Result<Vec<wgpu::CommandBuffer>>,
    {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.resize(self.size);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.canvas_texture.upload(&self.queue, canvas.pixels());

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, self.canvas_texture.bind_group(), &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.buffer.slice(..));
            render_pass.draw(0..self.vertex_buffer.vertex_count, 0..1);
        }

        let extra = overlay(&mut encoder, &view, &self.device, &self.queue)?;

        self.queue
            .submit(extra.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }
}
