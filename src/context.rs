use std::sync::Arc;

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::texture::{self, TextureHandle},
    pipelines::{
        Pipelines,
        light::{self, GlobalsUniform},
        text::TextPass,
    },
    render::{Viewport, frame::Frame},
};

/// The GPU side of the window: surface, device, pipelines and the shared
/// bind group layouts.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipelines: Pipelines,
    pub texture_layout: wgpu::BindGroupLayout,
    pub globals_layout: wgpu::BindGroupLayout,
    pub text: TextPass,
    /// Bound for every batch drawn without a texture.
    pub white: TextureHandle,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::debug!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        log::debug!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("could not open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colours and expects an sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );
        let texture_layout = texture::texture_bind_group_layout(&device);
        let globals_layout = light::mk_bind_group_layout(&device);
        let pipelines = Pipelines::new(&device, &config, &globals_layout, &texture_layout);
        let white = Arc::new(texture::Texture::create_white(&device, &queue, &texture_layout));
        let text = TextPass::new(&device, &queue, config.format);

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            pipelines,
            texture_layout,
            globals_layout,
            text,
            white,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
    }

    /**
     * Draws one frame built by a [`FrameBuilder`](crate::render::frame::FrameBuilder).
     *
     * Each segment gets its own globals bind group and viewport; each batch
     * is uploaded into a fresh vertex buffer that is dropped with the frame.
     * Text runs are drawn over everything else. A frame whose text cannot be
     * prepared is still drawn, without its text.
     */
    pub fn render(&mut self, frame: &Frame<TextureHandle>) -> Result<(), wgpu::SurfaceError> {
        let (width, height) = (self.config.width, self.config.height);
        let has_text = match self
            .text
            .prepare(&self.device, &self.queue, width, height, &frame.texts)
        {
            Ok(()) => !frame.texts.is_empty(),
            Err(e) => {
                log::warn!("frame text skipped: {}", e);
                false
            }
        };

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let globals: Vec<wgpu::BindGroup> = frame
            .segments
            .iter()
            .map(|segment| {
                let buffer = light::mk_buffer(&self.device, GlobalsUniform::from_state(&segment.state));
                light::mk_bind_group(&self.device, &self.globals_layout, &buffer)
            })
            .collect();
        let vertex_buffers: Vec<Vec<wgpu::Buffer>> = frame
            .segments
            .iter()
            .map(|segment| {
                segment
                    .batches
                    .iter()
                    .map(|batch| {
                        self.device
                            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("Batch Vertex Buffer"),
                                contents: bytemuck::cast_slice(&batch.vertices),
                                usage: wgpu::BufferUsages::VERTEX,
                            })
                    })
                    .collect()
            })
            .collect();

        let [r, g, b, a] = frame.clear.unwrap_or([0.0, 0.0, 0.0, 1.0]);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            for ((segment, globals), buffers) in frame
                .segments
                .iter()
                .zip(globals.iter())
                .zip(vertex_buffers.iter())
            {
                let v = Viewport::fit(segment.state.viewport, width, height);
                render_pass.set_viewport(
                    v.x as f32,
                    v.y as f32,
                    v.width as f32,
                    v.height as f32,
                    0.0,
                    1.0,
                );
                render_pass.set_bind_group(0, globals, &[]);
                for (batch, buffer) in segment.batches.iter().zip(buffers.iter()) {
                    let Some(pipeline) = self.pipelines.get(batch.topology, segment.state.depth_test)
                    else {
                        continue;
                    };
                    let texture = batch.texture.as_ref().unwrap_or(&self.white);
                    let Some(bind_group) = texture.bind_group.as_ref() else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, bind_group, &[]);
                    render_pass.set_vertex_buffer(0, buffer.slice(..));
                    render_pass.draw(0..batch.vertices.len() as u32, 0..1);
                }
            }

            if has_text {
                render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
                if let Err(e) = self.text.render(&mut render_pass) {
                    log::warn!("frame text not drawn: {}", e);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.text.trim();
        Ok(())
    }
}
