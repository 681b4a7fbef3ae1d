//! Frame text through glyphon.
//!
//! Every [`TextRun`] of a frame is shaped into its own buffer, placed inside
//! its viewport and clipped to it. Text is drawn last, over all geometry,
//! with the depth attachment bound but neither compared nor written.

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, PrepareError, RenderError,
    Resolution, Shaping, SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer, Weight,
};

use crate::{data_structures::texture::Texture, render::frame::TextRun};

fn depth_stencil() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: Texture::DEPTH_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn glyph_colour([r, g, b, a]: [f32; 4]) -> Color {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::rgba(byte(r), byte(g), byte(b), byte(a))
}

pub struct TextPass {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: glyphon::Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    buffers: Vec<Buffer>,
}

impl std::fmt::Debug for TextPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPass")
            .field("buffers", &self.buffers.len())
            .finish()
    }
}

impl TextPass {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let cache = Cache::new(device);
        let viewport = glyphon::Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let renderer = TextRenderer::new(
            &mut atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(depth_stencil()),
        );
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            viewport,
            atlas,
            renderer,
            buffers: Vec::new(),
        }
    }

    /// Shapes `runs` and uploads their glyphs for a `width` × `height`
    /// surface.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        runs: &[TextRun],
    ) -> Result<(), PrepareError> {
        self.viewport.update(queue, Resolution { width, height });

        let font_system = &mut self.font_system;
        self.buffers = runs
            .iter()
            .map(|run| {
                let (_, _, line_height) = run.placement(width, height);
                let mut buffer = Buffer::new(font_system, Metrics::new(line_height, line_height));
                buffer.set_size(font_system, None, None);
                buffer.set_text(
                    font_system,
                    &run.text,
                    &Attrs::new().family(Family::Serif).weight(Weight::BOLD),
                    Shaping::Advanced,
                    None,
                );
                buffer.shape_until_scroll(font_system, false);
                buffer
            })
            .collect();

        let areas = runs.iter().zip(self.buffers.iter()).map(|(run, buffer)| {
            let (rect, [left, top], _) = run.placement(width, height);
            TextArea {
                buffer,
                left,
                top,
                scale: 1.0,
                bounds: TextBounds {
                    left: rect.x as i32,
                    top: rect.y as i32,
                    right: (rect.x + rect.width) as i32,
                    bottom: (rect.y + rect.height) as i32,
                },
                default_color: glyph_colour(run.colour),
                custom_glyphs: &[],
            }
        });
        self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.swash_cache,
        )
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) -> Result<(), RenderError> {
        if self.buffers.is_empty() {
            return Ok(());
        }
        self.renderer.render(&self.atlas, &self.viewport, pass)
    }

    /// Drops glyphs the last frame did not use from the atlas.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
