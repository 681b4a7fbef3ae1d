//! Identification text in the bottom-right corner of the window.

use cgmath::{Matrix4, ortho};

use crate::{
    config::OverlayConfig,
    render::{Capability, RenderContext, Viewport},
};

/// Overlay coordinates: x in `0..14`, y in `-8..0`.
pub const EXTENT: [f32; 4] = [0.0, 14.0, -8.0, 0.0];
/// Top-left corner of the first line.
pub const ORIGIN: [f32; 2] = [1.0, -3.5];
pub const LINE_HEIGHT: f32 = 1.0;
pub const TEXT_HEIGHT: f32 = 0.6;

/// The corner viewport: one fifth of the window in each dimension.
pub fn viewport(width: u32, height: u32) -> Viewport {
    Viewport {
        x: width / 5 * 4,
        y: height - height / 5,
        width: (width / 5).max(1),
        height: (height / 5).max(1),
    }
}

pub fn projection() -> Matrix4<f32> {
    let [left, right, bottom, top] = EXTENT;
    ortho(left, right, bottom, top, -1.0, 1.0)
}

/// A run of underscores as long as `line`, drawn over it as its underline.
pub fn underline(line: &str) -> String {
    "_".repeat(line.chars().count())
}

pub struct Overlay {
    colour: [f32; 4],
    lines: Vec<String>,
}

impl Overlay {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            colour: config.colour,
            lines: config.lines.clone(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Draws into the corner viewport. Leaves viewport and projection set to
    /// the overlay's; the caller restores its own.
    pub fn draw<C: RenderContext>(&self, ctx: &mut C, width: u32, height: u32) {
        ctx.set_viewport(viewport(width, height));
        ctx.set_projection(projection());
        ctx.disable(Capability::DepthTest);
        ctx.disable(Capability::Lighting);
        ctx.disable(Capability::ColorTracking);
        ctx.disable(Capability::Texturing);
        ctx.push_matrix();
        ctx.load_identity();
        ctx.translate(ORIGIN[0], ORIGIN[1], 0.0);
        ctx.color(self.colour);
        for (idx, line) in self.lines.iter().filter(|l| !l.is_empty()).enumerate() {
            let position = [0.0, -(idx as f32) * LINE_HEIGHT, 0.0];
            ctx.text(position, TEXT_HEIGHT, line);
            ctx.text(position, TEXT_HEIGHT, &underline(line));
        }
        ctx.pop_matrix();
    }
}
