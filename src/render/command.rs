//! Recorded drawing commands.

use cgmath::Matrix4;

use crate::data_structures::material::MaterialParams;

use super::{Capability, LightSource, Primitive, RenderContext, Viewport};

/// One call on a [`RenderContext`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand<T> {
    PushMatrix,
    PopMatrix,
    LoadIdentity,
    MultMatrix(Matrix4<f32>),
    SetMaterial(MaterialParams),
    BindTexture(T),
    Enable(Capability),
    Disable(Capability),
    Begin(Primitive),
    End,
    Color([f32; 4]),
    Normal([f32; 3]),
    TexCoord([f32; 2]),
    Vertex([f32; 3]),
    Text {
        position: [f32; 3],
        height: f32,
        text: String,
    },
    Clear([f32; 4]),
    SetViewport(Viewport),
    SetProjection(Matrix4<f32>),
    SetGlobalAmbient([f32; 4]),
    SetLight(usize, LightSource),
    Flush,
}

/**
 * A context that records instead of drawing.
 *
 * Compiling a scene into a `CommandList` once and replaying it every frame is
 * the equivalent of a display list: the scene graph is walked a single time.
 * `translate`, `rotate` and `scale` are recorded as the matrices they
 * produce.
 */
#[derive(Clone, Debug)]
pub struct CommandList<T> {
    commands: Vec<DrawCommand<T>>,
}

impl<T> Default for CommandList<T> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<T: Clone> CommandList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand<T>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Re-issues every recorded command on `ctx`, in order.
    pub fn replay<C: RenderContext<Texture = T>>(&self, ctx: &mut C) {
        for command in &self.commands {
            match command {
                DrawCommand::PushMatrix => ctx.push_matrix(),
                DrawCommand::PopMatrix => ctx.pop_matrix(),
                DrawCommand::LoadIdentity => ctx.load_identity(),
                DrawCommand::MultMatrix(m) => ctx.mult_matrix(m),
                DrawCommand::SetMaterial(material) => ctx.set_material(material),
                DrawCommand::BindTexture(texture) => ctx.bind_texture(texture),
                DrawCommand::Enable(capability) => ctx.enable(*capability),
                DrawCommand::Disable(capability) => ctx.disable(*capability),
                DrawCommand::Begin(primitive) => ctx.begin(*primitive),
                DrawCommand::End => ctx.end(),
                DrawCommand::Color(c) => ctx.color(*c),
                DrawCommand::Normal(n) => ctx.normal(*n),
                DrawCommand::TexCoord(uv) => ctx.tex_coord(*uv),
                DrawCommand::Vertex(p) => ctx.vertex(*p),
                DrawCommand::Text {
                    position,
                    height,
                    text,
                } => ctx.text(*position, *height, text),
                DrawCommand::Clear(c) => ctx.clear(*c),
                DrawCommand::SetViewport(v) => ctx.set_viewport(*v),
                DrawCommand::SetProjection(p) => ctx.set_projection(*p),
                DrawCommand::SetGlobalAmbient(a) => ctx.set_global_ambient(*a),
                DrawCommand::SetLight(slot, light) => ctx.set_light(*slot, light),
                DrawCommand::Flush => ctx.flush(),
            }
        }
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DrawCommand<T>) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }
}

impl<T: Clone> RenderContext for CommandList<T> {
    type Texture = T;

    fn push_matrix(&mut self) {
        self.commands.push(DrawCommand::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.commands.push(DrawCommand::PopMatrix);
    }

    fn load_identity(&mut self) {
        self.commands.push(DrawCommand::LoadIdentity);
    }

    fn mult_matrix(&mut self, matrix: &Matrix4<f32>) {
        self.commands.push(DrawCommand::MultMatrix(*matrix));
    }

    fn set_material(&mut self, material: &MaterialParams) {
        self.commands.push(DrawCommand::SetMaterial(*material));
    }

    fn bind_texture(&mut self, texture: &T) {
        self.commands.push(DrawCommand::BindTexture(texture.clone()));
    }

    fn enable(&mut self, capability: Capability) {
        self.commands.push(DrawCommand::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.commands.push(DrawCommand::Disable(capability));
    }

    fn begin(&mut self, primitive: Primitive) {
        self.commands.push(DrawCommand::Begin(primitive));
    }

    fn end(&mut self) {
        self.commands.push(DrawCommand::End);
    }

    fn color(&mut self, rgba: [f32; 4]) {
        self.commands.push(DrawCommand::Color(rgba));
    }

    fn normal(&mut self, normal: [f32; 3]) {
        self.commands.push(DrawCommand::Normal(normal));
    }

    fn tex_coord(&mut self, uv: [f32; 2]) {
        self.commands.push(DrawCommand::TexCoord(uv));
    }

    fn vertex(&mut self, position: [f32; 3]) {
        self.commands.push(DrawCommand::Vertex(position));
    }

    fn text(&mut self, position: [f32; 3], height: f32, text: &str) {
        self.commands.push(DrawCommand::Text {
            position,
            height,
            text: text.to_string(),
        });
    }

    fn clear(&mut self, colour: [f32; 4]) {
        self.commands.push(DrawCommand::Clear(colour));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(DrawCommand::SetViewport(viewport));
    }

    fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.commands.push(DrawCommand::SetProjection(projection));
    }

    fn set_global_ambient(&mut self, ambient: [f32; 4]) {
        self.commands.push(DrawCommand::SetGlobalAmbient(ambient));
    }

    fn set_light(&mut self, slot: usize, light: &LightSource) {
        self.commands.push(DrawCommand::SetLight(slot, *light));
    }

    fn flush(&mut self) {
        self.commands.push(DrawCommand::Flush);
    }
}
