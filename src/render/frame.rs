//! Conversion of immediate-mode calls into GPU-ready vertex batches.
//!
//! [`FrameBuilder`] keeps the fixed-function state on the CPU: a matrix
//! stack, the current material, vertex attributes and capabilities. Every
//! primitive closed by `end` is expanded into a list topology with eye-space
//! vertices and appended to the current [`Segment`]. A frame is a sequence of
//! segments; a new one starts whenever viewport, projection, lights or depth
//! testing change between two primitives. Text is not geometry: each `text`
//! call is projected to a [`TextRun`] placed relative to its viewport and
//! drawn over the segments.

use std::{rc::Rc, sync::Arc};

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};
use log::{debug, warn};

use crate::data_structures::{
    material::MaterialParams,
    vertex::{FLAG_COLOR_TRACKING, FLAG_LIGHTING, FLAG_TEXTURING, FrameVertex},
};

use super::{Capability, LightSource, MAX_LIGHTS, Primitive, RenderContext, Spot, Viewport};

/// Identity comparison for texture handles, used to merge batches.
pub trait TextureIdentity {
    fn same_texture(&self, other: &Self) -> bool;
}

impl<T> TextureIdentity for Arc<T> {
    fn same_texture(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T> TextureIdentity for Rc<T> {
    fn same_texture(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    TriangleList,
}

/// Consecutive primitives sharing topology and texture.
#[derive(Clone, Debug)]
pub struct Batch<T> {
    pub topology: Topology,
    /// `None` when texturing was off for every vertex of the batch.
    pub texture: Option<T>,
    pub vertices: Vec<FrameVertex>,
}

/// State every batch of a segment is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentState {
    /// `None` covers the whole surface.
    pub viewport: Option<Viewport>,
    pub projection: Matrix4<f32>,
    pub global_ambient: [f32; 4],
    /// Lights in eye space.
    pub lights: [Option<LightSource>; MAX_LIGHTS],
    pub depth_test: bool,
}

impl Default for SegmentState {
    fn default() -> Self {
        Self {
            viewport: None,
            projection: Matrix4::identity(),
            global_ambient: [0.2, 0.2, 0.2, 1.0],
            lights: [None; MAX_LIGHTS],
            depth_test: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Segment<T> {
    pub state: SegmentState,
    pub batches: Vec<Batch<T>>,
}

impl<T> Segment<T> {
    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }
}

/// A line of text projected into its viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub colour: [f32; 4],
    /// `None` covers the whole surface.
    pub viewport: Option<Viewport>,
    /// Top-left corner as a fraction of the viewport, `[0, 0]` being its
    /// top-left corner.
    pub anchor: [f32; 2],
    /// Line height as a fraction of the viewport height.
    pub size: f32,
}

impl TextRun {
    /**
     * Where the run lands on a `width` × `height` surface: the window
     * rectangle it is clipped to, the pixel position of its top-left corner
     * and its line height in pixels.
     */
    pub fn placement(&self, width: u32, height: u32) -> (Viewport, [f32; 2], f32) {
        let rect = Viewport::fit(self.viewport, width, height);
        let left = rect.x as f32 + self.anchor[0] * rect.width as f32;
        let top = rect.y as f32 + self.anchor[1] * rect.height as f32;
        let line_height = (self.size * rect.height as f32).max(1.0);
        (rect, [left, top], line_height)
    }
}

/// Everything drawn in one frame.
#[derive(Clone, Debug)]
pub struct Frame<T> {
    /// Colour the frame starts from, if `clear` was called.
    pub clear: Option<[f32; 4]>,
    pub segments: Vec<Segment<T>>,
    /// Drawn after every segment, in order.
    pub texts: Vec<TextRun>,
}

impl<T> Default for Frame<T> {
    fn default() -> Self {
        Self {
            clear: None,
            segments: Vec::new(),
            texts: Vec::new(),
        }
    }
}

pub struct FrameBuilder<T> {
    stack: Vec<Matrix4<f32>>,
    modelview: Matrix4<f32>,
    normal_matrix: Option<Matrix3<f32>>,
    material: MaterialParams,
    colour: [f32; 4],
    normal: [f32; 3],
    tex_coords: [f32; 2],
    lighting: bool,
    color_tracking: bool,
    texturing: bool,
    texture: Option<T>,
    open: Option<Primitive>,
    pending: Vec<FrameVertex>,
    state: SegmentState,
    frame: Frame<T>,
}

impl<T> Default for FrameBuilder<T> {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            modelview: Matrix4::identity(),
            normal_matrix: None,
            material: MaterialParams::default(),
            colour: [1.0, 1.0, 1.0, 1.0],
            normal: [0.0, 0.0, 1.0],
            tex_coords: [0.0, 0.0],
            lighting: false,
            color_tracking: false,
            texturing: false,
            texture: None,
            open: None,
            pending: Vec::new(),
            state: SegmentState::default(),
            frame: Frame::default(),
        }
    }
}

impl<T: Clone + TextureIdentity> FrameBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modelview(&self) -> Matrix4<f32> {
        self.modelview
    }

    /// Depth of the matrix stack; zero when every push was popped.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn frame(&self) -> &Frame<T> {
        &self.frame
    }

    pub fn finish(self) -> Frame<T> {
        if self.open.is_some() {
            warn!("frame finished inside begin/end, open primitive dropped");
        }
        self.frame
    }

    fn set_modelview(&mut self, m: Matrix4<f32>) {
        self.modelview = m;
        self.normal_matrix = None;
    }

    fn normal_matrix(&mut self) -> Matrix3<f32> {
        if let Some(m) = self.normal_matrix {
            return m;
        }
        let upper = upper_left(&self.modelview);
        let m = upper
            .invert()
            .map(|inv| inv.transpose())
            .unwrap_or(upper);
        self.normal_matrix = Some(m);
        m
    }

    fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.lighting {
            flags |= FLAG_LIGHTING;
        }
        if self.color_tracking {
            flags |= FLAG_COLOR_TRACKING;
        }
        if self.texturing {
            flags |= FLAG_TEXTURING;
        }
        flags
    }

    fn current_segment(&mut self) -> &mut Segment<T> {
        let reuse = self
            .frame
            .segments
            .last()
            .is_some_and(|segment| segment.state == self.state);
        if !reuse {
            self.frame.segments.push(Segment {
                state: self.state.clone(),
                batches: Vec::new(),
            });
        }
        let last = self.frame.segments.len() - 1;
        &mut self.frame.segments[last]
    }

    fn emit(&mut self, topology: Topology, vertices: Vec<FrameVertex>) {
        if vertices.is_empty() {
            return;
        }
        let texture = if self.texturing {
            self.texture.clone()
        } else {
            None
        };
        let segment = self.current_segment();
        if let Some(batch) = segment.batches.last_mut() {
            let same_texture = match (&batch.texture, &texture) {
                (Some(a), Some(b)) => a.same_texture(b),
                (None, None) => true,
                _ => false,
            };
            if batch.topology == topology && same_texture {
                batch.vertices.extend(vertices);
                return;
            }
        }
        segment.batches.push(Batch {
            topology,
            texture,
            vertices,
        });
    }
}

/// Position of `point` inside the viewport, `[0, 0]` top-left and `[1, 1]`
/// bottom-right. `None` behind the eye.
fn viewport_fraction(clip_from_object: Matrix4<f32>, point: Vector4<f32>) -> Option<[f32; 2]> {
    let clip = clip_from_object * point;
    if clip.w <= f32::EPSILON {
        return None;
    }
    let (x, y) = (clip.x / clip.w, clip.y / clip.w);
    Some([(x + 1.0) / 2.0, (1.0 - y) / 2.0])
}

fn upper_left(m: &Matrix4<f32>) -> Matrix3<f32> {
    Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
}

/// Expands the vertices of one primitive into list topology.
pub fn assemble(primitive: Primitive, vertices: &[FrameVertex]) -> (Topology, Vec<FrameVertex>) {
    match primitive {
        Primitive::Points => (Topology::PointList, vertices.to_vec()),
        Primitive::Lines => (
            Topology::LineList,
            vertices.chunks_exact(2).flatten().copied().collect(),
        ),
        Primitive::Triangles => (
            Topology::TriangleList,
            vertices.chunks_exact(3).flatten().copied().collect(),
        ),
        Primitive::Polygon => {
            let fan = (1..vertices.len().saturating_sub(1))
                .flat_map(|i| [vertices[0], vertices[i], vertices[i + 1]])
                .collect();
            (Topology::TriangleList, fan)
        }
    }
}

impl<T: Clone + TextureIdentity> RenderContext for FrameBuilder<T> {
    type Texture = T;

    fn push_matrix(&mut self) {
        self.stack.push(self.modelview);
    }

    fn pop_matrix(&mut self) {
        match self.stack.pop() {
            Some(m) => self.set_modelview(m),
            None => warn!("pop_matrix on an empty matrix stack ignored"),
        }
    }

    fn load_identity(&mut self) {
        self.set_modelview(Matrix4::identity());
    }

    fn mult_matrix(&mut self, matrix: &Matrix4<f32>) {
        self.set_modelview(self.modelview * *matrix);
    }

    fn set_material(&mut self, material: &MaterialParams) {
        self.material = *material;
    }

    fn bind_texture(&mut self, texture: &T) {
        self.texture = Some(texture.clone());
    }

    fn enable(&mut self, capability: Capability) {
        match capability {
            Capability::Lighting => self.lighting = true,
            Capability::ColorTracking => self.color_tracking = true,
            Capability::Texturing => self.texturing = true,
            Capability::DepthTest => self.state.depth_test = true,
        }
    }

    fn disable(&mut self, capability: Capability) {
        match capability {
            Capability::Lighting => self.lighting = false,
            Capability::ColorTracking => self.color_tracking = false,
            Capability::Texturing => self.texturing = false,
            Capability::DepthTest => self.state.depth_test = false,
        }
    }

    fn begin(&mut self, primitive: Primitive) {
        if self.open.is_some() {
            warn!("begin({:?}) inside an open primitive ignored", primitive);
            return;
        }
        self.open = Some(primitive);
        self.pending.clear();
    }

    fn end(&mut self) {
        let Some(primitive) = self.open.take() else {
            warn!("end without begin ignored");
            return;
        };
        let pending = std::mem::take(&mut self.pending);
        let (topology, vertices) = assemble(primitive, &pending);
        self.emit(topology, vertices);
    }

    fn color(&mut self, rgba: [f32; 4]) {
        self.colour = rgba;
    }

    fn normal(&mut self, normal: [f32; 3]) {
        self.normal = normal;
    }

    fn tex_coord(&mut self, uv: [f32; 2]) {
        self.tex_coords = uv;
    }

    fn vertex(&mut self, position: [f32; 3]) {
        if self.open.is_none() {
            return;
        }
        let eye = self.modelview * Vector4::new(position[0], position[1], position[2], 1.0);
        let normal = self.normal_matrix() * Vector3::from(self.normal);
        let m = self.material;
        self.pending.push(FrameVertex {
            position: eye.truncate().into(),
            normal: normal.into(),
            color: self.colour,
            tex_coords: self.tex_coords,
            ambient: m.ambient,
            diffuse: m.diffuse,
            specular: m.specular,
            emissive: m.emissive,
            shininess: m.shininess,
            flags: self.flags(),
        });
    }

    fn text(&mut self, position: [f32; 3], height: f32, text: &str) {
        if self.open.is_some() {
            warn!("text inside begin/end ignored");
            return;
        }
        if text.is_empty() {
            return;
        }
        let clip_from_object = self.state.projection * self.modelview;
        let [x, y, z] = position;
        let top = viewport_fraction(clip_from_object, Vector4::new(x, y, z, 1.0));
        let bottom = viewport_fraction(clip_from_object, Vector4::new(x, y - height, z, 1.0));
        let (Some(anchor), Some(bottom)) = (top, bottom) else {
            debug!("text {:?} behind the eye skipped", text);
            return;
        };
        self.frame.texts.push(TextRun {
            text: text.to_string(),
            colour: self.colour,
            viewport: self.state.viewport,
            anchor,
            size: (bottom[1] - anchor[1]).abs(),
        });
    }

    fn clear(&mut self, colour: [f32; 4]) {
        self.frame = Frame {
            clear: Some(colour),
            ..Frame::default()
        };
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = Some(viewport);
    }

    fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.state.projection = projection;
    }

    fn set_global_ambient(&mut self, ambient: [f32; 4]) {
        self.state.global_ambient = ambient;
    }

    fn set_light(&mut self, slot: usize, light: &LightSource) {
        if slot >= MAX_LIGHTS {
            warn!("light slot {} out of range ignored", slot);
            return;
        }
        let p = light.position;
        let position = self.modelview * Vector4::new(p[0], p[1], p[2], p[3]);
        let spot = light.spot.map(|spot| Spot {
            direction: (upper_left(&self.modelview) * Vector3::from(spot.direction)).into(),
            cutoff_deg: spot.cutoff_deg,
        });
        self.state.lights[slot] = Some(LightSource {
            position: position.into(),
            spot,
            ..*light
        });
    }

    fn flush(&mut self) {
        if self.open.is_some() {
            warn!("flush inside begin/end, open primitive dropped");
            self.open = None;
            self.pending.clear();
        }
    }
}
