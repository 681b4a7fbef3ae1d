//! Immediate-mode rendering surface.
//!
//! This module defines the [`RenderContext`] trait, the fixed-function style
//! drawing surface the scene renderer and the world submit geometry to. Two
//! contexts implement it:
//!
//! - [`command::CommandList`] records every call so it can be replayed later
//!   (a compiled display list) or inspected in tests
//! - [`frame::FrameBuilder`] turns the calls into vertex batches for the wgpu
//!   pipelines
//!
//! # Key types
//!
//! - [`Primitive`] is the topology opened by [`RenderContext::begin`]
//! - [`Capability`] are the switchable pieces of fixed-function state
//! - [`LightSource`] describes one of the [`MAX_LIGHTS`] light slots
//!

use cgmath::{Deg, Matrix4, Vector3};

use crate::data_structures::material::MaterialParams;

pub mod command;
pub mod frame;
pub mod scene_renderer;

/// Number of light slots a context supports.
pub const MAX_LIGHTS: usize = 2;

/// Topology of the vertices submitted between `begin` and `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
    /// A convex polygon, drawn as a triangle fan around its first vertex.
    Polygon,
}

impl Primitive {
    /// Topology of a face with `n` vertices. A face with no vertices is
    /// treated as points and submits nothing.
    pub fn for_vertex_count(n: usize) -> Self {
        match n {
            0 | 1 => Primitive::Points,
            2 => Primitive::Lines,
            3 => Primitive::Triangles,
            _ => Primitive::Polygon,
        }
    }
}

/// Image rows run top-down while texture coordinates from the importers run
/// bottom-up.
pub fn flip_v(v: f32) -> f32 {
    1.0 - v
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Lighting,
    /// Vertex colours replace the ambient and diffuse material colours.
    ColorTracking,
    Texturing,
    DepthTest,
}

/// A rectangle of the window in pixels, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Clips `viewport` to a `width` × `height` surface, keeping at least one
    /// pixel. `None` is the whole surface.
    pub fn fit(viewport: Option<Viewport>, width: u32, height: u32) -> Viewport {
        let (w, h) = (width.max(1), height.max(1));
        match viewport {
            Some(v) => {
                let x = v.x.min(w - 1);
                let y = v.y.min(h - 1);
                Viewport {
                    x,
                    y,
                    width: v.width.clamp(1, w - x),
                    height: v.height.clamp(1, h - y),
                }
            }
            None => Viewport::full(w, h),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spot {
    pub direction: [f32; 3],
    /// Half angle of the cone in degrees.
    pub cutoff_deg: f32,
}

/// A light as given to [`RenderContext::set_light`]; position and direction
/// are in the coordinate system that is current at that call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    /// `w == 0` makes the light directional.
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub spot: Option<Spot>,
    /// Constant, linear and quadratic attenuation factors.
    pub attenuation: [f32; 3],
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 1.0, 0.0],
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0, 1.0],
            spot: None,
            attenuation: [1.0, 0.0, 0.0],
        }
    }
}

/**
 * The fixed-function drawing surface.
 *
 * Geometry is submitted between [`begin`](Self::begin) and [`end`](Self::end)
 * one vertex at a time: the current colour, normal and texture coordinate are
 * latched when [`vertex`](Self::vertex) is called. Transforms use a matrix
 * stack where every new matrix is multiplied onto the right of the current
 * one.
 */
pub trait RenderContext {
    /// Handle of a texture that can be bound.
    type Texture: Clone;

    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn load_identity(&mut self);
    fn mult_matrix(&mut self, matrix: &Matrix4<f32>);

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.mult_matrix(&Matrix4::from_translation(Vector3::new(x, y, z)));
    }

    /// Rotates by `degrees` about `axis` (which need not be normalized).
    fn rotate(&mut self, degrees: f32, axis: [f32; 3]) {
        let axis = Vector3::from(axis);
        if axis == Vector3::new(0.0, 0.0, 0.0) {
            return;
        }
        let axis = cgmath::InnerSpace::normalize(axis);
        self.mult_matrix(&Matrix4::from_axis_angle(axis, Deg(degrees)));
    }

    fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.mult_matrix(&Matrix4::from_nonuniform_scale(x, y, z));
    }

    fn set_material(&mut self, material: &MaterialParams);
    fn bind_texture(&mut self, texture: &Self::Texture);

    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        if enabled {
            self.enable(capability);
        } else {
            self.disable(capability);
        }
    }

    fn begin(&mut self, primitive: Primitive);
    fn end(&mut self);
    fn color(&mut self, rgba: [f32; 4]);
    fn normal(&mut self, normal: [f32; 3]);
    fn tex_coord(&mut self, uv: [f32; 2]);
    fn vertex(&mut self, position: [f32; 3]);
    /// One line of text in the current colour, its top-left corner at
    /// `position` and `height` units tall in the current coordinate system.
    fn text(&mut self, position: [f32; 3], height: f32, text: &str);

    /// Clears colour and depth.
    fn clear(&mut self, colour: [f32; 4]);
    fn set_viewport(&mut self, viewport: Viewport);
    fn set_projection(&mut self, projection: Matrix4<f32>);
    fn set_global_ambient(&mut self, ambient: [f32; 4]);
    /// Slots at or beyond [`MAX_LIGHTS`] are ignored.
    fn set_light(&mut self, slot: usize, light: &LightSource);
    fn flush(&mut self);
}
