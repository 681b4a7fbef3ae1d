//! Vertex layout of the frame pipelines.

/// Lighting is evaluated for this vertex.
pub const FLAG_LIGHTING: u32 = 1 << 0;
/// The vertex colour replaces the ambient and diffuse material colours.
pub const FLAG_COLOR_TRACKING: u32 = 1 << 1;
/// The bound texture modulates the shaded colour.
pub const FLAG_TEXTURING: u32 = 1 << 2;

/**
 * One fully resolved vertex as produced by the frame builder.
 *
 * Positions and normals are already in eye space; the material travels with
 * the vertex because fixed-function state may change between any two
 * primitives.
 */
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub tex_coords: [f32; 2],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
    pub shininess: f32,
    pub flags: u32,
}

impl FrameVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        const ATTRIBUTES: [wgpu::VertexAttribute; 10] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x4,
            3 => Float32x2,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32,
            9 => Uint32,
        ];
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<FrameVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}
