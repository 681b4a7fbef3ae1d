use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::render::{LightSource, MAX_LIGHTS, frame::SegmentState};

/// Maps OpenGL clip space (z in -1..1) to wgpu clip space (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Spot `w` of a light without a cone; below every possible cosine.
const NO_SPOT: f32 = -2.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// Eye-space direction in `xyz`, cosine of the cutoff in `w`.
    pub spot: [f32; 4],
    /// Constant, linear and quadratic factors; `w` is 1 for an enabled light.
    pub attenuation: [f32; 4],
}

impl LightUniform {
    pub fn disabled() -> Self {
        Self {
            position: [0.0, 0.0, 1.0, 0.0],
            ambient: [0.0; 4],
            diffuse: [0.0; 4],
            specular: [0.0; 4],
            spot: [0.0, 0.0, -1.0, NO_SPOT],
            attenuation: [1.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn from_light(light: &LightSource) -> Self {
        let spot = match light.spot {
            Some(spot) => {
                let [x, y, z] = spot.direction;
                [x, y, z, spot.cutoff_deg.to_radians().cos()]
            }
            None => [0.0, 0.0, -1.0, NO_SPOT],
        };
        let [c, l, q] = light.attenuation;
        Self {
            position: light.position,
            ambient: light.ambient,
            diffuse: light.diffuse,
            specular: light.specular,
            spot,
            attenuation: [c, l, q, 1.0],
        }
    }
}

/// Per-segment uniform: projection, global ambient and both light slots.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub projection: [[f32; 4]; 4],
    pub global_ambient: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl GlobalsUniform {
    pub fn from_state(state: &SegmentState) -> Self {
        let mut lights = [LightUniform::disabled(); MAX_LIGHTS];
        for (uniform, light) in lights.iter_mut().zip(state.lights.iter()) {
            if let Some(light) = light {
                *uniform = LightUniform::from_light(light);
            }
        }
        Self {
            projection: (OPENGL_TO_WGPU_MATRIX * state.projection).into(),
            global_ambient: state.global_ambient,
            lights,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, globals: GlobalsUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Globals Buffer"),
        contents: bytemuck::cast_slice(&[globals]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("globals_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("globals_bind_group"),
    })
}
