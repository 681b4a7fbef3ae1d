use crate::{
    config::LightingConfig,
    render::{LightSource, RenderContext, Spot},
};

pub const SPOT_SLOT: usize = 0;
pub const POINT_SLOT: usize = 1;

/// The fixed spotlight above the room and the dimmable point light above
/// the plate.
#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub global_ambient: [f32; 4],
    spot: LightSource,
    point_position: [f32; 3],
    point_colour: [f32; 4],
    intensity: f32,
}

impl Lighting {
    pub fn new(config: &LightingConfig) -> Self {
        let [x, y, z] = config.spot_position;
        let spot = LightSource {
            position: [x, y, z, 1.0],
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: config.spot_colour,
            specular: config.spot_colour,
            spot: Some(Spot {
                direction: config.spot_direction,
                cutoff_deg: config.spot_cutoff_deg,
            }),
            attenuation: [1.0, 0.0, 0.0],
        };
        Self {
            global_ambient: config.global_ambient,
            spot,
            point_position: config.point_position,
            point_colour: config.point_colour,
            intensity: config.point_intensity.clamp(0.0, 1.0),
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Clamped to `[0, 1]`.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.clamp(0.0, 1.0);
    }

    pub fn spot_light(&self) -> LightSource {
        self.spot
    }

    pub fn point_light(&self) -> LightSource {
        let [x, y, z] = self.point_position;
        let [r, g, b, a] = self.point_colour;
        let i = self.intensity;
        LightSource {
            position: [x, y, z, 1.0],
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [r * i, g * i, b * i, a],
            specular: [r * i, g * i, b * i, a],
            spot: None,
            attenuation: [1.0, 0.0, 0.0],
        }
    }

    /// Sets both lights; call with the camera transform current so they stay
    /// fixed in the room.
    pub fn apply<C: RenderContext>(&self, ctx: &mut C) {
        ctx.set_light(SPOT_SLOT, &self.spot_light());
        ctx.set_light(POINT_SLOT, &self.point_light());
    }
}
