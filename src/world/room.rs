//! The five textured quads enclosing the scenes.

use log::info;

use crate::{
    config::RoomConfig,
    data_structures::material::MaterialParams,
    error::LoadError,
    render::{Capability, Primitive, RenderContext},
    resources::texture::{TextureBackend, load_fixed_texture},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Floor,
    Wall,
}

/// One square of side `2 * half_extent`, built in the XY plane facing +Z and
/// then moved into place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub translation: [f32; 3],
    /// Degrees about the Y axis, or about X for the floor.
    pub rotation: Option<(f32, [f32; 3])>,
    pub surface: Surface,
}

/// Floor, right, left, back and front, in drawing order.
pub fn room_quads(config: &RoomConfig) -> [Quad; 5] {
    let e = config.half_extent;
    let y = config.wall_y;
    [
        Quad {
            translation: [0.0, config.floor_y, 0.0],
            rotation: Some((-90.0, [1.0, 0.0, 0.0])),
            surface: Surface::Floor,
        },
        Quad {
            translation: [e, y, 0.0],
            rotation: Some((-90.0, [0.0, 1.0, 0.0])),
            surface: Surface::Wall,
        },
        Quad {
            translation: [-e, y, 0.0],
            rotation: Some((90.0, [0.0, 1.0, 0.0])),
            surface: Surface::Wall,
        },
        Quad {
            translation: [0.0, y, -e],
            rotation: None,
            surface: Surface::Wall,
        },
        Quad {
            translation: [0.0, y, e],
            rotation: Some((180.0, [0.0, 1.0, 0.0])),
            surface: Surface::Wall,
        },
    ]
}

pub struct Room<H> {
    quads: [Quad; 5],
    half_extent: f32,
    floor_tiling: f32,
    wall_tiling: f32,
    floor: H,
    wall: H,
}

impl<H: Clone> Room<H> {
    pub fn load<B: TextureBackend<Handle = H>>(
        config: &RoomConfig,
        backend: &mut B,
    ) -> Result<Self, LoadError> {
        let floor = load_fixed_texture(&config.texture_dir.join(&config.floor_texture), backend)?;
        let wall = load_fixed_texture(&config.texture_dir.join(&config.wall_texture), backend)?;
        info!("room textures loaded from {:?}", config.texture_dir);
        Ok(Self {
            quads: room_quads(config),
            half_extent: config.half_extent,
            floor_tiling: config.floor_tiling,
            wall_tiling: config.wall_tiling,
            floor,
            wall,
        })
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn draw<C: RenderContext<Texture = H>>(&self, ctx: &mut C) {
        ctx.set_material(&MaterialParams::default());
        ctx.enable(Capability::Lighting);
        ctx.disable(Capability::ColorTracking);
        ctx.enable(Capability::Texturing);
        for quad in &self.quads {
            let (texture, tiling) = match quad.surface {
                Surface::Floor => (&self.floor, self.floor_tiling),
                Surface::Wall => (&self.wall, self.wall_tiling),
            };
            ctx.push_matrix();
            let [x, y, z] = quad.translation;
            ctx.translate(x, y, z);
            if let Some((degrees, axis)) = quad.rotation {
                ctx.rotate(degrees, axis);
            }
            ctx.bind_texture(texture);
            self.square(ctx, tiling);
            ctx.pop_matrix();
        }
    }

    fn square<C: RenderContext<Texture = H>>(&self, ctx: &mut C, tiling: f32) {
        let e = self.half_extent;
        let corners = [
            ([e, e], [tiling, tiling]),
            ([-e, e], [0.0, tiling]),
            ([-e, -e], [0.0, 0.0]),
            ([e, -e], [tiling, 0.0]),
        ];
        ctx.begin(Primitive::Polygon);
        for ([x, y], uv) in corners {
            ctx.normal([0.0, 0.0, 1.0]);
            ctx.tex_coord(uv);
            ctx.vertex([x, y, 0.0]);
        }
        ctx.end();
    }
}
