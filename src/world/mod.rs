//! The still life: scenes, room, lights, camera, overlay and the scripted
//! camera run, composed into one frame per [`World::draw`].
//!
//! - `animation` is the path state machine and its tick sources
//! - `camera` holds the live camera angles and the projection/view matrices
//! - `lighting` are the spotlight and the dimmable point light
//! - `room` are the five textured quads around the scenes
//! - `overlay` draws the identification text

use std::time::Duration;

use log::{debug, info};

use crate::{
    config::{Config, ControlsConfig, Placement},
    data_structures::scene::Scene,
    error::LoadError,
    input::{Command, Response},
    render::{
        Capability, RenderContext, Viewport, command::CommandList,
        scene_renderer::SceneRenderer,
    },
    resources::{
        import_scene,
        texture::{TextureBackend, TextureSet, load_scene_textures},
    },
};

pub mod animation;
pub mod camera;
pub mod lighting;
pub mod overlay;
pub mod room;

use animation::{Animation, IntervalTicker, TickOutcome, Ticker};
use camera::CameraState;
use lighting::Lighting;
use overlay::Overlay;
use room::Room;

/// A scene compiled into its display list, with its place in the room.
pub struct PlacedScene<H> {
    pub scene: Scene,
    pub display_list: CommandList<H>,
    pub placement: Placement,
}

pub struct World<H> {
    scenes: Vec<PlacedScene<H>>,
    textures: TextureSet<H>,
    room: Room<H>,
    overlay: Overlay,
    camera: CameraState,
    lighting: Lighting,
    controls: ControlsConfig,
    clear_colour: [f32; 4],
    plate_rotation: f32,
    plate_scale: f32,
    animation: Animation,
    ticker: Box<dyn Ticker>,
    width: u32,
    height: u32,
}

impl<H: Clone> World<H> {
    /// Imports every configured scene, then builds the world from them.
    pub fn initialize<B: TextureBackend<Handle = H>>(
        config: &Config,
        backend: &mut B,
    ) -> Result<Self, LoadError> {
        let scenes = config
            .scenes
            .iter()
            .map(|scene| import_scene(&scene.directory, &scene.file))
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_scenes(config, scenes, backend)
    }

    /**
     * Builds the world from already imported scenes.
     *
     * `scenes[i]` is placed with `config.scenes[i].placement`; scenes without
     * a configured placement sit at the origin. Textures are uploaded and
     * every scene is compiled into a display list once, here. Any failure
     * drops everything created so far.
     */
    pub fn with_scenes<B: TextureBackend<Handle = H>>(
        config: &Config,
        scenes: Vec<Scene>,
        backend: &mut B,
    ) -> Result<Self, LoadError> {
        let textures = load_scene_textures(&scenes, backend)?;
        let room = Room::load(&config.room, backend)?;

        let placed = scenes
            .into_iter()
            .enumerate()
            .map(|(idx, scene)| {
                let display_list = match textures.scene(idx) {
                    Some(scene_textures) => SceneRenderer::new(&scene, scene_textures).compile(),
                    None => CommandList::new(),
                };
                debug!(
                    "compiled {} into {} command(s)",
                    scene.name,
                    display_list.len()
                );
                let placement = config
                    .scenes
                    .get(idx)
                    .map(|s| s.placement)
                    .unwrap_or_default();
                PlacedScene {
                    scene,
                    display_list,
                    placement,
                }
            })
            .collect::<Vec<_>>();

        let (width, height) = (config.window.width, config.window.height);
        let ticker = IntervalTicker::new(
            Duration::from_millis(config.animation.tick_interval_millis),
            config.animation.max_catch_up,
        );
        info!(
            "world ready: {} scene(s), {} texture(s)",
            placed.len(),
            textures.len()
        );
        Ok(Self {
            scenes: placed,
            textures,
            room,
            overlay: Overlay::new(&config.overlay),
            camera: CameraState::new(&config.camera, width, height),
            lighting: Lighting::new(&config.lighting),
            controls: config.controls.clone(),
            clear_colour: config.clear_colour,
            plate_rotation: 0.0,
            plate_scale: 1.0,
            animation: Animation::new(config.animation.segment_length),
            ticker: Box::new(ticker),
            width,
            height,
        })
    }

    /// Replaces the clock driving the animation.
    pub fn with_ticker(mut self, ticker: impl Ticker + 'static) -> Self {
        self.ticker = Box::new(ticker);
        self
    }

    pub fn scenes(&self) -> &[PlacedScene<H>] {
        &self.scenes
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn room(&self) -> &Room<H> {
        &self.room
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn plate_rotation(&self) -> f32 {
        self.plate_rotation
    }

    pub fn plate_scale(&self) -> f32 {
        self.plate_scale
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// See [`CameraState::set_rotation_x`].
    pub fn set_rotation_x(&mut self, degrees: f32) -> bool {
        self.camera.set_rotation_x(degrees)
    }

    pub fn set_light_intensity(&mut self, intensity: f32) {
        self.lighting.set_intensity(intensity);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.camera.resize(width, height);
        if let Some(leg) = self.animation.current_leg() {
            self.camera.follow(leg.heading());
        }
    }

    /// Everything but [`Command::Close`] is ignored while the animation runs.
    pub fn apply(&mut self, command: Command) -> Response {
        if command == Command::Close {
            return Response::Close;
        }
        if self.animation.is_running() {
            debug!("{:?} ignored while animating", command);
            return Response::Continue;
        }
        let step = self.controls.clone();
        match command {
            Command::Close => return Response::Close,
            Command::TiltUp => {
                self.camera
                    .set_rotation_x(self.camera.rotation_x() - step.rotation_step);
            }
            Command::TiltDown => {
                self.camera
                    .set_rotation_x(self.camera.rotation_x() + step.rotation_step);
            }
            Command::TurnLeft => self.camera.rotation_y -= step.rotation_step,
            Command::TurnRight => self.camera.rotation_y += step.rotation_step,
            Command::PlateRotateLeft => self.plate_rotation -= step.plate_rotation_step,
            Command::PlateRotateRight => self.plate_rotation += step.plate_rotation_step,
            Command::PlateGrow => self.plate_scale += step.plate_scale_step,
            Command::PlateShrink => self.plate_scale -= step.plate_scale_step,
            Command::LightDimmer => {
                let intensity = self.lighting.intensity() - step.light_step;
                self.lighting.set_intensity(intensity);
            }
            Command::LightBrighter => {
                let intensity = self.lighting.intensity() + step.light_step;
                self.lighting.set_intensity(intensity);
            }
            Command::StartAnimation => {
                self.start_animation();
            }
            Command::ZoomIn => self.camera.distance -= step.distance_step,
            Command::ZoomOut => self.camera.distance += step.distance_step,
        }
        Response::Continue
    }

    /// Starts the camera run and its ticker; a no-op returning `false` while
    /// a run is in progress.
    pub fn start_animation(&mut self) -> bool {
        if !self.animation.start() {
            return false;
        }
        self.ticker.start();
        if let Some(leg) = self.animation.current_leg() {
            self.camera.follow(leg.heading());
        }
        info!("animation started");
        true
    }

    /// Runs one animation step.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.animation.tick();
        match outcome {
            TickOutcome::LegCompleted => {
                if let Some(leg) = self.animation.current_leg() {
                    debug!("animation stage {}", self.animation.stage());
                    self.camera.follow(leg.heading());
                }
            }
            TickOutcome::Finished => {
                self.ticker.stop();
                self.camera.reset_view();
                info!("animation finished");
            }
            TickOutcome::Idle | TickOutcome::Advanced => {}
        }
        outcome
    }

    /// Runs every tick the ticker reports as due; returns how many ran.
    pub fn update(&mut self) -> u32 {
        let due = self.ticker.poll();
        let mut ran = 0;
        for _ in 0..due {
            if !self.animation.is_running() {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }

    fn full_viewport(&self) -> Viewport {
        Viewport::full(self.width, self.height)
    }

    /// Composes one frame into `ctx`.
    pub fn draw<C: RenderContext<Texture = H>>(&self, ctx: &mut C) {
        ctx.clear(self.clear_colour);
        ctx.set_viewport(self.full_viewport());
        ctx.set_projection(self.camera.projection());
        ctx.enable(Capability::DepthTest);
        ctx.load_identity();
        ctx.mult_matrix(&self.camera.view());
        ctx.set_global_ambient(self.lighting.global_ambient);

        ctx.push_matrix();
        ctx.translate(0.0, 0.0, -self.camera.distance);
        ctx.rotate(self.camera.rotation_x(), [1.0, 0.0, 0.0]);
        ctx.rotate(self.camera.rotation_y, [0.0, 1.0, 0.0]);
        if self.animation.is_running() {
            let (x, z) = self.animation.offset();
            ctx.translate(x, 0.0, z);
        }
        self.lighting.apply(ctx);

        for placed in &self.scenes {
            let p = placed.placement;
            ctx.push_matrix();
            let [x, y, z] = p.translation;
            ctx.translate(x, y, z);
            if p.interactive {
                ctx.rotate(self.plate_rotation, [0.0, 1.0, 0.0]);
                ctx.scale(self.plate_scale, self.plate_scale, self.plate_scale);
            }
            ctx.scale(p.scale, p.scale, p.scale);
            placed.display_list.replay(ctx);
            ctx.pop_matrix();
        }

        self.room.draw(ctx);
        ctx.pop_matrix();

        self.overlay.draw(ctx, self.width, self.height);

        ctx.set_viewport(self.full_viewport());
        ctx.set_projection(self.camera.projection());
        ctx.enable(Capability::DepthTest);
        ctx.flush();
    }
}
