//! The application shell: winit event loop, GPU context lifecycle and the
//! routing of window events into the [`World`].

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::Window,
};

use crate::{
    config::Config,
    context::Context,
    data_structures::texture::{GpuTextureBackend, TextureHandle},
    input::{Response, command_for_key},
    render::frame::FrameBuilder,
    world::World,
};

struct AppState {
    ctx: Context,
    world: World<TextureHandle>,
}

impl AppState {
    fn new(window: Arc<Window>, config: &Config) -> anyhow::Result<Self> {
        let ctx = futures::executor::block_on(Context::new(window))?;
        let world = {
            let mut backend = GpuTextureBackend {
                device: &ctx.device,
                queue: &ctx.queue,
                layout: &ctx.texture_layout,
            };
            let mut world = World::initialize(config, &mut backend)?;
            world.resize(ctx.config.width, ctx.config.height);
            world
        };
        Ok(Self { ctx, world })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.world.resize(width, height);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.world.update();
        let mut frame = FrameBuilder::new();
        self.world.draw(&mut frame);
        self.ctx.render(&frame.finish())
    }
}

struct App {
    config: Config,
    state: Option<AppState>,
    /// Set when initialization failed; returned from [`run`].
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
            error: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        AppState::new(window, &self.config)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.ctx.window().request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("initialization failed: {:#}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(command) = command_for_key(code) {
                        if state.world.apply(command) == Response::Close {
                            event_loop.exit();
                        }
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window().inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
                state.ctx.window().request_redraw();
            }
            _ => {}
        }
    }
}

/// Opens the window and runs until it is closed. Initialization errors are
/// logged, close the window and are returned.
pub fn run(config: Config) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
