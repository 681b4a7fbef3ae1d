use std::path::Path;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use still_life::{
    config::{Config, SceneConfig},
    data_structures::scene::{Material, Scene},
    error::LoadError,
    input::{Command, Response},
    render::{
        Capability, Viewport,
        command::{CommandList, DrawCommand},
        frame::FrameBuilder,
    },
    world::{
        World,
        animation::{Heading, TickOutcome},
        camera::look_at,
        overlay,
    },
};

use crate::common::test_utils::{
    CountingBackend, FakeHandle, SharedTicker, nested_scene, test_config, textured_material,
    triangle, write_png,
};

mod common;

fn scenes(dir: &Path) -> Vec<Scene> {
    write_png(dir, "wax.png", 2, 2);
    vec![
        nested_scene(dir, vec![textured_material("wax.png")], triangle(0)),
        nested_scene(dir, vec![Material::default()], triangle(0)),
    ]
}

fn world(dir: &Path, backend: &mut CountingBackend) -> World<FakeHandle> {
    let config = test_config(dir);
    World::with_scenes(&config, scenes(dir), backend).expect("world failed to load")
}

#[test]
fn should_compile_every_scene_once() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut backend = CountingBackend::new();
    let world = world(dir.path(), &mut backend);

    assert_eq!(world.scenes().len(), 2);
    assert!(world.scenes().iter().all(|s| !s.display_list.is_empty()));
    assert!(world.scenes()[1].placement.interactive);
    assert_eq!(world.texture_count(), 1);
    // One scene texture plus floor and wall.
    assert_eq!(backend.live(), 3);
    assert_eq!(world.room().quads().len(), 5);
}

#[test]
fn should_release_scene_textures_when_the_room_fails() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut config = test_config(dir.path());
    config.room.wall_texture = "missing.png".to_string();
    let mut backend = CountingBackend::new();

    let result = World::with_scenes(&config, scenes(dir.path()), &mut backend);

    assert!(matches!(result, Err(LoadError::MissingTexture { .. })));
    assert_eq!(backend.uploads().len(), 2);
    assert_eq!(backend.live(), 0);
}

#[test]
fn should_fail_initialization_on_unsupported_scene_files() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = Config {
        scenes: vec![SceneConfig {
            directory: dir.path().to_path_buf(),
            file: "candle.3ds".to_string(),
            placement: Default::default(),
        }],
        ..test_config(dir.path())
    };
    let mut backend = CountingBackend::new();

    let result = World::initialize(&config, &mut backend);

    assert!(matches!(result, Err(LoadError::UnsupportedFormat { .. })));
    assert_eq!(backend.live(), 0);
}

#[test]
fn should_keep_rotation_x_inside_its_range() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new());

    assert!(world.set_rotation_x(10.0));
    assert!(!world.set_rotation_x(-30.0));
    assert_eq!(world.camera().rotation_x(), 10.0);
    assert!(!world.set_rotation_x(90.0));
    assert_eq!(world.camera().rotation_x(), 10.0);
    assert!(world.set_rotation_x(50.0));
    assert_eq!(world.camera().rotation_x(), 50.0);
}

#[test]
fn should_stop_tilting_at_the_limit() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new());
    world.set_rotation_x(10.0);

    for _ in 0..10 {
        world.apply(Command::TiltUp);
    }
    assert_eq!(world.camera().rotation_x(), -20.0);

    for _ in 0..30 {
        world.apply(Command::TiltDown);
    }
    assert_eq!(world.camera().rotation_x(), 70.0);
}

#[test]
fn should_clamp_light_intensity() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new());

    world.set_light_intensity(1.5);
    assert_eq!(world.lighting().intensity(), 1.0);
    world.apply(Command::LightBrighter);
    assert_eq!(world.lighting().intensity(), 1.0);

    world.set_light_intensity(-2.0);
    assert_eq!(world.lighting().intensity(), 0.0);
    world.apply(Command::LightDimmer);
    assert_eq!(world.lighting().intensity(), 0.0);
    world.apply(Command::LightBrighter);
    assert!((world.lighting().intensity() - 0.05).abs() < 1e-6);
}

#[test]
fn should_apply_keyboard_steps() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new());

    assert_eq!(world.apply(Command::TurnRight), Response::Continue);
    world.apply(Command::PlateRotateLeft);
    world.apply(Command::PlateGrow);
    world.apply(Command::ZoomIn);

    assert_eq!(world.camera().rotation_y, 5.0);
    assert_eq!(world.plate_rotation(), -5.0);
    assert!((world.plate_scale() - 1.05).abs() < 1e-6);
    assert_eq!(world.camera().distance, 550.0);

    world.apply(Command::ZoomOut);
    world.apply(Command::ZoomOut);
    world.apply(Command::PlateShrink);
    assert_eq!(world.camera().distance, 850.0);
    assert!((world.plate_scale() - 1.0).abs() < 1e-6);
    assert_eq!(world.apply(Command::Close), Response::Close);
}

#[test]
fn should_ignore_input_while_animating() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new())
        .with_ticker(SharedTicker::default());

    world.apply(Command::StartAnimation);
    assert!(world.is_animating());
    assert!(world.ticker_running());

    world.apply(Command::TurnLeft);
    world.apply(Command::PlateGrow);
    world.apply(Command::LightDimmer);
    world.apply(Command::ZoomIn);
    assert_eq!(world.camera().rotation_y, 0.0);
    assert_eq!(world.plate_scale(), 1.0);
    assert_eq!(world.lighting().intensity(), 1.0);
    assert_eq!(world.camera().distance, 700.0);
    assert!(!world.start_animation());

    assert_eq!(world.apply(Command::Close), Response::Close);
}

#[test]
fn should_stop_the_ticker_after_a_full_run() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let ticker = SharedTicker::default();
    let mut world = world(dir.path(), &mut CountingBackend::new()).with_ticker(ticker.clone());
    assert_eq!(world.update(), 0);

    assert!(world.start_animation());
    assert_eq!(world.camera().view(), look_at(Heading::PlusX));
    ticker.advance(150);
    assert_eq!(world.update(), 150);
    assert_eq!(world.animation().stage(), 1);
    assert_eq!(world.camera().view(), look_at(Heading::PlusZ));

    ticker.advance(5000);
    assert_eq!(world.update(), 1050);
    assert!(!world.is_animating());
    assert!(!world.ticker_running());
    assert_eq!(world.animation().offset(), (0.0, 0.0));
    assert_eq!(world.camera().view(), Matrix4::identity());

    world.apply(Command::TurnLeft);
    assert_eq!(world.camera().rotation_y, -5.0);
}

#[test]
fn should_report_the_last_tick_as_finished() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new())
        .with_ticker(SharedTicker::default());
    world.start_animation();

    let total = world.animation().total_ticks();
    let outcomes: Vec<TickOutcome> = (0..total).map(|_| world.tick()).collect();

    assert_eq!(outcomes.last(), Some(&TickOutcome::Finished));
    assert_eq!(world.tick(), TickOutcome::Idle);
}

#[test]
fn should_draw_a_balanced_frame() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let world = world(dir.path(), &mut CountingBackend::new());

    let mut list: CommandList<FakeHandle> = CommandList::new();
    world.draw(&mut list);

    let pushes = list.count(|c| matches!(c, DrawCommand::PushMatrix));
    let pops = list.count(|c| matches!(c, DrawCommand::PopMatrix));
    assert_eq!(pushes, pops);
    assert_eq!(list.count(|c| matches!(c, DrawCommand::SetLight(..))), 2);
    assert!(matches!(list.commands().first(), Some(DrawCommand::Clear(_))));
    assert_eq!(list.commands().last(), Some(&DrawCommand::Flush));
}

#[test]
fn should_draw_the_overlay_text_in_the_corner() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new());
    world.resize(1000, 500);

    let mut frame: FrameBuilder<FakeHandle> = FrameBuilder::new();
    world.draw(&mut frame);
    assert_eq!(frame.stack_depth(), 0);
    let frame = frame.finish();

    assert_eq!(frame.clear, Some([0.0, 0.0, 0.0, 1.0]));
    assert!(
        frame
            .segments
            .iter()
            .all(|segment| segment.state.depth_test)
    );
    let first = frame.segments.first().expect("nothing drawn");
    assert!(first.state.lights.iter().all(Option::is_some));
    // Every line is followed by its underline.
    assert_eq!(frame.texts.len(), world.overlay().lines().len() * 2);
    for run in &frame.texts {
        assert_eq!(run.viewport, Some(overlay::viewport(1000, 500)));
        assert!(run.anchor[0] > 0.0 && run.anchor[0] < 1.0, "{:?}", run);
        assert!(run.anchor[1] > 0.0 && run.anchor[1] + run.size <= 1.0, "{:?}", run);
    }
    assert_eq!(frame.texts[0].text, world.overlay().lines()[0]);
    assert_eq!(frame.texts[1].text, overlay::underline(&frame.texts[0].text));
}

#[test]
fn should_move_the_scene_along_the_path_while_animating() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new())
        .with_ticker(SharedTicker::default());
    world.start_animation();
    for _ in 0..40 {
        world.tick();
    }

    let mut list: CommandList<FakeHandle> = CommandList::new();
    world.draw(&mut list);

    let offset = Matrix4::from_translation(Vector3::new(40.0, 0.0, 0.0));
    assert_eq!(
        list.count(|c| *c == DrawCommand::MultMatrix(offset)),
        1
    );
}

#[test]
fn should_restore_the_main_view_after_the_overlay() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let world = world(dir.path(), &mut CountingBackend::new());

    let mut list: CommandList<FakeHandle> = CommandList::new();
    world.draw(&mut list);
    let tail = &list.commands()[list.len() - 4..];

    assert_eq!(
        tail[0],
        DrawCommand::SetViewport(Viewport::full(1024, 768))
    );
    assert_eq!(tail[1], DrawCommand::SetProjection(world.camera().projection()));
    assert_eq!(tail[2], DrawCommand::Enable(Capability::DepthTest));
}

#[test]
fn should_keep_following_the_current_leg_after_a_resize() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new())
        .with_ticker(SharedTicker::default());
    world.start_animation();
    for _ in 0..300 {
        world.tick();
    }
    assert_eq!(world.animation().stage(), 2);
    let before = world.camera().projection();

    world.resize(800, 400);

    assert_eq!(world.camera().view(), look_at(Heading::MinusX));
    assert_ne!(world.camera().projection(), before);
    assert!(world.is_animating());
}

#[test]
fn should_follow_window_size() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut world = world(dir.path(), &mut CountingBackend::new());
    let before = world.camera().projection();

    world.resize(400, 0);

    assert_eq!(world.size(), (400, 0));
    assert_ne!(world.camera().projection(), before);
    let mut frame: FrameBuilder<FakeHandle> = FrameBuilder::new();
    world.draw(&mut frame);
    assert_eq!(frame.stack_depth(), 0);
}
