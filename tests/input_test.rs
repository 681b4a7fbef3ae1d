use still_life::input::{Command, command_for_key};
use winit::keyboard::KeyCode;

#[test]
fn should_map_every_bound_key() {
    let bindings = [
        (KeyCode::F5, Command::Close),
        (KeyCode::KeyT, Command::TiltUp),
        (KeyCode::KeyG, Command::TiltDown),
        (KeyCode::KeyF, Command::TurnLeft),
        (KeyCode::KeyH, Command::TurnRight),
        (KeyCode::KeyA, Command::PlateRotateLeft),
        (KeyCode::KeyD, Command::PlateRotateRight),
        (KeyCode::NumpadMultiply, Command::PlateGrow),
        (KeyCode::NumpadDivide, Command::PlateShrink),
        (KeyCode::KeyZ, Command::LightDimmer),
        (KeyCode::KeyX, Command::LightBrighter),
        (KeyCode::KeyC, Command::StartAnimation),
        (KeyCode::NumpadAdd, Command::ZoomIn),
        (KeyCode::NumpadSubtract, Command::ZoomOut),
    ];

    for (key, command) in bindings {
        assert_eq!(command_for_key(key), Some(command), "{:?}", key);
    }
}

#[test]
fn should_ignore_unbound_keys() {
    for key in [KeyCode::Escape, KeyCode::KeyQ, KeyCode::Space, KeyCode::F4] {
        assert_eq!(command_for_key(key), None);
    }
}
