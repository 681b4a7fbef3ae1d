//! Keyboard input as logical commands.

use winit::keyboard::KeyCode;

/// Everything the keyboard can ask the world to do.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Command {
    Close,
    /// Rotation about X decreases.
    TiltUp,
    TiltDown,
    /// Rotation about Y decreases.
    TurnLeft,
    TurnRight,
    PlateRotateLeft,
    PlateRotateRight,
    PlateGrow,
    PlateShrink,
    LightDimmer,
    LightBrighter,
    StartAnimation,
    /// Scene distance decreases.
    ZoomIn,
    ZoomOut,
}

/// What the shell should do after a command was applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Response {
    Continue,
    Close,
}

pub fn command_for_key(key: KeyCode) -> Option<Command> {
    let command = match key {
        KeyCode::F5 => Command::Close,
        KeyCode::KeyT => Command::TiltUp,
        KeyCode::KeyG => Command::TiltDown,
        KeyCode::KeyF => Command::TurnLeft,
        KeyCode::KeyH => Command::TurnRight,
        KeyCode::KeyA => Command::PlateRotateLeft,
        KeyCode::KeyD => Command::PlateRotateRight,
        KeyCode::NumpadMultiply => Command::PlateGrow,
        KeyCode::NumpadDivide => Command::PlateShrink,
        KeyCode::KeyZ => Command::LightDimmer,
        KeyCode::KeyX => Command::LightBrighter,
        KeyCode::KeyC => Command::StartAnimation,
        KeyCode::NumpadAdd => Command::ZoomIn,
        KeyCode::NumpadSubtract => Command::ZoomOut,
        _ => return None,
    };
    Some(command)
}
