//! Application configuration.
//!
//! Every section has defaults describing the candlestick and plate scene, so an
//! empty JSON object (or no file at all) is a complete configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub clear_colour: [f32; 4],
    pub scenes: Vec<SceneConfig>,
    pub room: RoomConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub controls: ControlsConfig,
    pub animation: AnimationConfig,
    pub overlay: OverlayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_colour: [0.0, 0.0, 0.0, 1.0],
            scenes: vec![
                SceneConfig {
                    directory: PathBuf::from("3D Models/Candle"),
                    file: "Candlestick.obj".to_string(),
                    placement: Placement::default(),
                },
                SceneConfig {
                    directory: PathBuf::from("3D Models/Plate"),
                    file: "Plate.obj".to_string(),
                    placement: Placement {
                        translation: [0.0, -200.0, 0.0],
                        scale: 2.0,
                        interactive: true,
                    },
                },
            ],
            room: RoomConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            controls: ControlsConfig::default(),
            animation: AnimationConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Prepends `root` to every relative asset path.
    pub fn with_asset_root(mut self, root: &Path) -> Self {
        for scene in &mut self.scenes {
            if scene.directory.is_relative() {
                scene.directory = root.join(&scene.directory);
            }
        }
        if self.room.texture_dir.is_relative() {
            self.room.texture_dir = root.join(&self.room.texture_dir);
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Still life".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SceneConfig {
    pub directory: PathBuf,
    pub file: String,
    #[serde(default)]
    pub placement: Placement,
}

/// Where a scene sits in the room.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub translation: [f32; 3],
    pub scale: f32,
    /// Follows the live plate rotation and scale.
    pub interactive: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            scale: 1.0,
            interactive: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub texture_dir: PathBuf,
    pub floor_texture: String,
    pub wall_texture: String,
    pub half_extent: f32,
    pub floor_y: f32,
    pub wall_y: f32,
    /// Texture repeats across the floor.
    pub floor_tiling: f32,
    pub wall_tiling: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("Textures"),
            floor_texture: "parquet.jpg".to_string(),
            wall_texture: "wall.jpg".to_string(),
            half_extent: 400.0,
            floor_y: -410.0,
            wall_y: -10.0,
            floor_tiling: 4.0,
            wall_tiling: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub min_rotation_x: f32,
    pub max_rotation_x: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 700.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            fov_y_deg: 45.0,
            near: 1.0,
            far: 20000.0,
            min_rotation_x: -20.0,
            max_rotation_x: 70.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub global_ambient: [f32; 4],
    pub spot_position: [f32; 3],
    pub spot_direction: [f32; 3],
    pub spot_cutoff_deg: f32,
    pub spot_colour: [f32; 4],
    pub point_position: [f32; 3],
    pub point_colour: [f32; 4],
    pub point_intensity: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            global_ambient: [0.2, 0.2, 0.2, 1.0],
            spot_position: [0.0, 390.0, 0.0],
            spot_direction: [0.0, -1.0, 0.0],
            spot_cutoff_deg: 45.0,
            spot_colour: [1.0, 1.0, 1.0, 1.0],
            point_position: [0.0, -50.0, 0.0],
            point_colour: [1.0, 0.85, 0.6, 1.0],
            point_intensity: 1.0,
        }
    }
}

/// Step sizes of the keyboard commands.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub rotation_step: f32,
    pub plate_rotation_step: f32,
    pub plate_scale_step: f32,
    pub light_step: f32,
    pub distance_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotation_step: 5.0,
            plate_rotation_step: 5.0,
            plate_scale_step: 0.05,
            light_step: 0.05,
            distance_step: 150.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Units per path segment; one unit per tick.
    pub segment_length: u32,
    pub tick_interval_millis: u64,
    /// Upper bound on ticks run by one poll after a stall.
    pub max_catch_up: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            segment_length: 150,
            tick_interval_millis: 5,
            max_catch_up: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub lines: Vec<String>,
    pub colour: [f32; 4],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            lines: vec![
                "Predmet: Racunarska grafika".to_string(),
                "Sk.god: 2020/2021".to_string(),
                "Sifra zad: PF2S18.2".to_string(),
            ],
            colour: [0.0, 0.0, 1.0, 1.0],
        }
    }
}
