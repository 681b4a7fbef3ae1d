//! still-life
//!
//! A candlestick and a plate inside a textured room, lit by a spotlight and a
//! dimmable point light, with a keyboard-driven camera and a short scripted
//! camera run. Scenes are imported once, compiled into display lists and
//! replayed through a fixed-function style drawing surface on top of wgpu.
//!
//! High-level modules
//! - `config`: serde configuration with defaults for every section
//! - `context`: GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graphs, materials, textures and vertices
//! - `error`: load and configuration errors
//! - `flow`: the winit application shell
//! - `input`: key to command mapping
//! - `pipelines`: the fixed-function render pipelines and their uniforms
//! - `render`: the immediate-mode surface, display lists and frame batching
//! - `resources`: scene importers and the texture loader
//! - `world`: composition of scenes, room, lights, camera, overlay and animation
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod world;

// Re-exports commonly used types for convenience in downstream code.
pub use config::Config;
pub use error::{ConfigError, LoadError};
pub use world::World;
