//! Error types for loading scenes, textures and configuration.

use std::path::PathBuf;

/// Everything that can go wrong while bringing a world up.
///
/// All variants are fatal for initialization: the shell reports them once and
/// closes instead of running with a partial scene or texture set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("texture file does not exist: {path:?}")]
    MissingTexture { path: PathBuf },
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("glTF import of {path:?} failed: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("OBJ import of {path:?} failed: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("no importer for {path:?}")]
    UnsupportedFormat { path: PathBuf },
    #[error("scene {scene} is malformed: {reason}")]
    InvalidScene { scene: String, reason: String },
}

/// Errors raised while reading a JSON configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
