use std::path::Path;

use log::info;

use crate::{data_structures::scene::Scene, error::LoadError};

/**
 * This module contains all logic for loading scenes and textures from external files.
 */
pub mod gltf_loader;
pub mod obj_loader;
pub mod texture;

/// Imports `directory/file`, choosing the importer by file extension, and
/// validates the result before handing it out.
pub fn import_scene(directory: &Path, file: &str) -> Result<Scene, LoadError> {
    let extension = Path::new(file)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    let scene = match extension.as_deref() {
        Some("gltf") | Some("glb") => gltf_loader::import_gltf(directory, file)?,
        Some("obj") => obj_loader::import_obj(directory, file)?,
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: directory.join(file),
            });
        }
    };
    scene.validate()?;
    info!(
        "scene {} ready: {} node(s), {} mesh(es)",
        scene.name,
        scene.node_count(),
        scene.meshes.len()
    );
    Ok(scene)
}
