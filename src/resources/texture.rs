//! Texture loading: from material texture slots to backend handles.
//!
//! The loader is generic over a [`TextureBackend`] so that the enumeration,
//! path resolution and failure rules can run without a GPU. The wgpu backend
//! lives in [`crate::data_structures::texture`].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use image::{RgbaImage, imageops::FilterType};
use log::{debug, info};

use crate::{
    data_structures::scene::{Scene, TextureSlot, TextureSource, WrapMode},
    error::LoadError,
};

/// How an uploaded texture is sampled. Filtering is always linear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sampling {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub mipmaps: bool,
}

impl Sampling {
    pub fn for_slot(slot: &TextureSlot) -> Self {
        Self {
            wrap_u: slot.wrap_u,
            wrap_v: slot.wrap_v,
            mipmaps: false,
        }
    }

    /// Repeating, mipmapped sampling for tiled surfaces.
    pub fn tiled() -> Self {
        Self {
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
            mipmaps: true,
        }
    }
}

/// Creates GPU-resident textures from decoded images.
pub trait TextureBackend {
    type Handle: Clone;

    /// `levels[0]` is the base image, further entries are its mip chain.
    fn upload(
        &mut self,
        label: &str,
        levels: &[RgbaImage],
        sampling: &Sampling,
    ) -> Result<Self::Handle, LoadError>;
}

/// Identity of a texture slot within one scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub material: usize,
    pub slot: usize,
}

/// Handles for every texture slot of one scene.
#[derive(Clone, Debug)]
pub struct SceneTextures<H> {
    handles: HashMap<TextureKey, H>,
}

impl<H> Default for SceneTextures<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<H> SceneTextures<H> {
    pub fn get(&self, material: usize, slot: usize) -> Option<&H> {
        self.handles.get(&TextureKey { material, slot })
    }

    pub fn insert(&mut self, key: TextureKey, handle: H) {
        self.handles.insert(key, handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Texture handles for a list of scenes, indexed like the scene list.
#[derive(Clone, Debug)]
pub struct TextureSet<H> {
    scenes: Vec<SceneTextures<H>>,
}

impl<H> TextureSet<H> {
    pub fn scene(&self, idx: usize) -> Option<&SceneTextures<H>> {
        self.scenes.get(idx)
    }

    pub fn len(&self) -> usize {
        self.scenes.iter().map(SceneTextures::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Path of a texture referenced by a model, relative to the model's directory.
/// A single leading separator is dropped so absolute-looking paths written by
/// exporters still resolve next to the model.
pub fn resolve_texture_path(model_dir: &Path, slot_path: &str) -> PathBuf {
    let relative = slot_path
        .strip_prefix('/')
        .or_else(|| slot_path.strip_prefix('\\'))
        .unwrap_or(slot_path);
    model_dir.join(relative)
}

fn decode_file(path: &Path) -> Result<RgbaImage, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingTexture {
            path: path.to_path_buf(),
        });
    }
    let img = image::open(path).map_err(|source| LoadError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

fn decode_embedded(
    scene: &Scene,
    bytes: &[u8],
    mime_type: Option<&str>,
) -> Result<RgbaImage, LoadError> {
    let format = mime_type
        .and_then(|mt| mt.split('/').next_back())
        .and_then(image::ImageFormat::from_extension);
    let img = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    };
    img.map(|img| img.to_rgba8())
        .map_err(|source| LoadError::Image {
            path: scene.directory.join(format!("{}#embedded", scene.name)),
            source,
        })
}

/// Uploads every texture slot of every material of every scene, once each.
///
/// Scenes are visited in order, then materials, then slots. The first slot
/// that cannot be loaded aborts the whole set: handles created so far are
/// dropped with it before the error is returned.
pub fn load_scene_textures<B: TextureBackend>(
    scenes: &[Scene],
    backend: &mut B,
) -> Result<TextureSet<B::Handle>, LoadError> {
    let mut set = TextureSet {
        scenes: Vec::with_capacity(scenes.len()),
    };
    for scene in scenes {
        let mut textures = SceneTextures::default();
        for (material_idx, material) in scene.materials.iter().enumerate() {
            for (slot_idx, slot) in material.textures.iter().enumerate() {
                let (label, img) = match &slot.source {
                    TextureSource::File(file) => {
                        let path = resolve_texture_path(&scene.directory, file);
                        let img = decode_file(&path)?;
                        (path.display().to_string(), img)
                    }
                    TextureSource::Embedded { bytes, mime_type } => (
                        format!("{}/{}#{}", scene.name, material.name, slot_idx),
                        decode_embedded(scene, bytes, mime_type.as_deref())?,
                    ),
                };
                let handle = backend.upload(&label, &[img], &Sampling::for_slot(slot))?;
                debug!(
                    "uploaded texture {} for material {:?} of {}",
                    label, material.name, scene.name
                );
                textures.insert(
                    TextureKey {
                        material: material_idx,
                        slot: slot_idx,
                    },
                    handle,
                );
            }
        }
        set.scenes.push(textures);
    }
    info!(
        "loaded {} texture(s) for {} scene(s)",
        set.len(),
        scenes.len()
    );
    Ok(set)
}

/// Loads one of the fixed (non scene) textures with repeat wrapping and a
/// generated mip chain.
pub fn load_fixed_texture<B: TextureBackend>(
    path: &Path,
    backend: &mut B,
) -> Result<B::Handle, LoadError> {
    let img = decode_file(path)?;
    let levels = generate_mipmaps(img);
    debug!("uploading {:?} with {} mip level(s)", path, levels.len());
    backend.upload(&path.display().to_string(), &levels, &Sampling::tiled())
}

/// Builds the full mip chain: each level halves both dimensions (never below
/// one pixel) until a 1x1 level is reached.
pub fn generate_mipmaps(base: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base];
    loop {
        let Some(last) = levels.last() else { break };
        let (w, h) = last.dimensions();
        if w <= 1 && h <= 1 {
            break;
        }
        let next = image::imageops::resize(
            last,
            (w / 2).max(1),
            (h / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(next);
    }
    levels
}
