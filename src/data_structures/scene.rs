//! Imported scene graphs.
//!
//! A [`Scene`] is one imported asset: a tree of [`Node`]s that reference
//! [`Mesh`]es by index, and the [`Material`]s those meshes use. Scenes are
//! built by the importers in [`crate::resources`] and are not mutated after
//! that.

use std::path::PathBuf;

use cgmath::{Matrix4, SquareMatrix};

use crate::error::LoadError;

/// One imported 3D asset.
#[derive(Clone, Debug)]
pub struct Scene {
    pub name: String,
    /// Directory the asset was loaded from; texture paths are relative to it.
    pub directory: PathBuf,
    pub root: Node,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

/// A transform-carrying element of the hierarchy.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: Matrix4<f32>,
    /// Indices into [`Scene::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_meshes(mut self, meshes: Vec<usize>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// An ordered list of vertex indices forming one drawable primitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Face(pub Vec<u32>);

impl Face {
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Vertices and faces sharing one material.
///
/// Optional attributes are stored as empty vectors when the source has none,
/// otherwise they hold exactly one entry per position.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub faces: Vec<Face>,
    pub material: usize,
}

impl Mesh {
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    fn check(&self) -> Result<(), String> {
        let count = self.positions.len();
        let attributes = [
            ("normals", self.normals.len()),
            ("colors", self.colors.len()),
            ("tex_coords", self.tex_coords.len()),
        ];
        for (attribute, len) in attributes {
            if len != 0 && len != count {
                return Err(format!(
                    "mesh {:?} has {} {} for {} vertices",
                    self.name, len, attribute, count
                ));
            }
        }
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(bad) = face.indices().iter().find(|&&i| i as usize >= count) {
                return Err(format!(
                    "mesh {:?} face {} references vertex {} but only {} exist",
                    self.name, face_idx, bad, count
                ));
            }
        }
        Ok(())
    }
}

/// How texture coordinates outside [0, 1] are resolved along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Clamp,
    #[default]
    Repeat,
    Mirror,
}

/// Where the pixels of a texture slot come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureSource {
    /// A path relative to the scene directory, as written in the asset.
    File(String),
    /// Encoded image bytes packed into the asset itself.
    Embedded { bytes: Vec<u8>, mime_type: Option<String> },
}

/// A material's reference to an image plus its wrap modes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureSlot {
    pub source: TextureSource,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

impl TextureSlot {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            source: TextureSource::File(path.into()),
            wrap_u: WrapMode::default(),
            wrap_v: WrapMode::default(),
        }
    }

    pub fn with_wrap(mut self, wrap_u: WrapMode, wrap_v: WrapMode) -> Self {
        self.wrap_u = wrap_u;
        self.wrap_v = wrap_v;
        self
    }
}

/// Colour, shininess and texture properties as declared by the asset.
///
/// Missing components are resolved to fixed-function defaults by
/// [`crate::data_structures::material::MaterialParams::resolve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Option<[f32; 4]>,
    pub diffuse: Option<[f32; 4]>,
    pub specular: Option<[f32; 4]>,
    pub emissive: Option<[f32; 4]>,
    pub shininess: Option<f32>,
    pub shininess_strength: Option<f32>,
    pub textures: Vec<TextureSlot>,
}

impl Material {
    /// Only the first slot takes part in rendering.
    pub fn first_texture(&self) -> Option<&TextureSlot> {
        self.textures.first()
    }
}

impl Scene {
    /// Checks every index the renderer will follow.
    pub fn validate(&self) -> Result<(), LoadError> {
        let invalid = |reason: String| LoadError::InvalidScene {
            scene: self.name.clone(),
            reason,
        };
        for mesh in &self.meshes {
            mesh.check().map_err(invalid)?;
            if mesh.material >= self.materials.len() {
                return Err(invalid(format!(
                    "mesh {:?} uses material {} but only {} exist",
                    mesh.name,
                    mesh.material,
                    self.materials.len()
                )));
            }
        }
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some(bad) = node.meshes.iter().find(|&&i| i >= self.meshes.len()) {
                return Err(invalid(format!(
                    "node {:?} references mesh {} but only {} exist",
                    node.name,
                    bad,
                    self.meshes.len()
                )));
            }
            stack.extend(node.children.iter());
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.root.count()
    }
}
