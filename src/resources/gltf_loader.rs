use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use cgmath::Matrix4;
use gltf::{mesh::Mode, texture::WrappingMode};
use log::{debug, info, warn};

use crate::{
    data_structures::scene::{
        Face, Material, Mesh, Node, Scene, TextureSlot, TextureSource, WrapMode,
    },
    error::LoadError,
};

/**
 * Imports a glTF 2.0 asset (`.gltf` with external buffers or a binary `.glb`).
 *
 * Every glTF primitive becomes one [`Mesh`]; node transforms are kept as they
 * are so the hierarchy renders exactly as authored.
 */
pub fn import_gltf(directory: &Path, file: &str) -> Result<Scene, LoadError> {
    let path = directory.join(file);
    let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    let reader = BufReader::new(Cursor::new(bytes));
    let gltf = gltf::Gltf::from_reader(reader).map_err(|source| LoadError::Gltf {
        path: path.clone(),
        source,
    })?;

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                buffer_data.push(gltf.blob.clone().unwrap_or_default());
            }
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(LoadError::UnsupportedFormat {
                    path: path.join("#data-uri"),
                });
            }
            gltf::buffer::Source::Uri(uri) => {
                let buffer_path = directory.join(uri);
                let bin = std::fs::read(&buffer_path).map_err(|source| LoadError::Io {
                    path: buffer_path,
                    source,
                })?;
                buffer_data.push(bin);
            }
        }
    }

    let mut materials: Vec<Material> = gltf
        .materials()
        .map(|material| convert_material(&material, &buffer_data))
        .collect();

    // Primitives without a material share one default material at the end.
    let mut default_material = None;
    let mut meshes = Vec::new();
    let mut mesh_primitives: Vec<Vec<usize>> = Vec::new();
    for mesh in gltf.meshes() {
        let mut ids = Vec::new();
        for (prim_idx, primitive) in mesh.primitives().enumerate() {
            let material = match primitive.material().index() {
                Some(idx) => idx,
                None => *default_material.get_or_insert_with(|| {
                    materials.push(Material {
                        name: "default".to_string(),
                        ..Default::default()
                    });
                    materials.len() - 1
                }),
            };
            let name = format!("{}#{}", mesh.name().unwrap_or("mesh"), prim_idx);
            match convert_primitive(&primitive, &buffer_data, name, material) {
                Some(converted) => {
                    ids.push(meshes.len());
                    meshes.push(converted);
                }
                None => warn!(
                    "{:?}: primitive {} of mesh {} has no positions, skipped",
                    path,
                    prim_idx,
                    mesh.index()
                ),
            }
        }
        mesh_primitives.push(ids);
    }

    let scene_name = Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    let mut root = Node::new(scene_name.clone());
    if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        for node in scene.nodes() {
            root.add_child(convert_node(&node, &mesh_primitives));
        }
    }
    // A single top-level node is the root itself.
    if root.children.len() == 1 {
        if let Some(only) = root.children.pop() {
            root = only;
        }
    }

    info!(
        "imported {:?}: {} node(s), {} mesh(es), {} material(s)",
        path,
        root.count(),
        meshes.len(),
        materials.len()
    );
    Ok(Scene {
        name: scene_name,
        directory: directory.to_path_buf(),
        root,
        meshes,
        materials,
    })
}

fn convert_node(node: &gltf::Node, mesh_primitives: &[Vec<usize>]) -> Node {
    let transform = Matrix4::from(node.transform().matrix());
    let meshes = node
        .mesh()
        .and_then(|mesh| mesh_primitives.get(mesh.index()))
        .cloned()
        .unwrap_or_default();
    let mut converted = Node::new(node.name().unwrap_or_default())
        .with_transform(transform)
        .with_meshes(meshes);
    for child in node.children() {
        converted.add_child(convert_node(&child, mesh_primitives));
    }
    converted
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    buffer_data: &[Vec<u8>],
    name: String,
    material: usize,
) -> Option<Mesh> {
    let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals = reader
        .read_normals()
        .map(|normals| normals.collect())
        .unwrap_or_default();
    let colors = reader
        .read_colors(0)
        .map(|colors| colors.into_rgba_f32().collect())
        .unwrap_or_default();
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|tc| tc.into_f32().collect())
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let faces = faces_for_mode(primitive.mode(), &indices);
    debug!(
        "primitive {}: {} vertices, {} faces ({:?})",
        name,
        positions.len(),
        faces.len(),
        primitive.mode()
    );

    Some(Mesh {
        name,
        positions,
        normals,
        colors,
        tex_coords,
        faces,
        material,
    })
}

/// Splits a glTF index stream into faces of the primitive's natural arity.
/// Strips, loops and fans are expanded into independent lines or triangles.
pub fn faces_for_mode(mode: Mode, indices: &[u32]) -> Vec<Face> {
    let n = indices.len();
    match mode {
        Mode::Points => indices.iter().map(|&i| Face(vec![i])).collect(),
        Mode::Lines => indices.chunks_exact(2).map(|l| Face(l.to_vec())).collect(),
        Mode::LineStrip => indices.windows(2).map(|l| Face(l.to_vec())).collect(),
        Mode::LineLoop => {
            let mut faces: Vec<Face> = indices.windows(2).map(|l| Face(l.to_vec())).collect();
            if n > 2 {
                faces.push(Face(vec![indices[n - 1], indices[0]]));
            }
            faces
        }
        Mode::Triangles => indices
            .chunks_exact(3)
            .map(|t| Face(t.to_vec()))
            .collect(),
        Mode::TriangleStrip => (0..n.saturating_sub(2))
            .map(|i| {
                // Odd triangles swap their first two vertices to keep the winding.
                if i % 2 == 0 {
                    Face(vec![indices[i], indices[i + 1], indices[i + 2]])
                } else {
                    Face(vec![indices[i + 1], indices[i], indices[i + 2]])
                }
            })
            .collect(),
        Mode::TriangleFan => (1..n.saturating_sub(1))
            .map(|i| Face(vec![indices[0], indices[i], indices[i + 1]]))
            .collect(),
    }
}

fn wrap_mode(mode: WrappingMode) -> WrapMode {
    match mode {
        WrappingMode::ClampToEdge => WrapMode::Clamp,
        WrappingMode::MirroredRepeat => WrapMode::Mirror,
        WrappingMode::Repeat => WrapMode::Repeat,
    }
}

fn convert_material(material: &gltf::Material, buffer_data: &[Vec<u8>]) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [er, eg, eb] = material.emissive_factor();
    let textures = pbr
        .base_color_texture()
        .and_then(|info| {
            let texture = info.texture();
            let sampler = texture.sampler();
            let source = match texture.source().source() {
                gltf::image::Source::View { view, mime_type } => {
                    let start = view.offset();
                    let end = start + view.length();
                    let bytes = buffer_data
                        .get(view.buffer().index())
                        .and_then(|buffer| buffer.get(start..end))?;
                    TextureSource::Embedded {
                        bytes: bytes.to_vec(),
                        mime_type: Some(mime_type.to_string()),
                    }
                }
                gltf::image::Source::Uri { uri, .. } => TextureSource::File(uri.to_string()),
            };
            Some(TextureSlot {
                source,
                wrap_u: wrap_mode(sampler.wrap_s()),
                wrap_v: wrap_mode(sampler.wrap_t()),
            })
        })
        .into_iter()
        .collect();

    Material {
        name: material.name().unwrap_or_default().to_string(),
        ambient: None,
        diffuse: Some(pbr.base_color_factor()),
        specular: None,
        emissive: Some([er, eg, eb, 1.0]),
        shininess: None,
        shininess_strength: None,
        textures,
    }
}
