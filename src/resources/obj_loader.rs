use std::path::Path;

use log::{info, warn};

use crate::{
    data_structures::scene::{Face, Material, Mesh, Node, Scene, TextureSlot, WrapMode},
    error::LoadError,
};

/**
 * Imports a Wavefront OBJ file (and its MTL library) as a flat scene: one root
 * node with an identity child per OBJ object.
 *
 * Faces keep their original arity (no triangulation) so lines and polygons
 * reach the renderer as written in the file. Point statements are dropped.
 */
pub fn import_obj(directory: &Path, file: &str) -> Result<Scene, LoadError> {
    let path = directory.join(file);
    let (models, obj_materials) = tobj::load_obj(
        &path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: false,
            ignore_points: false,
            ignore_lines: false,
            ..Default::default()
        },
    )
    .map_err(|source| LoadError::Obj {
        path: path.clone(),
        source,
    })?;

    let mut materials: Vec<Material> = match obj_materials {
        Ok(materials) => materials.iter().map(convert_material).collect(),
        Err(e) => {
            warn!("{:?}: material library could not be loaded: {}", path, e);
            Vec::new()
        }
    };

    // Meshes without a usable material share one default material at the end.
    let mut default_material = None;
    let mut meshes = Vec::with_capacity(models.len());
    let mut root = Node::new(file);
    for (idx, model) in models.iter().enumerate() {
        let material = match model.mesh.material_id {
            Some(id) if id < materials.len() => id,
            _ => *default_material.get_or_insert_with(|| {
                materials.push(Material {
                    name: "default".to_string(),
                    ..Default::default()
                });
                materials.len() - 1
            }),
        };
        meshes.push(convert_mesh(model, material));
        root.add_child(Node::new(model.name.clone()).with_meshes(vec![idx]));
    }

    let name = Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    info!(
        "imported {:?}: {} object(s), {} material(s)",
        path,
        meshes.len(),
        materials.len()
    );
    Ok(Scene {
        name,
        directory: directory.to_path_buf(),
        root,
        meshes,
        materials,
    })
}

fn convert_mesh(model: &tobj::Model, material: usize) -> Mesh {
    let m = &model.mesh;
    let count = m.positions.len() / 3;
    let positions = m
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let normals = if m.normals.len() == count * 3 {
        m.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect()
    } else {
        Vec::new()
    };
    let tex_coords = if m.texcoords.len() == count * 2 {
        m.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect()
    } else {
        Vec::new()
    };
    let colors = if m.vertex_color.len() == count * 3 {
        m.vertex_color
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2], 1.0])
            .collect()
    } else {
        Vec::new()
    };

    // An empty arity list means every face is a triangle.
    let faces = if m.face_arities.is_empty() {
        m.indices
            .chunks_exact(3)
            .map(|tri| Face(tri.to_vec()))
            .collect()
    } else {
        let mut start = 0usize;
        m.face_arities
            .iter()
            .filter_map(|&arity| {
                let end = start + arity as usize;
                let face = m.indices.get(start..end).map(|idx| Face(idx.to_vec()));
                start = end;
                face
            })
            .collect()
    };

    Mesh {
        name: model.name.clone(),
        positions,
        normals,
        colors,
        tex_coords,
        faces,
        material,
    }
}

fn convert_material(m: &tobj::Material) -> Material {
    let alpha = m.dissolve.unwrap_or(1.0);
    let rgba = |c: [f32; 3]| [c[0], c[1], c[2], alpha];
    let emissive = m.unknown_param.get("Ke").and_then(|ke| {
        let channels: Vec<f32> = ke
            .split_whitespace()
            .filter_map(|v| v.parse().ok())
            .collect();
        match channels.as_slice() {
            [r, g, b, ..] => Some([*r, *g, *b, 1.0]),
            _ => None,
        }
    });
    let textures = m
        .diffuse_texture
        .iter()
        .chain(m.ambient_texture.iter())
        .map(|map| parse_texture_statement(map))
        .collect();

    Material {
        name: m.name.clone(),
        ambient: m.ambient.map(rgba),
        diffuse: m.diffuse.map(rgba),
        specular: m.specular.map(rgba),
        emissive,
        shininess: m.shininess,
        shininess_strength: None,
        textures,
    }
}

/// Splits an MTL map statement such as `-clamp on wood.png` into the file
/// name and its wrap mode. Unknown options are skipped along with their
/// argument.
pub fn parse_texture_statement(statement: &str) -> TextureSlot {
    let mut wrap = WrapMode::Repeat;
    let mut file = None;
    let mut tokens = statement.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "-clamp" => {
                if tokens.next() == Some("on") {
                    wrap = WrapMode::Clamp;
                }
            }
            option if option.starts_with('-') => {
                tokens.next();
            }
            name => file = Some(name),
        }
    }
    TextureSlot::file(file.unwrap_or(statement)).with_wrap(wrap, wrap)
}
