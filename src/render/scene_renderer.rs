//! Scene-graph traversal onto a [`RenderContext`].

use log::warn;

use crate::{
    data_structures::{
        material::MaterialParams,
        scene::{Mesh, Node, Scene},
    },
    resources::texture::SceneTextures,
};

use super::{Capability, Primitive, RenderContext, command::CommandList, flip_v};

/// Walks one scene with the textures loaded for it.
pub struct SceneRenderer<'a, H> {
    scene: &'a Scene,
    textures: &'a SceneTextures<H>,
}

impl<'a, H: Clone> SceneRenderer<'a, H> {
    pub fn new(scene: &'a Scene, textures: &'a SceneTextures<H>) -> Self {
        Self { scene, textures }
    }

    pub fn render<C: RenderContext<Texture = H>>(&self, ctx: &mut C) {
        self.render_node(ctx, &self.scene.root);
    }

    /// Renders `node` and its subtree inside one push/pop pair of its own.
    pub fn render_node<C: RenderContext<Texture = H>>(&self, ctx: &mut C, node: &Node) {
        ctx.push_matrix();
        ctx.mult_matrix(&node.transform);

        for &mesh_idx in &node.meshes {
            match self.scene.meshes.get(mesh_idx) {
                Some(mesh) => self.render_mesh(ctx, mesh),
                None => warn!(
                    "{}: node {:?} references missing mesh {}",
                    self.scene.name, node.name, mesh_idx
                ),
            }
        }

        for child in &node.children {
            self.render_node(ctx, child);
        }

        ctx.pop_matrix();
    }

    fn render_mesh<C: RenderContext<Texture = H>>(&self, ctx: &mut C, mesh: &Mesh) {
        let Some(material) = self.scene.materials.get(mesh.material) else {
            warn!(
                "{}: mesh {:?} references missing material {}",
                self.scene.name, mesh.name, mesh.material
            );
            return;
        };
        ctx.set_material(&MaterialParams::resolve(material));

        // Only the first slot of a material is ever drawn.
        let texture = material
            .first_texture()
            .and_then(|_| self.textures.get(mesh.material, 0));
        if let Some(texture) = texture {
            ctx.bind_texture(texture);
        }

        let lit = mesh.has_normals();
        let coloured = mesh.has_colors();
        let textured = texture.is_some() && mesh.has_tex_coords();
        ctx.set_capability(Capability::Lighting, lit);
        ctx.set_capability(Capability::ColorTracking, coloured);
        ctx.set_capability(Capability::Texturing, textured);

        for face in &mesh.faces {
            let indices = face.indices();
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= mesh.positions.len()) {
                warn!(
                    "{}: mesh {:?} face references missing vertex {}, skipped",
                    self.scene.name, mesh.name, bad
                );
                continue;
            }
            ctx.begin(Primitive::for_vertex_count(indices.len()));
            for &i in indices {
                let i = i as usize;
                if coloured {
                    if let Some(&c) = mesh.colors.get(i) {
                        ctx.color(c);
                    }
                }
                if lit {
                    if let Some(&n) = mesh.normals.get(i) {
                        ctx.normal(n);
                    }
                }
                if textured {
                    if let Some(&[u, v]) = mesh.tex_coords.get(i) {
                        ctx.tex_coord([u, flip_v(v)]);
                    }
                }
                ctx.vertex(mesh.positions[i]);
            }
            ctx.end();
        }
    }

    /// Renders the whole scene into a fresh display list.
    pub fn compile(&self) -> CommandList<H> {
        let mut list = CommandList::new();
        self.render(&mut list);
        list
    }
}
