use super::scene::Material;

pub const DEFAULT_AMBIENT: [f32; 4] = [0.2, 0.2, 0.2, 1.0];
pub const DEFAULT_DIFFUSE: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
pub const DEFAULT_SPECULAR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const DEFAULT_EMISSIVE: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Material state as it is applied to the renderer: every component present.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
    pub shininess: f32,
}

impl MaterialParams {
    /// Fills every component the material does not declare with the
    /// fixed-function default. Shininess is `shininess * strength`, each
    /// factor defaulting to 1.
    pub fn resolve(material: &Material) -> Self {
        let shininess = material.shininess.unwrap_or(1.0);
        let strength = material.shininess_strength.unwrap_or(1.0);
        Self {
            ambient: material.ambient.unwrap_or(DEFAULT_AMBIENT),
            diffuse: material.diffuse.unwrap_or(DEFAULT_DIFFUSE),
            specular: material.specular.unwrap_or(DEFAULT_SPECULAR),
            emissive: material.emissive.unwrap_or(DEFAULT_EMISSIVE),
            shininess: shininess * strength,
        }
    }
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self::resolve(&Material::default())
    }
}
