//! Data structures shared by the importers, the renderers and the world.
//!
//! - `scene` holds imported scene graphs: nodes, meshes, materials and texture slots
//! - `material` resolves declared material properties into renderer state
//! - `texture` contains the GPU texture wrapper and the wgpu texture backend
//! - `vertex` is the vertex layout the frame pipelines consume

pub mod material;
pub mod scene;
pub mod texture;
pub mod vertex;
