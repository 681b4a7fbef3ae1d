use std::{
    cell::{Cell, RefCell},
    path::{Path, PathBuf},
    rc::Rc,
};

use image::{Rgba, RgbaImage};
use still_life::{
    config::{Config, RoomConfig},
    data_structures::scene::{Face, Material, Mesh, Node, Scene, TextureSlot},
    error::LoadError,
    resources::texture::{Sampling, TextureBackend},
    world::animation::{ManualTicker, Ticker},
};

/// What the backend was asked to upload.
#[derive(Debug, PartialEq)]
pub struct FakeTexture {
    pub label: String,
    pub sampling: Sampling,
    /// Dimensions of every uploaded level, base level first.
    pub levels: Vec<(u32, u32)>,
    live: Rc<Cell<usize>>,
}

impl Drop for FakeTexture {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

pub type FakeHandle = Rc<FakeTexture>;

/// A texture backend without a GPU that counts uploads and live handles.
#[derive(Default)]
pub struct CountingBackend {
    live: Rc<Cell<usize>>,
    uploads: RefCell<Vec<String>>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles created by this backend that have not been dropped yet.
    pub fn live(&self) -> usize {
        self.live.get()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.borrow().clone()
    }
}

impl TextureBackend for CountingBackend {
    type Handle = FakeHandle;

    fn upload(
        &mut self,
        label: &str,
        levels: &[RgbaImage],
        sampling: &Sampling,
    ) -> Result<FakeHandle, LoadError> {
        self.live.set(self.live.get() + 1);
        self.uploads.borrow_mut().push(label.to_string());
        Ok(Rc::new(FakeTexture {
            label: label.to_string(),
            sampling: *sampling,
            levels: levels.iter().map(RgbaImage::dimensions).collect(),
            live: self.live.clone(),
        }))
    }
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    RgbaImage::from_pixel(width, height, Rgba([200, 120, 40, 255]))
        .save(&path)
        .expect("failed to write fixture image");
    path
}

/// A room whose textures exist inside `dir`.
pub fn room_config(dir: &Path) -> RoomConfig {
    write_png(dir, "floor.png", 8, 8);
    write_png(dir, "wall.png", 4, 2);
    RoomConfig {
        texture_dir: dir.to_path_buf(),
        floor_texture: "floor.png".to_string(),
        wall_texture: "wall.png".to_string(),
        ..Default::default()
    }
}

/// The default configuration with fixture room textures and no scene files.
pub fn test_config(dir: &Path) -> Config {
    Config {
        room: room_config(dir),
        ..Default::default()
    }
}

pub fn textured_material(file: &str) -> Material {
    Material {
        name: "textured".to_string(),
        textures: vec![TextureSlot::file(file)],
        ..Default::default()
    }
}

/// A mesh with one face of each arity in `arities`, every face using the
/// first vertices of a shared fan of positions.
pub fn mesh_with_faces(arities: &[usize], material: usize) -> Mesh {
    let count = arities.iter().copied().max().unwrap_or(0);
    let positions = (0..count)
        .map(|i| {
            let angle = i as f32 / count.max(1) as f32 * std::f32::consts::TAU;
            [angle.cos(), angle.sin(), 0.0]
        })
        .collect::<Vec<_>>();
    Mesh {
        name: format!("faces{:?}", arities),
        normals: vec![[0.0, 0.0, 1.0]; positions.len()],
        tex_coords: positions.iter().map(|p| [p[0], p[1]]).collect(),
        positions,
        faces: arities
            .iter()
            .map(|&n| Face((0..n as u32).collect()))
            .collect(),
        material,
        ..Default::default()
    }
}

/// A single triangle with every optional attribute.
pub fn triangle(material: usize) -> Mesh {
    Mesh {
        name: "triangle".to_string(),
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        colors: vec![[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]],
        tex_coords: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.25]],
        faces: vec![Face(vec![0, 1, 2])],
        material,
    }
}

/// Three levels deep, each node drawing the same mesh.
pub fn nested_scene(directory: &Path, materials: Vec<Material>, mesh: Mesh) -> Scene {
    let mut middle = Node::new("middle").with_meshes(vec![0]);
    middle.add_child(Node::new("leaf").with_meshes(vec![0]));
    middle.add_child(Node::new("empty"));
    let mut root = Node::new("root").with_meshes(vec![0]);
    root.add_child(middle);
    Scene {
        name: "nested".to_string(),
        directory: directory.to_path_buf(),
        root,
        meshes: vec![mesh],
        materials,
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// A [`ManualTicker`] the test keeps a handle to after moving it into a world.
#[derive(Clone, Default)]
pub struct SharedTicker(pub Rc<RefCell<ManualTicker>>);

impl SharedTicker {
    pub fn advance(&self, ticks: u32) {
        self.0.borrow_mut().advance(ticks);
    }
}

impl Ticker for SharedTicker {
    fn start(&mut self) {
        self.0.borrow_mut().start();
    }

    fn stop(&mut self) {
        self.0.borrow_mut().stop();
    }

    fn is_running(&self) -> bool {
        self.0.borrow().is_running()
    }

    fn poll(&mut self) -> u32 {
        self.0.borrow_mut().poll()
    }
}
