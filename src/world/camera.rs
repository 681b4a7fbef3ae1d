use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3, perspective};

use crate::config::CameraConfig;

use super::animation::Heading;

/// Live camera parameters and the matrices derived from them.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    rotation_x: f32,
    pub rotation_y: f32,
    pub distance: f32,
    min_rotation_x: f32,
    max_rotation_x: f32,
    fov_y: Deg<f32>,
    near: f32,
    far: f32,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
}

impl CameraState {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            rotation_x: config.rotation_x,
            rotation_y: config.rotation_y,
            distance: config.distance,
            min_rotation_x: config.min_rotation_x,
            max_rotation_x: config.max_rotation_x,
            fov_y: Deg(config.fov_y_deg),
            near: config.near,
            far: config.far,
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
        };
        camera.resize(width, height);
        camera
    }

    pub fn rotation_x(&self) -> f32 {
        self.rotation_x
    }

    /// Accepts `degrees` only inside the configured range; returns whether
    /// the value changed.
    pub fn set_rotation_x(&mut self, degrees: f32) -> bool {
        if degrees < self.min_rotation_x || degrees > self.max_rotation_x {
            return false;
        }
        self.rotation_x = degrees;
        true
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    /// The view the modelview stack starts from each frame.
    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    /// Recomputes the perspective projection; a zero height counts as one.
    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        self.projection = perspective(self.fov_y, aspect, self.near, self.far);
    }

    pub fn follow(&mut self, heading: Heading) {
        self.view = look_at(heading);
    }

    pub fn reset_view(&mut self) {
        self.view = Matrix4::identity();
    }
}

/// The look-at used while a leg with `heading` is travelled: eye at the
/// origin, looking along the leg with a slight downward tilt.
pub fn look_at(heading: Heading) -> Matrix4<f32> {
    let center = match heading {
        Heading::PlusX => Point3::new(0.3, -0.1, -1.0),
        Heading::PlusZ => Point3::new(0.0, -0.25, -1.0),
        Heading::MinusX => Point3::new(-0.3, -0.1, -1.0),
        Heading::MinusZ => Point3::new(0.0, 0.15, -1.0),
    };
    Matrix4::look_at_rh(Point3::new(0.0, 0.0, 0.0), center, Vector3::unit_y())
}
