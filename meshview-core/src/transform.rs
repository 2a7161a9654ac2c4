/// Model placement driven by the viewer's keyboard controls
use nalgebra::{Matrix3, Matrix4, Vector3};

pub const TRANSLATION_STEP: f32 = 0.05;
pub const SCALE_STEP: f32 = 0.05;
pub const ROTATION_STEP: f32 = std::f32::consts::PI / 180.0;

/// Smallest x scale the controls allow; keeps the model matrix invertible.
pub const MIN_SCALE: f32 = SCALE_STEP;

/// Translation, rotation about y and stretch along x
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub translation: Vector3<f32>,
    pub rotation_y: f32,
    pub scale_x: f32,
}

impl ModelTransform {
    pub fn new() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation_y: 0.0,
            scale_x: 1.0,
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.translation += Vector3::new(dx, dy, dz);
    }

    /// Rotate about y (in radians)
    pub fn rotate_y(&mut self, delta: f32) {
        self.rotation_y += delta;
    }

    pub fn scale_x(&mut self, delta: f32) {
        self.scale_x = (self.scale_x + delta).max(MIN_SCALE);
    }

    /// `T * R_y * S_x`
    pub fn matrix(&self) -> Matrix4<f32> {
        let translation = Matrix4::new_translation(&self.translation);
        let rotation = Matrix4::from_axis_angle(&Vector3::y_axis(), self.rotation_y);
        let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(self.scale_x, 1.0, 1.0));
        translation * rotation * scale
    }

    /// Inverse-transpose of the linear part, for carrying normals into world space
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        normal_matrix(&self.matrix())
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::new()
    }
}

/// Inverse-transpose of `model`'s upper 3x3; the plain linear part if it is singular.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear: Matrix3<f32> = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

/// Create a model-view-projection matrix
pub fn mvp_matrix(
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Matrix4<f32> {
    projection * view * model
}
