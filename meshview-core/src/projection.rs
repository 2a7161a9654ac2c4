/// Orbit camera and perspective projection onto the terminal grid
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use crate::transform::mvp_matrix;

pub const DEFAULT_DISTANCE: f32 = 2.1;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 4.0;

/// Height-to-width ratio of a terminal cell
pub const CELL_ASPECT: f32 = 2.0;

/// Pitch stays short of the poles.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// A camera circling the origin at a fixed distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: DEFAULT_DISTANCE,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    /// Orbit by delta angles (in radians)
    pub fn orbit(&mut self, dyaw: f32, dpitch: f32) {
        self.yaw += dyaw;
        self.pitch = (self.pitch + dpitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Push the scene `distance` along +z after undoing the orbit
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let translation = Matrix4::new_translation(&Vector3::new(0.0, 0.0, self.distance));
        let yaw = Matrix4::from_axis_angle(&Vector3::y_axis(), -self.yaw);
        let pitch = Matrix4::from_axis_angle(&Vector3::x_axis(), -self.pitch);
        translation * yaw * pitch
    }

    /// Perspective with `w = z`; depth maps `near..far` onto `-1..1`.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let (n, f) = (self.near, self.far);
        #[rustfmt::skip]
        let projection = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, (f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0, 0.0, 1.0, 0.0,
        );
        projection
    }

    /// World-space camera position.
    ///
    /// With zero pitch this is `(-sin(yaw) * d, 0, -cos(yaw) * d)`.
    pub fn eye_position(&self) -> Point3<f32> {
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw);
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch);
        Point3::from(pitch * yaw * Vector3::new(0.0, 0.0, -self.distance))
    }

    /// Project a model-space point to cell coordinates plus depth.
    ///
    /// Returns `None` for points behind the camera or outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = mvp_matrix(model_matrix, &self.view_matrix(), &self.projection_matrix());
        let clip = mvp * point.to_homogeneous();

        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        // Terminal cells are taller than wide; squeeze x so shapes keep their proportions.
        let aspect = width as f32 / (height as f32 * CELL_ASPECT);
        let ndc_x = ndc.x / aspect.max(f32::EPSILON);

        if !(-1.0..=1.0).contains(&ndc_x)
            || !(-1.0..=1.0).contains(&ndc.y)
            || !(-1.0..=1.0).contains(&ndc.z)
        {
            return None;
        }

        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_eye_position() {
        let camera = OrbitCamera::new();
        assert_relative_eq!(camera.eye_position(), Point3::new(0.0, 0.0, -2.1));
    }

    #[test]
    fn test_eye_position_follows_yaw() {
        let mut camera = OrbitCamera::new();
        camera.orbit(std::f32::consts::FRAC_PI_2, 0.0);
        assert_relative_eq!(camera.eye_position(), Point3::new(-2.1, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_view_moves_eye_to_origin() {
        let mut camera = OrbitCamera::new();
        camera.orbit(0.7, -0.4);
        let eye = camera.view_matrix().transform_point(&camera.eye_position());
        assert_relative_eq!(eye, Point3::origin(), epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = OrbitCamera::new();
        camera.orbit(0.0, 10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.orbit(0.0, -20.0);
        assert!(camera.pitch > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_depth_range() {
        let camera = OrbitCamera::new();
        let projection = camera.projection_matrix();
        let depth = |z: f32| {
            let clip = projection * Point3::new(0.0, 0.0, z).to_homogeneous();
            clip.z / clip.w
        };
        assert_relative_eq!(depth(camera.near), -1.0, epsilon = 1e-5);
        assert_relative_eq!(depth(camera.far), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_origin_projects_to_centre() {
        let camera = OrbitCamera::new();
        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 80, 40)
            .unwrap();
        assert_relative_eq!(x, 40.0);
        assert_relative_eq!(y, 20.0);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = OrbitCamera::new();
        let (_, y, _) = camera
            .project_to_screen(&Point3::new(0.0, 0.5, 0.0), &Matrix4::identity(), 80, 40)
            .unwrap();
        assert!(y < 20.0);
    }

    #[test]
    fn test_points_behind_camera_are_clipped() {
        let camera = OrbitCamera::new();
        let behind = Point3::new(0.0, 0.0, -3.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 80, 40)
            .is_none());
    }

    #[test]
    fn test_points_past_far_plane_are_clipped() {
        let camera = OrbitCamera::new();
        let far = Point3::new(0.0, 0.0, 2.0);
        assert!(camera
            .project_to_screen(&far, &Matrix4::identity(), 80, 40)
            .is_none());
    }
}
