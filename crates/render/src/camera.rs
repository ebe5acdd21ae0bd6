use glam::{Mat4, Vec3};
use splatview_common::Matrix4;

/// What the cube needs from a camera: its world-to-camera (view) matrix and
/// its projection, both row-major.
pub trait CameraMatrices {
    /// Inverse of the camera's world transform.
    fn view_matrix(&self) -> Matrix4;
    fn projection_matrix(&self) -> Matrix4;
}

/// Camera with fixed matrices, for headless runs and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCamera {
    pub view: Matrix4,
    pub projection: Matrix4,
}

impl StaticCamera {
    pub fn new(view: Matrix4, projection: Matrix4) -> Self {
        Self { view, projection }
    }

    /// Right-handed look-at camera with a GL-style perspective projection.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, aspect: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y).into(),
            projection: Mat4::perspective_rh_gl(fov_y_radians, aspect, 0.1, 1000.0).into(),
        }
    }
}

impl Default for StaticCamera {
    fn default() -> Self {
        Self::look_at(
            Vec3::new(4.0, 3.0, 6.0),
            Vec3::ZERO,
            60.0_f32.to_radians(),
            16.0 / 9.0,
        )
    }
}

impl CameraMatrices for StaticCamera {
    fn view_matrix(&self) -> Matrix4 {
        self.view
    }

    fn projection_matrix(&self) -> Matrix4 {
        self.projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_moves_eye_to_origin() {
        let eye = Vec3::new(4.0, 3.0, 6.0);
        let cam = StaticCamera::look_at(eye, Vec3::ZERO, 1.0, 1.0);
        let p = cam.view_matrix().transform_point(eye.to_array());
        for c in p {
            assert!(c.abs() < 1e-5, "{p:?}");
        }
    }

    #[test]
    fn target_lies_on_negative_z() {
        let cam = StaticCamera::default();
        let p = cam.view_matrix().transform_point([0.0, 0.0, 0.0]);
        assert!(p[0].abs() < 1e-5 && p[1].abs() < 1e-5);
        assert!(p[2] < 0.0);
    }
}
