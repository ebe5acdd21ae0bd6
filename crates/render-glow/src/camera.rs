use glam::{Mat4, Vec3};
use splatview_common::Matrix4;
use splatview_render::CameraMatrices;

/// Orbit camera circling a target point.
/// Camera motion is host state; the cube only ever reads its matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    /// Radians per second of idle rotation. Zero disables it.
    pub auto_rotate: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 8.0,
            yaw: 35.0_f32.to_radians(),
            pitch: 25.0_f32.to_radians(),
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            auto_rotate: 0.0,
        }
    }
}

impl OrbitCamera {
    const MIN_DISTANCE: f32 = 1.5;
    const MAX_DISTANCE: f32 = 100.0;

    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset * self.distance
    }

    /// Drag by a pointer delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    /// Positive `steps` move closer.
    pub fn zoom(&mut self, steps: f32) {
        self.distance *= (1.0 - self.zoom_speed).powf(steps);
        self.distance = self.distance.clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    pub fn advance(&mut self, dt: f32) {
        self.yaw += self.auto_rotate * dt;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// GL clip space (`z` in -1..1).
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }
}

impl CameraMatrices for OrbitCamera {
    fn view_matrix(&self) -> Matrix4 {
        self.view().into()
    }

    fn projection_matrix(&self) -> Matrix4 {
        self.projection().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_at_target() {
        let cam = OrbitCamera::default();
        assert!(cam.eye().y > 0.0);
        let target = cam.view_matrix().transform_point(cam.target.to_array());
        assert!(target[0].abs() < 1e-4 && target[1].abs() < 1e-4);
        assert!((target[2] + cam.distance).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 1.0e6);
        assert!(cam.pitch < 90.0_f32.to_radians());
        assert!(!cam.view_matrix().as_rows().iter().any(|v| v.is_nan()));
    }

    #[test]
    fn zoom_stays_in_range() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1000.0);
        assert_eq!(cam.distance, OrbitCamera::MIN_DISTANCE);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, OrbitCamera::MAX_DISTANCE);
    }

    #[test]
    fn viewport_updates_aspect_only() {
        let mut cam = OrbitCamera::default();
        let view = cam.view_matrix();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        assert_eq!(cam.view_matrix(), view);
        cam.set_viewport(800, 0);
        assert!(cam.aspect.is_finite());
    }

    #[test]
    fn auto_rotate_advances_yaw() {
        let mut cam = OrbitCamera {
            auto_rotate: 0.5,
            ..OrbitCamera::default()
        };
        let yaw = cam.yaw;
        cam.advance(2.0);
        assert!((cam.yaw - yaw - 1.0).abs() < 1e-6);
    }
}
