//! Camera for 3D rendering.

use bytemuck::{Pod, Zeroable};
use engine_core::transform::Transform;
use glam::{Mat4, Vec3};

/// Perspective camera driven by a [`Transform`].
#[derive(Debug, Clone)]
pub struct Camera {
    pub transform: Transform,
    /// Vertical field of view, in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            transform: Transform::from_position(Vec3::new(0.0, 5.0, 15.0)),
            fov_degrees: 75.0,
            aspect,
            near: 0.1,
            far: 10000.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Point the camera at a world-space target.
    pub fn look_at(&mut self, target: Vec3) {
        self.transform.look_at(target, Vec3::Y);
    }

    /// View matrix: inverse of the camera's world transform. Preserves roll,
    /// which matters for the cockpit view.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.transform.rotation, self.transform.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            position: [
                self.transform.position.x,
                self.transform.position.y,
                self.transform.position.z,
                1.0,
            ],
        }
    }
}

/// Camera data uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matrix_inverts_camera_pose() {
        let mut camera = Camera::new(16.0 / 9.0);
        camera.transform.position = Vec3::new(0.0, 10.0, 20.0);
        let eye = camera.view_matrix().transform_point3(camera.transform.position);
        assert!(eye.length() < 1e-4, "camera position maps to view origin");
    }

    #[test]
    fn look_at_centers_target() {
        let mut camera = Camera::new(1.0);
        camera.transform.position = Vec3::new(5.0, 5.0, 5.0);
        camera.look_at(Vec3::ZERO);
        let view_target = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(view_target.x.abs() < 1e-4);
        assert!(view_target.y.abs() < 1e-4);
        assert!(view_target.z < 0.0, "target sits in front of the camera");
    }
}
