use glam::{Mat4, Vec3};

/// Perspective camera orbiting a fixed target point.
///
/// The eye position is derived from (target, yaw, pitch, radius); the orbit
/// controller mutates those, never the eye directly.
pub struct Camera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            radius: 5.0,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height as f32,
            z_near: 1.0,
            z_far: 100.0,
        }
    }

    /// Eye position on the orbit sphere. yaw = 0, pitch = 0 puts the eye on
    /// the +Z axis at `radius` from the target.
    pub fn eye(&self) -> Vec3 {
        let cp = self.pitch.cos();
        self.target
            + self.radius * Vec3::new(cp * self.yaw.sin(), self.pitch.sin(), cp * self.yaw.cos())
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_eye_on_positive_z() {
        let camera = Camera::new(1280, 720);
        let eye = camera.eye();
        assert!((eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6, "expected (0,0,5), got {eye:?}");
    }

    #[test]
    fn test_set_aspect_matches_viewport() {
        let mut camera = Camera::new(800, 600);
        camera.set_aspect(1920, 1080);
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_proj_is_finite() {
        let camera = Camera::new(1280, 720);
        let vp = camera.view_proj();
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_orbit_keeps_distance_to_target() {
        let mut camera = Camera::new(1280, 720);
        camera.yaw = 1.2;
        camera.pitch = -0.7;
        let dist = (camera.eye() - camera.target).length();
        assert!((dist - camera.radius).abs() < 1e-5);
    }
}
