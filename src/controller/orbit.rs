use crate::model::Camera;

const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 50.0;

// Just short of the poles to keep look_at well defined
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Damped orbit controls: mouse drag orbits the camera around its target,
/// the wheel zooms. Input feeds angular velocities that decay by the damping
/// factor once per frame, so motion eases out after the mouse stops.
pub struct OrbitController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl OrbitController {
    pub fn new() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.25,
            damping: 0.1,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    /// Feed one frame's worth of consumed input.
    pub fn apply_input(&mut self, dx: f32, dy: f32, scroll: f32) {
        self.yaw_velocity += dx * self.rotate_speed;
        self.pitch_velocity += dy * self.rotate_speed;
        self.zoom_velocity += scroll * self.zoom_speed;
    }

    /// Advance the damped interpolation by one frame. Runs after rendering;
    /// the camera it mutates is only read again on the next frame.
    pub fn update(&mut self, camera: &mut Camera) {
        camera.yaw -= self.yaw_velocity;
        camera.pitch = (camera.pitch + self.pitch_velocity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        camera.radius = (camera.radius - self.zoom_velocity).clamp(MIN_RADIUS, MAX_RADIUS);

        let decay = 1.0 - self.damping;
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.zoom_velocity *= decay;
    }

    #[cfg(test)]
    fn speed(&self) -> f32 {
        self.yaw_velocity.abs() + self.pitch_velocity.abs() + self.zoom_velocity.abs()
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damping_decays_velocity_to_zero() {
        let mut orbit = OrbitController::new();
        let mut camera = Camera::new(1280, 720);
        orbit.apply_input(100.0, -40.0, 1.0);
        let initial = orbit.speed();
        assert!(initial > 0.0);

        for _ in 0..200 {
            orbit.update(&mut camera);
        }
        assert!(orbit.speed() < initial * 1e-3, "velocities should ease out");
    }

    #[test]
    fn test_drag_changes_yaw_and_pitch() {
        let mut orbit = OrbitController::new();
        let mut camera = Camera::new(1280, 720);
        orbit.apply_input(50.0, 20.0, 0.0);
        orbit.update(&mut camera);
        assert!(camera.yaw != 0.0);
        assert!(camera.pitch != 0.0);
    }

    #[test]
    fn test_pitch_stays_clamped() {
        let mut orbit = OrbitController::new();
        let mut camera = Camera::new(1280, 720);
        for _ in 0..50 {
            orbit.apply_input(0.0, 10_000.0, 0.0);
            orbit.update(&mut camera);
        }
        assert!(camera.pitch <= PITCH_LIMIT);
        assert!(camera.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn test_radius_stays_clamped() {
        let mut orbit = OrbitController::new();
        let mut camera = Camera::new(1280, 720);
        for _ in 0..100 {
            orbit.apply_input(0.0, 0.0, 10_000.0);
            orbit.update(&mut camera);
        }
        assert!(camera.radius >= MIN_RADIUS);

        for _ in 0..100 {
            orbit.apply_input(0.0, 0.0, -10_000.0);
            orbit.update(&mut camera);
        }
        assert!(camera.radius <= MAX_RADIUS);
    }
}
