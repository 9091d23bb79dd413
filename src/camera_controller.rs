//! Orbit camera controller

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::camera::Camera;

const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 50.0;
// Polar angle stops at the horizon, so the camera never dips below the target.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.05;

/// Right-drag orbits around the camera target, the scroll wheel zooms.
pub struct OrbitCameraController {
    pub sensitivity: f32,
    pub zoom_speed: f32,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl OrbitCameraController {
    /// Derive the initial orbit angles from wherever the camera starts.
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.eye - camera.target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();

        Self {
            sensitivity: 0.005,
            zoom_speed: 0.5,
            yaw,
            pitch: pitch.clamp(0.0, MAX_PITCH),
            distance,
        }
    }

    pub fn orbit(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(0.0, MAX_PITCH);
        self.apply(camera);
    }

    pub fn zoom(&mut self, camera: &mut Camera, delta: f32) {
        self.distance = (self.distance - delta * self.zoom_speed).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.apply(camera);
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    fn apply(&self, camera: &mut Camera) {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.distance;

        camera.eye = camera.target + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    #[test]
    fn test_controller_round_trips_the_start_pose() {
        let mut camera = camera();
        let mut controller = OrbitCameraController::from_camera(&camera);

        controller.orbit(&mut camera, 0.0, 0.0);
        assert_relative_eq!(camera.eye.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.eye.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.eye.z, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_orbit_preserves_distance() {
        let mut camera = camera();
        let mut controller = OrbitCameraController::from_camera(&camera);

        controller.orbit(&mut camera, 120.0, 40.0);
        assert_relative_eq!((camera.eye - camera.target).length(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pitch_never_drops_below_the_horizon() {
        let mut camera = camera();
        let mut controller = OrbitCameraController::from_camera(&camera);

        controller.orbit(&mut camera, 0.0, -10_000.0);
        assert!(camera.eye.y >= camera.target.y);

        controller.orbit(&mut camera, 0.0, 10_000.0);
        assert!(camera.eye.y <= controller.distance());
    }

    #[test]
    fn test_zoom_clamps_to_the_minimum_distance() {
        let mut camera = camera();
        let mut controller = OrbitCameraController::from_camera(&camera);

        controller.zoom(&mut camera, 1_000.0);
        assert_relative_eq!(controller.distance(), MIN_DISTANCE, epsilon = 1e-5);
        assert_relative_eq!(
            (camera.eye - camera.target).length(),
            MIN_DISTANCE,
            epsilon = 1e-4
        );
    }
}
